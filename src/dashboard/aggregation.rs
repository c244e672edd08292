//! Monthly aggregation of ledger entries for the dashboard.
//!
//! Everything here is a pure function of its inputs: no database access and no
//! clock. The caller fetches the entries and picks the anchor date.
//!
//! The sums produced here hold two invariants that the tests check:
//! - the monthly incomes (and expenses) add up to the totals over the same
//!   months;
//! - each month's category breakdown adds up to that month's expense.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    str::FromStr,
};

use rust_decimal::Decimal;
use time::{Date, Month};

use crate::transaction::TransactionType;

/// The label for expenses that have no category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The number of months shown on the dashboard.
pub const DASHBOARD_WINDOW_MONTHS: usize = 12;

/// A calendar month as a (year, month) pair.
pub type YearMonth = (i32, Month);

/// A dated, typed and categorized amount of money.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub date: Date,
    /// Always non-negative, `kind` says whether it was earned or spent.
    pub amount: Decimal,
    pub kind: TransactionType,
    /// The category name, `None` for uncategorized transactions.
    pub category: Option<String>,
}

/// The income and expenses for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    pub year: i32,
    pub month: Month,
    /// The three letter month name, e.g. "Jan".
    pub label: &'static str,
    pub income: Decimal,
    pub expense: Decimal,
    /// `income - expense`.
    pub balance: Decimal,
    /// The expenses summed per category name.
    pub category_breakdown: BTreeMap<String, Decimal>,
}

impl MonthBucket {
    fn empty((year, month): YearMonth) -> Self {
        Self {
            year,
            month,
            label: month_label(month),
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            balance: Decimal::ZERO,
            category_breakdown: BTreeMap::new(),
        }
    }

    fn add(&mut self, entry: &LedgerEntry) {
        match entry.kind {
            TransactionType::Income => self.income += entry.amount,
            TransactionType::Expense => {
                self.expense += entry.amount;
                let category = entry.category.as_deref().unwrap_or(UNCATEGORIZED_LABEL);
                *self
                    .category_breakdown
                    .entry(category.to_owned())
                    .or_insert(Decimal::ZERO) += entry.amount;
            }
        }

        self.balance = self.income - self.expense;
    }
}

/// Income, expense and their difference over some set of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

impl Totals {
    fn add(&mut self, entry: &LedgerEntry) {
        match entry.kind {
            TransactionType::Income => self.income += entry.amount,
            TransactionType::Expense => self.expense += entry.amount,
        }

        self.balance = self.income - self.expense;
    }
}

/// The three letter English name of `month`.
pub fn month_label(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// The `window` months ending with the month of `anchor`, oldest first.
///
/// Stepping back from January rolls over to December of the previous year.
pub fn trailing_months(anchor: Date, window: usize) -> Vec<YearMonth> {
    let mut months = Vec::with_capacity(window);
    let (mut year, mut month) = (anchor.year(), anchor.month());

    for _ in 0..window {
        months.push((year, month));

        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }

    months.reverse();
    months
}

/// Group `entries` into one bucket per month of the trailing `window` months
/// ending with the month of `anchor`.
///
/// Every month in the window gets a bucket, months without entries are all
/// zeros. Entries outside the window are ignored.
pub fn aggregate_months(entries: &[LedgerEntry], anchor: Date, window: usize) -> Vec<MonthBucket> {
    let months = trailing_months(anchor, window);
    let index_by_month: HashMap<YearMonth, usize> = months
        .iter()
        .enumerate()
        .map(|(index, month)| (*month, index))
        .collect();
    let mut buckets: Vec<MonthBucket> = months.into_iter().map(MonthBucket::empty).collect();

    for entry in entries {
        if let Some(&index) = index_by_month.get(&(entry.date.year(), entry.date.month())) {
            buckets[index].add(entry);
        }
    }

    buckets
}

/// Sum the entries that fall within any of `months`.
///
/// Months are whole calendar months, from the first to the last day inclusive.
pub fn summarize(entries: &[LedgerEntry], months: &[YearMonth]) -> Totals {
    let months: HashSet<&YearMonth> = months.iter().collect();
    let mut totals = Totals::default();

    for entry in entries
        .iter()
        .filter(|entry| months.contains(&(entry.date.year(), entry.date.month())))
    {
        totals.add(entry);
    }

    totals
}

/// Sum every entry.
pub fn totals(entries: &[LedgerEntry]) -> Totals {
    let mut totals = Totals::default();

    for entry in entries {
        totals.add(entry);
    }

    totals
}

/// How finely the dashboard groups the monthly series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    #[default]
    Month,
    Quarter,
    Year,
}

impl Timeframe {
    /// Every timeframe in the order shown to users.
    pub const ALL: [Timeframe; 3] = [Timeframe::Month, Timeframe::Quarter, Timeframe::Year];

    /// The lowercase name used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Month => "month",
            Timeframe::Quarter => "quarter",
            Timeframe::Year => "year",
        }
    }

    /// The name of the current period, e.g. "This quarter".
    pub fn current_period_label(&self) -> &'static str {
        match self {
            Timeframe::Month => "This month",
            Timeframe::Quarter => "This quarter",
            Timeframe::Year => "This year",
        }
    }

    /// The name shown on the timeframe picker.
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Month => "Monthly",
            Timeframe::Quarter => "Quarterly",
            Timeframe::Year => "Yearly",
        }
    }
}

impl FromStr for Timeframe {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|timeframe| timeframe.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// The income and expenses for a month, quarter or year.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodBucket {
    /// E.g. "Jan", "Q1 2024" or "2024".
    pub label: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub category_breakdown: BTreeMap<String, Decimal>,
}

impl From<&MonthBucket> for PeriodBucket {
    fn from(bucket: &MonthBucket) -> Self {
        Self {
            label: bucket.label.to_owned(),
            income: bucket.income,
            expense: bucket.expense,
            balance: bucket.balance,
            category_breakdown: bucket.category_breakdown.clone(),
        }
    }
}

impl PeriodBucket {
    fn merge(&mut self, bucket: &MonthBucket) {
        self.income += bucket.income;
        self.expense += bucket.expense;
        self.balance = self.income - self.expense;

        for (category, amount) in &bucket.category_breakdown {
            *self
                .category_breakdown
                .entry(category.clone())
                .or_insert(Decimal::ZERO) += *amount;
        }
    }
}

/// The zero-based calendar quarter of `month`.
fn quarter_index(month: Month) -> u8 {
    (month as u8 - 1) / 3
}

/// Group consecutive monthly buckets into calendar quarters or years.
///
/// Quarters and years at either end of the series that are only partly
/// covered are kept as partial groups.
pub fn roll_up(buckets: &[MonthBucket], timeframe: Timeframe) -> Vec<PeriodBucket> {
    let group_key = |bucket: &MonthBucket| match timeframe {
        Timeframe::Month => (bucket.year, bucket.month as u8),
        Timeframe::Quarter => (bucket.year, quarter_index(bucket.month)),
        Timeframe::Year => (bucket.year, 0),
    };
    let group_label = |bucket: &MonthBucket| match timeframe {
        Timeframe::Month => bucket.label.to_owned(),
        Timeframe::Quarter => format!("Q{} {}", quarter_index(bucket.month) + 1, bucket.year),
        Timeframe::Year => bucket.year.to_string(),
    };

    let mut periods: Vec<PeriodBucket> = Vec::new();
    let mut last_key = None;

    for bucket in buckets {
        let key = group_key(bucket);

        match periods.last_mut() {
            Some(period) if last_key == Some(key) => period.merge(bucket),
            _ => {
                let mut period = PeriodBucket::from(bucket);
                period.label = group_label(bucket);
                periods.push(period);
            }
        }

        last_key = Some(key);
    }

    periods
}

/// The months of the period containing `anchor`: its month, calendar quarter
/// or calendar year.
pub fn months_in_period(anchor: Date, timeframe: Timeframe) -> Vec<YearMonth> {
    let year = anchor.year();

    match timeframe {
        Timeframe::Month => vec![(year, anchor.month())],
        Timeframe::Quarter => {
            let first = quarter_index(anchor.month()) * 3 + 1;
            (first..first + 3)
                .filter_map(|month| Month::try_from(month).ok())
                .map(|month| (year, month))
                .collect()
        }
        Timeframe::Year => (1..=12)
            .filter_map(|month| Month::try_from(month).ok())
            .map(|month| (year, month))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{Date, Duration, Month, macros::date};

    use crate::transaction::TransactionType;

    use super::{
        DASHBOARD_WINDOW_MONTHS, LedgerEntry, Timeframe, aggregate_months, months_in_period,
        roll_up, summarize, totals, trailing_months,
    };

    fn entry(date: Date, amount: Decimal, kind: TransactionType, category: Option<&str>) -> LedgerEntry {
        LedgerEntry {
            date,
            amount,
            kind,
            category: category.map(str::to_owned),
        }
    }

    /// A small linear congruential generator so that the generated ledgers
    /// are the same on every run.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }

        fn below(&mut self, bound: u64) -> u64 {
            self.next() % bound
        }
    }

    /// Entries spread over roughly two years around `anchor`, so that some
    /// fall outside the window.
    fn random_ledger(seed: u64, anchor: Date) -> Vec<LedgerEntry> {
        let mut rng = Lcg(seed);
        let count = rng.below(60);
        let categories = [None, Some("Food"), Some("Rent"), Some("Fun")];

        (0..count)
            .map(|_| {
                let days_back = rng.below(730) as i64 - 30;
                let cents = rng.below(100_000) as i64;
                let kind = if rng.below(2) == 0 {
                    TransactionType::Income
                } else {
                    TransactionType::Expense
                };
                let category = categories[rng.below(4) as usize];

                entry(anchor - Duration::days(days_back), Decimal::new(cents, 2), kind, category)
            })
            .collect()
    }

    fn anchors() -> [Date; 4] {
        [
            date!(2024 - 01 - 31),
            date!(2024 - 02 - 29),
            date!(2023 - 11 - 15),
            date!(2024 - 06 - 01),
        ]
    }

    #[test]
    fn trailing_months_rolls_over_year() {
        let months = trailing_months(date!(2024 - 02 - 10), 4);

        assert_eq!(
            months,
            [
                (2023, Month::November),
                (2023, Month::December),
                (2024, Month::January),
                (2024, Month::February),
            ]
        );
    }

    #[test]
    fn empty_input_gives_twelve_zero_buckets() {
        let buckets = aggregate_months(&[], date!(2024 - 03 - 15), DASHBOARD_WINDOW_MONTHS);

        assert_eq!(buckets.len(), 12);
        let labels: Vec<&str> = buckets.iter().map(|bucket| bucket.label).collect();
        assert_eq!(
            labels,
            ["Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec", "Jan", "Feb", "Mar"]
        );
        for bucket in &buckets {
            assert_eq!(bucket.income, Decimal::ZERO);
            assert_eq!(bucket.expense, Decimal::ZERO);
            assert_eq!(bucket.balance, Decimal::ZERO);
            assert!(bucket.category_breakdown.is_empty());
        }
        assert_eq!(buckets[0].year, 2023);
        assert_eq!(buckets[11].year, 2024);
    }

    #[test]
    fn aggregates_example_month() {
        let entries = [
            entry(date!(2024 - 01 - 15), dec!(100), TransactionType::Income, None),
            entry(date!(2024 - 01 - 20), dec!(40), TransactionType::Expense, Some("Food")),
        ];

        let buckets = aggregate_months(&entries, date!(2024 - 01 - 31), DASHBOARD_WINDOW_MONTHS);

        let january = buckets.last().unwrap();
        assert_eq!(january.label, "Jan");
        assert_eq!(january.income, dec!(100));
        assert_eq!(january.expense, dec!(40));
        assert_eq!(january.balance, dec!(60));
        assert_eq!(
            january.category_breakdown,
            BTreeMap::from([("Food".to_owned(), dec!(40))])
        );
    }

    #[test]
    fn last_day_of_month_falls_in_that_month() {
        let entries = [
            entry(date!(2024 - 02 - 29), dec!(10), TransactionType::Expense, None),
            entry(date!(2024 - 03 - 01), dec!(1), TransactionType::Expense, None),
        ];

        let buckets = aggregate_months(&entries, date!(2024 - 03 - 31), 2);

        assert_eq!(buckets[0].month, Month::February);
        assert_eq!(buckets[0].expense, dec!(10));
        assert_eq!(buckets[1].expense, dec!(1));
    }

    #[test]
    fn uncategorized_expenses_are_grouped_together() {
        let entries = [
            entry(date!(2024 - 01 - 02), dec!(1.25), TransactionType::Expense, None),
            entry(date!(2024 - 01 - 03), dec!(2.50), TransactionType::Expense, None),
            entry(date!(2024 - 01 - 04), dec!(99), TransactionType::Income, Some("Food")),
        ];

        let buckets = aggregate_months(&entries, date!(2024 - 01 - 31), 1);

        assert_eq!(
            buckets[0].category_breakdown,
            BTreeMap::from([("Uncategorized".to_owned(), dec!(3.75))])
        );
    }

    #[test]
    fn monthly_sums_equal_window_totals() {
        for anchor in anchors() {
            for seed in 0..50 {
                let entries = random_ledger(seed, anchor);
                let months = trailing_months(anchor, DASHBOARD_WINDOW_MONTHS);
                let buckets = aggregate_months(&entries, anchor, DASHBOARD_WINDOW_MONTHS);
                let want = summarize(&entries, &months);

                let income: Decimal = buckets.iter().map(|bucket| bucket.income).sum();
                let expense: Decimal = buckets.iter().map(|bucket| bucket.expense).sum();

                assert_eq!(income, want.income, "seed {seed}, anchor {anchor}");
                assert_eq!(expense, want.expense, "seed {seed}, anchor {anchor}");
            }
        }
    }

    #[test]
    fn window_totals_match_a_direct_date_filter() {
        for anchor in anchors() {
            let months = trailing_months(anchor, DASHBOARD_WINDOW_MONTHS);
            let (first_year, first_month) = months[0];
            let start = Date::from_calendar_date(first_year, first_month, 1).unwrap();
            let end = Date::from_calendar_date(
                anchor.year(),
                anchor.month(),
                anchor.month().length(anchor.year()),
            )
            .unwrap();

            for seed in 0..50 {
                let entries = random_ledger(seed, anchor);
                let in_window: Vec<LedgerEntry> = entries
                    .iter()
                    .filter(|entry| start <= entry.date && entry.date <= end)
                    .cloned()
                    .collect();

                assert_eq!(
                    summarize(&entries, &months),
                    totals(&in_window),
                    "seed {seed}, anchor {anchor}"
                );
            }
        }
    }

    #[test]
    fn category_breakdown_sums_to_expense() {
        for anchor in anchors() {
            for seed in 0..50 {
                let entries = random_ledger(seed, anchor);

                for bucket in aggregate_months(&entries, anchor, DASHBOARD_WINDOW_MONTHS) {
                    let breakdown_sum: Decimal = bucket.category_breakdown.values().sum();
                    assert_eq!(breakdown_sum, bucket.expense, "seed {seed}, anchor {anchor}");
                    assert_eq!(bucket.balance, bucket.income - bucket.expense);
                }
            }
        }
    }

    #[test]
    fn aggregation_is_idempotent() {
        let anchor = date!(2024 - 01 - 31);

        for seed in 0..20 {
            let entries = random_ledger(seed, anchor);

            assert_eq!(
                aggregate_months(&entries, anchor, DASHBOARD_WINDOW_MONTHS),
                aggregate_months(&entries, anchor, DASHBOARD_WINDOW_MONTHS)
            );
        }
    }

    #[test]
    fn rollups_preserve_totals_and_breakdowns() {
        for anchor in anchors() {
            for seed in 0..30 {
                let entries = random_ledger(seed, anchor);
                let buckets = aggregate_months(&entries, anchor, DASHBOARD_WINDOW_MONTHS);
                let income: Decimal = buckets.iter().map(|bucket| bucket.income).sum();
                let expense: Decimal = buckets.iter().map(|bucket| bucket.expense).sum();

                for timeframe in Timeframe::ALL {
                    let periods = roll_up(&buckets, timeframe);

                    let rolled_income: Decimal = periods.iter().map(|period| period.income).sum();
                    let rolled_expense: Decimal =
                        periods.iter().map(|period| period.expense).sum();
                    assert_eq!(rolled_income, income, "{timeframe:?}, seed {seed}");
                    assert_eq!(rolled_expense, expense, "{timeframe:?}, seed {seed}");

                    for period in &periods {
                        let breakdown_sum: Decimal = period.category_breakdown.values().sum();
                        assert_eq!(breakdown_sum, period.expense);
                    }
                }
            }
        }
    }

    #[test]
    fn quarters_are_calendar_aligned() {
        // February to January covers a partial Q1 2023, three full quarters
        // and one month of Q1 2024.
        let buckets = aggregate_months(&[], date!(2024 - 01 - 10), DASHBOARD_WINDOW_MONTHS);

        let labels: Vec<String> = roll_up(&buckets, Timeframe::Quarter)
            .into_iter()
            .map(|period| period.label)
            .collect();

        assert_eq!(labels, ["Q1 2023", "Q2 2023", "Q3 2023", "Q4 2023", "Q1 2024"]);
    }

    #[test]
    fn years_are_calendar_aligned() {
        let entries = [
            entry(date!(2023 - 12 - 31), dec!(5), TransactionType::Income, None),
            entry(date!(2024 - 01 - 01), dec!(7), TransactionType::Income, None),
        ];
        let buckets = aggregate_months(&entries, date!(2024 - 03 - 10), DASHBOARD_WINDOW_MONTHS);

        let periods = roll_up(&buckets, Timeframe::Year);

        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].label, "2023");
        assert_eq!(periods[0].income, dec!(5));
        assert_eq!(periods[1].label, "2024");
        assert_eq!(periods[1].income, dec!(7));
    }

    #[test]
    fn month_rollup_keeps_buckets() {
        let buckets = aggregate_months(&[], date!(2024 - 03 - 10), DASHBOARD_WINDOW_MONTHS);

        let periods = roll_up(&buckets, Timeframe::Month);

        assert_eq!(periods.len(), 12);
        assert_eq!(periods[11].label, "Mar");
    }

    #[test]
    fn months_in_period_follows_calendar() {
        let anchor = date!(2024 - 05 - 20);

        assert_eq!(months_in_period(anchor, Timeframe::Month), [(2024, Month::May)]);
        assert_eq!(
            months_in_period(anchor, Timeframe::Quarter),
            [(2024, Month::April), (2024, Month::May), (2024, Month::June)]
        );
        let year = months_in_period(anchor, Timeframe::Year);
        assert_eq!(year.len(), 12);
        assert_eq!(year[0], (2024, Month::January));
        assert_eq!(year[11], (2024, Month::December));
    }

    #[test]
    fn summarize_uses_whole_months() {
        let entries = [
            entry(date!(2024 - 04 - 01), dec!(1), TransactionType::Income, None),
            entry(date!(2024 - 06 - 30), dec!(2), TransactionType::Income, None),
            entry(date!(2024 - 07 - 01), dec!(4), TransactionType::Income, None),
            entry(date!(2024 - 05 - 15), dec!(0.5), TransactionType::Expense, None),
        ];

        let quarter = summarize(&entries, &months_in_period(date!(2024 - 05 - 20), Timeframe::Quarter));

        assert_eq!(quarter.income, dec!(3));
        assert_eq!(quarter.expense, dec!(0.5));
        assert_eq!(quarter.balance, dec!(2.5));
        assert_eq!(totals(&entries).income, dec!(7));
    }
}
