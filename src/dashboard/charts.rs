//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations for financial data:
//! - **Cash Flow Chart**: income and expense bars with a balance line
//! - **Expenses Chart**: stacked bar chart of expenses grouped by category
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use std::collections::{BTreeSet, HashMap};

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, ItemStyle,
        JsFunction, Tooltip, Trigger,
    },
    series::{Line, bar::Bar},
};
use maud::{Markup, PreEscaped, html};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    dashboard::aggregation::{PeriodBucket, UNCATEGORIZED_LABEL},
    html::HeadElement,
};

/// The colour used for expenses without a category.
pub(super) const UNCATEGORIZED_COLOR: &str = "#d0d0d0";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

/// Income and expense bars for each period with a line for the balance.
pub(super) fn cash_flow_chart(periods: &[PeriodBucket], subtitle: &str) -> Chart {
    let labels: Vec<String> = periods.iter().map(|period| period.label.clone()).collect();
    let income: Vec<f64> = periods.iter().map(|period| to_f64(period.income)).collect();
    let expense: Vec<f64> = periods.iter().map(|period| to_f64(period.expense)).collect();
    let balance: Vec<f64> = periods.iter().map(|period| to_f64(period.balance)).collect();

    Chart::new()
        .title(Title::new().text("Income and Expenses").subtext(subtitle))
        .tooltip(currency_tooltip())
        .legend(Legend::new().right("4%").top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(80)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            Bar::new()
                .name("Income")
                .item_style(ItemStyle::new().color("#22c55e"))
                .data(income),
        )
        .series(
            Bar::new()
                .name("Expenses")
                .item_style(ItemStyle::new().color("#ef4444"))
                .data(expense),
        )
        .series(
            Line::new()
                .name("Balance")
                .item_style(ItemStyle::new().color("#3b82f6"))
                .data(balance),
        )
}

/// The categories that appear in any period, alphabetically with
/// "Uncategorized" last.
pub(super) fn chart_categories(periods: &[PeriodBucket]) -> Vec<&str> {
    let names: BTreeSet<&str> = periods
        .iter()
        .flat_map(|period| period.category_breakdown.keys())
        .map(String::as_str)
        .collect();

    let mut categories: Vec<&str> = names
        .iter()
        .copied()
        .filter(|&name| name != UNCATEGORIZED_LABEL)
        .collect();

    if names.contains(UNCATEGORIZED_LABEL) {
        categories.push(UNCATEGORIZED_LABEL);
    }

    categories
}

/// The colour to draw `category` with.
///
/// Uses the category's own colour when known, grey for uncategorized
/// expenses, and otherwise a hue picked from the position of the series.
pub(super) fn category_color(
    category: &str,
    index: usize,
    category_colors: &HashMap<String, String>,
) -> String {
    if category == UNCATEGORIZED_LABEL {
        return UNCATEGORIZED_COLOR.to_owned();
    }

    match category_colors.get(category) {
        Some(color) => color.clone(),
        None => format!("hsl({}, 70%, 50%)", (index * 30) % 360),
    }
}

/// Expenses per period stacked by category.
pub(super) fn expenses_chart(
    periods: &[PeriodBucket],
    category_colors: &HashMap<String, String>,
    subtitle: &str,
) -> Chart {
    let labels: Vec<String> = periods.iter().map(|period| period.label.clone()).collect();

    let mut chart = Chart::new()
        .title(
            Title::new()
                .text("Expenses by Category")
                .subtext(subtitle)
                .left(20)
                .top("1%"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        );

    for (index, category) in chart_categories(periods).into_iter().enumerate() {
        let data: Vec<f64> = periods
            .iter()
            .map(|period| {
                period
                    .category_breakdown
                    .get(category)
                    .copied()
                    .map(to_f64)
                    .unwrap_or_default()
            })
            .collect();

        chart = chart.series(
            Bar::new()
                .name(category)
                .stack("Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .item_style(ItemStyle::new().color(category_color(
                    category,
                    index,
                    category_colors,
                )))
                .data(data),
        );
    }

    chart
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use rust_decimal_macros::dec;

    use crate::dashboard::aggregation::PeriodBucket;

    use super::{UNCATEGORIZED_COLOR, category_color, chart_categories, expenses_chart};

    fn period(label: &str, breakdown: &[(&str, rust_decimal::Decimal)]) -> PeriodBucket {
        let category_breakdown: BTreeMap<String, rust_decimal::Decimal> = breakdown
            .iter()
            .map(|(name, amount)| (name.to_string(), *amount))
            .collect();
        let expense = category_breakdown.values().sum();

        PeriodBucket {
            label: label.to_owned(),
            income: dec!(0),
            expense,
            balance: -expense,
            category_breakdown,
        }
    }

    #[test]
    fn uncategorized_is_listed_last() {
        let periods = [
            period("Jan", &[("Uncategorized", dec!(1)), ("Rent", dec!(2))]),
            period("Feb", &[("Food", dec!(3))]),
        ];

        assert_eq!(chart_categories(&periods), ["Food", "Rent", "Uncategorized"]);
    }

    #[test]
    fn picks_category_colors() {
        let colors = HashMap::from([("Food".to_owned(), "#22c55e".to_owned())]);

        assert_eq!(category_color("Food", 0, &colors), "#22c55e");
        assert_eq!(category_color("Uncategorized", 1, &colors), UNCATEGORIZED_COLOR);
        assert_eq!(category_color("Rent", 2, &colors), "hsl(60, 70%, 50%)");
        assert_eq!(category_color("Fun", 13, &colors), "hsl(30, 70%, 50%)");
    }

    #[test]
    fn expenses_chart_has_series_per_category() {
        let periods = [period("Jan", &[("Food", dec!(3)), ("Uncategorized", dec!(1))])];

        let options = expenses_chart(&periods, &HashMap::new(), "Last twelve months").to_string();

        assert!(options.contains("\"Food\""));
        assert!(options.contains(UNCATEGORIZED_COLOR));
    }
}
