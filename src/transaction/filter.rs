//! Filters for the transactions page and the transactions CSV download.
//!
//! The filters live in the query string so that links to a filtered list can
//! be bookmarked and shared with the CSV download.

use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{category::CategoryId, transaction::TransactionType, user::UserID};

/// Which category to show transactions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Transactions in any category, or none.
    #[default]
    Any,
    /// Only transactions without a category.
    Uncategorized,
    /// Only transactions in the given category.
    Id(CategoryId),
}

/// The query string value that selects uncategorized transactions.
pub const UNCATEGORIZED_VALUE: &str = "uncategorized";

/// The criteria for selecting transactions from the database.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionFilter {
    /// Only include transactions owned by this user, or everyone's if `None`.
    pub owner: Option<UserID>,
    /// Only include transactions whose description contains this text,
    /// ignoring case.
    pub search: Option<String>,
    /// Only include income or expenses.
    pub transaction_type: Option<TransactionType>,
    /// Only include transactions in this category.
    pub category: CategoryFilter,
    /// Only include transactions on or after this date.
    pub from: Option<Date>,
    /// Only include transactions on or before this date.
    pub to: Option<Date>,
}

/// The raw filter values from the query string.
///
/// Values are kept as strings since empty form fields are submitted as empty
/// strings. Values that cannot be parsed are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionsQuery {
    /// Text to search for in descriptions.
    pub search: Option<String>,
    /// "income" or "expense".
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// A category ID or "uncategorized".
    pub category: Option<String>,
    /// The earliest date, formatted as YYYY-MM-DD.
    pub from: Option<String>,
    /// The latest date, formatted as YYYY-MM-DD.
    pub to: Option<String>,
    /// The page number, starting from 1.
    pub page: Option<u64>,
}

impl TransactionsQuery {
    /// Convert the query string values into a database filter for `owner`.
    pub fn to_filter(&self, owner: Option<UserID>) -> TransactionFilter {
        TransactionFilter {
            owner,
            search: non_empty(&self.search).map(str::to_owned),
            transaction_type: non_empty(&self.transaction_type)
                .and_then(|value| value.parse().ok()),
            category: self.category_filter(),
            from: non_empty(&self.from).and_then(parse_date),
            to: non_empty(&self.to).and_then(parse_date),
        }
    }

    /// The selected category.
    pub fn category_filter(&self) -> CategoryFilter {
        match non_empty(&self.category) {
            None => CategoryFilter::Any,
            Some(UNCATEGORIZED_VALUE) => CategoryFilter::Uncategorized,
            Some(value) => value
                .parse()
                .map(CategoryFilter::Id)
                .unwrap_or(CategoryFilter::Any),
        }
    }

    /// Encode the non-empty filters and `page` as a query string, without
    /// the leading '?'.
    pub fn to_query_string(&self, page: Option<u64>) -> String {
        let cleaned = TransactionsQuery {
            search: non_empty(&self.search).map(str::to_owned),
            transaction_type: non_empty(&self.transaction_type).map(str::to_owned),
            category: non_empty(&self.category).map(str::to_owned),
            from: non_empty(&self.from).map(str::to_owned),
            to: non_empty(&self.to).map(str::to_owned),
            page,
        };

        serde_urlencoded::to_string(&cleaned).unwrap_or_else(|error| {
            tracing::error!("could not encode the transaction filters: {error}");
            String::new()
        })
    }

    /// Append the filters and `page` to `path`.
    pub fn to_url(&self, path: &str, page: Option<u64>) -> String {
        let query_string = self.to_query_string(page);

        if query_string.is_empty() {
            path.to_owned()
        } else {
            format!("{path}?{query_string}")
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).ok()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{transaction::TransactionType, user::UserID};

    use super::{CategoryFilter, TransactionFilter, TransactionsQuery};

    #[test]
    fn empty_query_selects_everything() {
        let query = TransactionsQuery {
            search: Some("".to_owned()),
            transaction_type: Some("".to_owned()),
            category: Some("".to_owned()),
            from: Some("".to_owned()),
            to: Some(" ".to_owned()),
            page: None,
        };

        assert_eq!(query.to_filter(None), TransactionFilter::default());
    }

    #[test]
    fn parses_every_filter() {
        let query = TransactionsQuery {
            search: Some(" coffee ".to_owned()),
            transaction_type: Some("expense".to_owned()),
            category: Some("3".to_owned()),
            from: Some("2024-01-01".to_owned()),
            to: Some("2024-03-31".to_owned()),
            page: Some(2),
        };

        let filter = query.to_filter(Some(UserID::new(1)));

        assert_eq!(
            filter,
            TransactionFilter {
                owner: Some(UserID::new(1)),
                search: Some("coffee".to_owned()),
                transaction_type: Some(TransactionType::Expense),
                category: CategoryFilter::Id(3),
                from: Some(date!(2024 - 01 - 01)),
                to: Some(date!(2024 - 03 - 31)),
            }
        );
    }

    #[test]
    fn ignores_invalid_values() {
        let query = TransactionsQuery {
            transaction_type: Some("refund".to_owned()),
            category: Some("abc".to_owned()),
            from: Some("01/02/2024".to_owned()),
            ..Default::default()
        };

        assert_eq!(query.to_filter(None), TransactionFilter::default());
    }

    #[test]
    fn parses_uncategorized() {
        let query = TransactionsQuery {
            category: Some("uncategorized".to_owned()),
            ..Default::default()
        };

        assert_eq!(query.category_filter(), CategoryFilter::Uncategorized);
    }

    #[test]
    fn query_string_drops_empty_values() {
        let query = TransactionsQuery {
            search: Some("fish & chips".to_owned()),
            transaction_type: Some("".to_owned()),
            category: Some("uncategorized".to_owned()),
            ..Default::default()
        };

        assert_eq!(
            query.to_query_string(Some(3)),
            "search=fish+%26+chips&category=uncategorized&page=3"
        );
        assert_eq!(
            TransactionsQuery::default().to_url("/transactions", None),
            "/transactions"
        );
    }

    #[test]
    fn page_links_keep_filters() {
        let query = TransactionsQuery {
            search: Some("rent & rates".to_owned()),
            transaction_type: Some("expense".to_owned()),
            category: Some("uncategorized".to_owned()),
            from: Some("2024-01-01".to_owned()),
            to: None,
            page: Some(1),
        };

        let url = query.to_url("/transactions", Some(3));
        let (_, query_string) = url.split_once('?').unwrap();
        let parsed: TransactionsQuery = serde_html_form::from_str(query_string).unwrap();

        assert_eq!(
            parsed,
            TransactionsQuery {
                page: Some(3),
                ..query
            }
        );
    }
}
