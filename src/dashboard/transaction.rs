//! Loads the transactions to aggregate on the dashboard.
//!
//! Amounts are parsed here rather than by the aggregator. Rows whose stored
//! amount cannot be read are set aside so that they are reported to the user
//! instead of being counted as zero.

use std::{collections::HashMap, str::FromStr};

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error,
    category::get_categories,
    dashboard::aggregation::LedgerEntry,
    transaction::{Amount, TransactionId, TransactionType},
    user::UserID,
};

/// A transaction left out of the dashboard because its amount is not valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub transaction_id: TransactionId,
    pub raw_amount: String,
}

/// The entries for the dashboard, along with the rows that could not be read.
#[derive(Debug, Default, PartialEq)]
pub struct LedgerLoad {
    pub entries: Vec<LedgerEntry>,
    pub rejected: Vec<RejectedRow>,
}

/// Load every transaction owned by `owner`, or everyone's if `owner` is `None`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails. Invalid amounts are not an
/// error, see [LedgerLoad::rejected].
pub fn get_ledger_entries(
    owner: Option<UserID>,
    connection: &Connection,
) -> Result<LedgerLoad, Error> {
    let rows = connection
        .prepare(
            "SELECT t.id, CAST(t.amount AS TEXT), t.type, t.date, c.name
            FROM \"transaction\" t
            LEFT JOIN category c ON c.id = t.category_id
            WHERE (?1 IS NULL OR t.user_id = ?1)
            ORDER BY t.date ASC, t.id ASC",
        )?
        .query_map([owner.map(|owner| owner.as_i64())], |row| {
            let id: TransactionId = row.get(0)?;
            let raw_amount: String = row.get(1)?;
            let kind: TransactionType = row.get(2)?;
            let date: Date = row.get(3)?;
            let category: Option<String> = row.get(4)?;

            Ok((id, raw_amount, kind, date, category))
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    let mut load = LedgerLoad::default();

    for (transaction_id, raw_amount, kind, date, category) in rows {
        match parse_stored_amount(&raw_amount) {
            Some(amount) => load.entries.push(LedgerEntry {
                date,
                amount,
                kind,
                category,
            }),
            None => {
                tracing::warn!(
                    "Excluding transaction {transaction_id} from the dashboard, \
                    its amount \"{raw_amount}\" is not a valid amount"
                );
                load.rejected.push(RejectedRow {
                    transaction_id,
                    raw_amount,
                });
            }
        }
    }

    Ok(load)
}

fn parse_stored_amount(raw_amount: &str) -> Option<Decimal> {
    Decimal::from_str(raw_amount.trim())
        .ok()
        .filter(|amount| Amount::is_in_range(*amount))
}

/// Map category names to their colours.
///
/// When several users have a category with the same name, the first one in
/// alphabetical order wins.
pub fn get_category_colors(
    owner: Option<UserID>,
    connection: &Connection,
) -> Result<HashMap<String, String>, Error> {
    let mut colors = HashMap::new();

    for category in get_categories(owner, connection)? {
        colors
            .entry(category.name.as_ref().to_owned())
            .or_insert_with(|| category.color.as_ref().to_owned());
    }

    Ok(colors)
}
