//! Writes transactions and categories as CSV.
//!
//! Fields are quoted by the `csv` crate when they contain commas, quotes or
//! new lines.

use csv::Writer;

use crate::{Error, category::Category, dashboard::UNCATEGORIZED_LABEL, transaction::TransactionRow};

/// Whether the transactions CSV includes the owner of each transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerColumn {
    Include,
    Omit,
}

fn csv_error(error: impl std::fmt::Display) -> Error {
    tracing::error!("could not write CSV: {error}");
    Error::CsvError(error.to_string())
}

/// Write `rows` as CSV with the columns Date, Description, Amount, Type and
/// Category, followed by User if `owner_column` is [OwnerColumn::Include].
pub fn write_transactions_csv(
    rows: &[TransactionRow],
    owner_column: OwnerColumn,
) -> Result<Vec<u8>, Error> {
    let mut writer = Writer::from_writer(Vec::new());

    let mut headers = vec!["Date", "Description", "Amount", "Type", "Category"];
    if owner_column == OwnerColumn::Include {
        headers.push("User");
    }
    writer.write_record(&headers).map_err(csv_error)?;

    for row in rows {
        let transaction = &row.transaction;
        let category = row
            .category
            .as_ref()
            .map(|(name, _)| name.as_str())
            .unwrap_or(UNCATEGORIZED_LABEL);

        let mut record = vec![
            transaction.date.to_string(),
            transaction.description.clone(),
            transaction.amount.to_string(),
            transaction.transaction_type.as_str().to_owned(),
            category.to_owned(),
        ];
        if owner_column == OwnerColumn::Include {
            record.push(row.owner_name.clone());
        }

        writer.write_record(&record).map_err(csv_error)?;
    }

    writer.into_inner().map_err(csv_error)
}

/// Write `categories` as CSV with the columns Name, Color and User.
///
/// Each category is paired with its owner's name.
pub fn write_categories_csv(categories: &[(Category, String)]) -> Result<Vec<u8>, Error> {
    let mut writer = Writer::from_writer(Vec::new());

    writer
        .write_record(["Name", "Color", "User"])
        .map_err(csv_error)?;

    for (category, owner_name) in categories {
        writer
            .write_record([
                category.name.as_ref(),
                category.color.as_ref(),
                owner_name.as_str(),
            ])
            .map_err(csv_error)?;
    }

    writer.into_inner().map_err(csv_error)
}
