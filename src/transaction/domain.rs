//! Core transaction domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, category::CategoryId, user::UserID};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

impl TransactionType {
    /// The lowercase name used in the database, forms and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The capitalised name shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(()),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// A non-negative amount of money with at most two decimal places.
///
/// Whether the money was earned or spent is given by [TransactionType], so
/// amounts are never negative. Amounts are stored as text so that no
/// precision is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero dollars.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Create an amount without validation.
    ///
    /// The caller should ensure that `amount` is not negative.
    pub fn new_unchecked(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The amount as a decimal number.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// The largest amount that can be recorded, $999,999,999,999.99.
    pub fn max_value() -> Decimal {
        Decimal::new(99_999_999_999_999, 2)
    }

    /// Whether `amount` is between zero and [Amount::max_value] inclusive.
    ///
    /// Sums of amounts in this range cannot overflow a [Decimal].
    pub fn is_in_range(amount: Decimal) -> bool {
        (amount.is_zero() || amount.is_sign_positive()) && amount <= Self::max_value()
    }
}

impl FromStr for Amount {
    type Err = Error;

    /// Parse an amount entered by a user, e.g. "12.50".
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidAmount] if `s` is not a decimal number, has
    /// more than two decimal places or is larger than [Amount::max_value], or
    /// an [Error::NegativeAmount] if it is below zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim())
            .map_err(|_| Error::InvalidAmount(s.to_owned()))?
            .normalize();

        if amount < Decimal::ZERO {
            return Err(Error::NegativeAmount);
        }

        if amount.scale() > 2 || amount > Self::max_value() {
            return Err(Error::InvalidAmount(s.to_owned()));
        }

        Ok(Self(amount))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    /// Reads an amount stored as text.
    ///
    /// Text that is not a decimal number is reported as an
    /// [Error::CorruptAmount] wrapped in a conversion error, which
    /// `From<rusqlite::Error>` unwraps again.
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = match value {
            ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned(),
            ValueRef::Integer(integer) => integer.to_string(),
            ValueRef::Real(real) => real.to_string(),
            _ => return Err(FromSqlError::InvalidType),
        };

        Decimal::from_str(raw.trim())
            .map(Amount)
            .map_err(|_| FromSqlError::Other(Box::new(Error::CorruptAmount(raw))))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned in this transaction.
    pub amount: Amount,
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: Date,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// The user who owns the transaction.
    pub user_id: UserID,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: Amount,
        transaction_type: TransactionType,
        date: Date,
        description: &str,
        user_id: UserID,
    ) -> TransactionBuilder {
        TransactionBuilder {
            description: description.to_owned(),
            amount,
            transaction_type,
            date,
            category_id: None,
            user_id,
        }
    }
}

/// The fields needed to create or update a [Transaction].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// A human-readable description of the transaction, e.g. "Weekly groceries".
    pub description: String,
    /// The amount of money earned or spent.
    pub amount: Amount,
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,
    /// The date when the transaction occurred.
    ///
    /// This represents the actual transaction date (when money moved), not
    /// when it was recorded.
    pub date: Date,
    /// The category of the transaction, e.g. "Groceries", "Transport", "Rent".
    ///
    /// The category must belong to the same user as the transaction.
    pub category_id: Option<CategoryId>,
    /// The user who owns the transaction.
    pub user_id: UserID,
}

impl TransactionBuilder {
    /// Set the category for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}
