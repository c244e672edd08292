//! Database operations for transactions.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};
use time::Date;

use crate::{
    Error,
    category::CategoryId,
    transaction::{
        Transaction, TransactionBuilder, TransactionFilter, TransactionId,
        filter::CategoryFilter,
    },
    user::UserID,
};

/// A transaction together with the category and owner details shown in lists
/// and exports.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    /// The transaction itself.
    pub transaction: Transaction,
    /// The category name and colour, or `None` for uncategorized transactions.
    pub category: Option<(String, String)>,
    /// The owner's full name, falling back to their email, or "Unknown".
    pub owner_name: String,
}

/// One page of results for [get_transaction_rows].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// The maximum number of rows to return.
    pub limit: u64,
    /// The number of rows to skip.
    pub offset: u64,
}

/// Create a new transaction in the database.
///
/// # Errors
/// - [Error::InvalidCategory] if the category does not exist or is owned by
///   someone other than the transaction's owner.
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    ensure_category_owned_by(builder.category_id, builder.user_id, connection)?;

    connection.execute(
        "INSERT INTO \"transaction\" (description, amount, type, date, category_id, user_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            &builder.description,
            builder.amount,
            builder.transaction_type,
            builder.date,
            builder.category_id,
            builder.user_id.as_i64(),
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        description: builder.description,
        amount: builder.amount,
        transaction_type: builder.transaction_type,
        date: builder.date,
        category_id: builder.category_id,
        user_id: builder.user_id,
    })
}

/// Retrieve a transaction in the database by its `id`.
///
/// # Errors
/// - [Error::NotFound] if `id` does not refer to a valid transaction.
/// - [Error::CorruptAmount] if the stored amount is not a number.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, type, date, category_id, user_id
            FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Get the ID of the user who owns the transaction `id`.
///
/// Unlike [get_transaction] this does not read the amount, so it works for
/// rows with a corrupt amount.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a valid transaction.
pub fn get_transaction_owner(id: TransactionId, connection: &Connection) -> Result<UserID, Error> {
    connection
        .query_row(
            "SELECT user_id FROM \"transaction\" WHERE id = ?1",
            [id],
            |row| row.get(0).map(UserID::new),
        )
        .map_err(Error::from)
}

/// Replace the details of the transaction `id`.
///
/// The owner of a transaction never changes, `builder.user_id` is only used to
/// check the category.
///
/// # Errors
/// - [Error::UpdateMissingTransaction] if the transaction does not exist.
/// - [Error::InvalidCategory] if the category is not owned by `builder.user_id`.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    ensure_category_owned_by(builder.category_id, builder.user_id, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
        SET description = ?1, amount = ?2, type = ?3, date = ?4, category_id = ?5
        WHERE id = ?6",
        (
            &builder.description,
            builder.amount,
            builder.transaction_type,
            builder.date,
            builder.category_id,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete the transaction `id`.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the transaction does not exist.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

const ROW_COLUMNS: &str = "t.id, t.description, t.amount, t.type, t.date, t.category_id, \
    t.user_id, c.name, c.color, COALESCE(NULLIF(TRIM(u.full_name), ''), u.email, 'Unknown')";

const ROW_JOINS: &str = "FROM \"transaction\" t
    LEFT JOIN category c ON c.id = t.category_id
    LEFT JOIN user u ON u.id = t.user_id";

const FILTER_CLAUSE: &str = "(:owner IS NULL OR t.user_id = :owner)
    AND (:search IS NULL OR t.description LIKE '%' || :search || '%' ESCAPE '\\')
    AND (:type IS NULL OR t.type = :type)
    AND (:category_mode = 'any'
        OR (:category_mode = 'uncategorized' AND t.category_id IS NULL)
        OR (:category_mode = 'id' AND t.category_id = :category_id))
    AND (:from IS NULL OR t.date >= :from)
    AND (:to IS NULL OR t.date <= :to)";

/// The values bound to the named parameters in [FILTER_CLAUSE].
struct FilterParams {
    owner: Option<i64>,
    search: Option<String>,
    transaction_type: Option<&'static str>,
    category_mode: &'static str,
    category_id: Option<CategoryId>,
    from: Option<Date>,
    to: Option<Date>,
}

impl FilterParams {
    fn new(filter: &TransactionFilter) -> Self {
        let (category_mode, category_id) = match filter.category {
            CategoryFilter::Any => ("any", None),
            CategoryFilter::Uncategorized => ("uncategorized", None),
            CategoryFilter::Id(id) => ("id", Some(id)),
        };

        Self {
            owner: filter.owner.map(|owner| owner.as_i64()),
            search: filter.search.as_deref().map(escape_like_pattern),
            transaction_type: filter.transaction_type.map(|kind| kind.as_str()),
            category_mode,
            category_id,
            from: filter.from,
            to: filter.to,
        }
    }

    fn as_named(&self) -> Vec<(&str, &dyn ToSql)> {
        vec![
            (":owner", &self.owner as &dyn ToSql),
            (":search", &self.search as &dyn ToSql),
            (":type", &self.transaction_type as &dyn ToSql),
            (":category_mode", &self.category_mode as &dyn ToSql),
            (":category_id", &self.category_id as &dyn ToSql),
            (":from", &self.from as &dyn ToSql),
            (":to", &self.to as &dyn ToSql),
        ]
    }
}

/// Escape the LIKE wildcards so that the search text is matched literally.
fn escape_like_pattern(search: &str) -> String {
    search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Get the transactions matching `filter`, newest first.
///
/// Ties on the date are broken by the newest ID first. Pass `None` for
/// `window` to get every matching row.
///
/// # Errors
/// - [Error::CorruptAmount] if a stored amount is not a number.
/// - [Error::SqlError] if there is some other SQL error.
pub fn get_transaction_rows(
    filter: &TransactionFilter,
    window: Option<PageWindow>,
    connection: &Connection,
) -> Result<Vec<TransactionRow>, Error> {
    let params = FilterParams::new(filter);
    // SQLite treats a negative limit as no limit.
    let (limit, offset) = match window {
        Some(window) => (window.limit as i64, window.offset as i64),
        None => (-1, 0),
    };
    let mut named_params = params.as_named();
    named_params.push((":limit", &limit as &dyn ToSql));
    named_params.push((":offset", &offset as &dyn ToSql));

    let query = format!(
        "SELECT {ROW_COLUMNS} {ROW_JOINS}
        WHERE {FILTER_CLAUSE}
        ORDER BY t.date DESC, t.id DESC
        LIMIT :limit OFFSET :offset"
    );

    connection
        .prepare(&query)?
        .query_map(named_params.as_slice(), map_list_row)?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

/// Count the transactions matching `filter`.
pub fn count_transactions(filter: &TransactionFilter, connection: &Connection) -> Result<u64, Error> {
    let params = FilterParams::new(filter);
    let query = format!("SELECT COUNT(1) FROM \"transaction\" t WHERE {FILTER_CLAUSE}");

    connection
        .query_row(&query, params.as_named().as_slice(), |row| row.get::<_, u32>(0))
        .map(u64::from)
        .map_err(Error::from)
}

/// Check that `category_id`, if any, refers to a category owned by `owner`.
fn ensure_category_owned_by(
    category_id: Option<CategoryId>,
    owner: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    let category_owner: Option<i64> = connection
        .query_row(
            "SELECT user_id FROM category WHERE id = ?1",
            [category_id],
            |row| row.get(0),
        )
        .optional()?;

    match category_owner {
        Some(category_owner) if category_owner == owner.as_i64() => Ok(()),
        _ => Err(Error::InvalidCategory(Some(category_id))),
    }
}

/// Create the transaction table and indexes.
///
/// The table name is quoted since `transaction` is an SQL keyword.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            amount TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            date TEXT NOT NULL,
            category_id INTEGER,
            user_id INTEGER NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);
        CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);",
    )?;

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        transaction_type: row.get(3)?,
        date: row.get(4)?,
        category_id: row.get(5)?,
        user_id: UserID::new(row.get(6)?),
    })
}

fn map_list_row(row: &Row) -> Result<TransactionRow, rusqlite::Error> {
    let transaction = map_transaction_row(row)?;
    let category_name: Option<String> = row.get(7)?;
    let category_color: Option<String> = row.get(8)?;
    let owner_name = row.get(9)?;

    Ok(TransactionRow {
        transaction,
        category: category_name.zip(category_color),
        owner_name,
    })
}
