//! Route handlers for the export page and the CSV downloads.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    access::Actor,
    category::get_categories,
    endpoints,
    export::writer::{OwnerColumn, write_categories_csv, write_transactions_csv},
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::get_local_date,
    transaction::{TransactionFilter, TransactionsQuery, get_transaction_rows},
    user::{UserID, get_all_users},
};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
const UNKNOWN_OWNER: &str = "Unknown";

/// The state needed for the export page and CSV downloads.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection for reading transactions and categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    /// Used to date the downloaded files.
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display the page with links for downloading transactions and categories.
pub async fn get_export_page(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let actor = Actor::load(user_id, &connection)?;
    drop(connection);

    Ok(export_view(actor.is_admin).into_response())
}

fn export_view(is_admin: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPORT_VIEW, is_admin).into_html();
    let scope = if is_admin {
        "Downloads include the data of every family member."
    } else {
        "Downloads include your own data."
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE) {
            div class="w-full max-w-md space-y-6" {
                h2 class="text-2xl font-bold" { "Export Data" }

                p class="text-gray-600 dark:text-gray-400" {
                    "Export your financial data as CSV files for use in spreadsheet applications. "
                    (scope)
                }

                div class="flex flex-col gap-4" {
                    a
                        href=(endpoints::EXPORT_TRANSACTIONS_CSV)
                        class={(BUTTON_PRIMARY_STYLE) " text-center"}
                        download
                    {
                        "Export Transactions"
                    }

                    a
                        href=(endpoints::EXPORT_CATEGORIES_CSV)
                        class={(BUTTON_PRIMARY_STYLE) " text-center"}
                        download
                    {
                        "Export Categories"
                    }
                }
            }
        }
    };

    base("Export Data", &[], &content)
}

/// Serve `body` as a CSV file download named `{prefix}_YYYY-MM-DD.csv`.
fn csv_attachment(prefix: &str, date: Date, body: Vec<u8>) -> Response {
    let filename = format!("{prefix}_{date}.csv");

    (
        [
            (CONTENT_TYPE, CSV_CONTENT_TYPE.to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// Download every transaction the user can see, including the owner of each
/// transaction.
pub async fn export_transactions_csv(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let actor = Actor::load(user_id, &connection)?;

    let filter = TransactionFilter {
        owner: actor.owner_scope(),
        ..Default::default()
    };
    let rows = get_transaction_rows(&filter, None, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions for export: {error}"))?;
    drop(connection);

    let body = write_transactions_csv(&rows, OwnerColumn::Include)?;

    Ok(csv_attachment("transactions", today, body))
}

/// Download the transactions shown on the transactions page, across all pages.
///
/// Uses the same filters as the transactions page.
pub async fn export_filtered_transactions_csv(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let actor = Actor::load(user_id, &connection)?;

    let filter = query.to_filter(actor.owner_scope());
    let rows = get_transaction_rows(&filter, None, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions for export: {error}"))?;
    drop(connection);

    let body = write_transactions_csv(&rows, OwnerColumn::Omit)?;

    Ok(csv_attachment("transactions", today, body))
}

/// Download every category the user can see, ordered by name.
pub async fn export_categories_csv(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let actor = Actor::load(user_id, &connection)?;

    let categories = get_categories(actor.owner_scope(), &connection)
        .inspect_err(|error| tracing::error!("could not get categories for export: {error}"))?;
    let owner_names: HashMap<UserID, String> = get_all_users(&connection)?
        .into_iter()
        .map(|user| (user.id, user.display_name().to_owned()))
        .collect();
    drop(connection);

    let rows: Vec<_> = categories
        .into_iter()
        .map(|category| {
            let owner_name = owner_names
                .get(&category.user_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_OWNER.to_owned());
            (category, owner_name)
        })
        .collect();

    let body = write_categories_csv(&rows)?;

    Ok(csv_attachment("categories", today, body))
}
