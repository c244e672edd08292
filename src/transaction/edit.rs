//! The page and endpoint for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    access::Actor,
    category::{Category, get_categories},
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    timezone::get_local_date,
    transaction::{
        Transaction, TransactionId,
        form::{FormAction, TransactionForm, TransactionFormDefaults, transaction_form_view},
        get_transaction, get_transaction_owner, update_transaction,
    },
    user::UserID,
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the page for editing a transaction.
///
/// The category list holds the transaction owner's categories, which differ
/// from the logged in user's when an admin edits someone else's transaction.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = get_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let actor = Actor::load(user_id, &connection)?;
    let transaction = get_transaction(transaction_id, &connection)?;
    actor.ensure_can_access(transaction.user_id)?;

    let categories = get_categories(Some(transaction.user_id), &connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    Ok(edit_transaction_view(actor.is_admin, &transaction, today, &categories).into_response())
}

/// A route handler for updating a transaction, redirects to transactions view on success.
pub async fn update_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = match get_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let owner = Actor::load(user_id, &connection).and_then(|actor| {
        let owner = get_transaction_owner(transaction_id, &connection)?;
        actor.ensure_can_access(owner)?;
        Ok(owner)
    });

    let owner = match owner {
        Ok(owner) => owner,
        Err(Error::NotFound) => return Error::UpdateMissingTransaction.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    let builder = match form.to_builder(owner) {
        Ok(builder) => builder,
        Err(error) => {
            let categories = get_categories(Some(owner), &connection).unwrap_or_default();
            let update_endpoint =
                endpoints::format_endpoint(endpoints::TRANSACTION, transaction_id);

            return transaction_form_view(
                FormAction::Update(&update_endpoint),
                &form.defaults(today),
                &categories,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    if builder.date > today {
        tracing::error!("Tried to update transaction {transaction_id} with a future date");

        return Error::FutureDate(builder.date).into_alert_response();
    }

    match update_transaction(transaction_id, builder, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_transaction_view(
    is_admin: bool,
    transaction: &Transaction,
    today: time::Date,
    categories: &[Category],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW, is_admin).into_html();
    let update_endpoint = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);
    let amount = transaction.amount.to_string();
    let defaults = TransactionFormDefaults {
        transaction_type: transaction.transaction_type,
        amount: Some(&amount),
        date: transaction.date,
        description: Some(&transaction.description),
        category_id: transaction.category_id,
        max_date: today.max(transaction.date),
    };
    let form = transaction_form_view(
        FormAction::Update(&update_endpoint),
        &defaults,
        categories,
        "",
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Transaction", &[dollar_input_styles()], &content)
}
