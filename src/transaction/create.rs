//! The page and endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
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
        create_transaction,
        form::{FormAction, TransactionForm, TransactionFormDefaults, transaction_form_view},
    },
    user::UserID,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the page for creating a transaction.
///
/// Only the logged in user's own categories are offered since the new
/// transaction will belong to them.
pub async fn get_new_transaction_page(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = get_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let actor = Actor::load(user_id, &connection)?;
    let categories = get_categories(Some(actor.user_id), &connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    Ok(new_transaction_view(
        actor.is_admin,
        &TransactionFormDefaults::new(today),
        &categories,
    )
    .into_response())
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
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

    let actor = match Actor::load(user_id, &connection) {
        Ok(actor) => actor,
        Err(error) => return error.into_alert_response(),
    };

    let builder = match form.to_builder(actor.user_id) {
        Ok(builder) => builder,
        Err(error) => {
            let categories = get_categories(Some(actor.user_id), &connection).unwrap_or_default();

            return transaction_form_view(
                FormAction::Create,
                &form.defaults(today),
                &categories,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    if builder.date > today {
        tracing::error!(
            "Tried to perform an operation with a future date (e.g., create a transaction)"
        );

        return Error::FutureDate(builder.date).into_alert_response();
    }

    if let Err(error) = create_transaction(builder, &connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn new_transaction_view(
    is_admin: bool,
    defaults: &TransactionFormDefaults<'_>,
    categories: &[Category],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW, is_admin).into_html();
    let form = transaction_form_view(FormAction::Create, defaults, categories, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Transaction", &[dollar_input_styles()], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::{Duration, OffsetDateTime};

    use crate::{
        PasswordHash,
        category::{CategoryColor, CategoryName, create_category},
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_error_message, assert_form_input, assert_form_submit_button,
            assert_hx_endpoint, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment,
        },
        transaction::{
            TransactionFilter, TransactionType, create::CreateTransactionState,
            create_transaction_endpoint, form::TransactionForm, get_new_transaction_page,
            get_transaction_rows,
        },
        user::{Email, NewUser, UserID, create_user},
    };

    fn get_state() -> (CreateTransactionState, UserID, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let mut ids = Vec::new();
        for email in ["alice@example.com", "bob@example.com"] {
            let user = create_user(
                NewUser {
                    email: Email::new_unchecked(email),
                    full_name: None,
                    is_admin: false,
                    password_hash: PasswordHash::new_unchecked("hunter2"),
                },
                &connection,
            )
            .unwrap();
            ids.push(user.id);
        }

        (
            CreateTransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            ids[0],
            ids[1],
        )
    }

    fn form(amount: &str, date: time::Date, category_id: Option<i64>) -> TransactionForm {
        TransactionForm {
            type_: TransactionType::Expense,
            amount: amount.to_owned(),
            date,
            description: "test transaction".to_owned(),
            category_id,
        }
    }

    #[tokio::test]
    async fn render_page() {
        let (state, alice, _) = get_state();

        let response = get_new_transaction_page(State(state), Extension(alice))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "date", "date");
        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "type_", "radio");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (state, alice, _) = get_state();
        let today = OffsetDateTime::now_utc().date();

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(alice),
            Form(form("12.30", today, None)),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let rows = get_transaction_rows(
            &TransactionFilter::default(),
            None,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        let transaction = &rows[0].transaction;
        assert_eq!(transaction.amount.as_decimal(), dec!(12.3));
        assert_eq!(transaction.user_id, alice);
        assert_eq!(transaction.date, today);
    }

    #[tokio::test]
    async fn rejects_future_date() {
        let (state, alice, _) = get_state();
        let tomorrow = OffsetDateTime::now_utc().date() + Duration::days(2);

        let response = create_transaction_endpoint(
            State(state),
            Extension(alice),
            Form(form("1", tomorrow, None)),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_amount_is_shown_in_form() {
        let (state, alice, _) = get_state();
        let today = OffsetDateTime::now_utc().date();

        let response = create_transaction_endpoint(
            State(state),
            Extension(alice),
            Form(form("-5", today, None)),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: amount must not be negative");
    }

    #[tokio::test]
    async fn rejects_someone_elses_category() {
        let (state, alice, bob) = get_state();
        let today = OffsetDateTime::now_utc().date();
        let bobs_category = create_category(
            CategoryName::new_unchecked("Fuel"),
            CategoryColor::default(),
            bob,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = create_transaction_endpoint(
            State(state),
            Extension(alice),
            Form(form("1", today, Some(bobs_category.id))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
