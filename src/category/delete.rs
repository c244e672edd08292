//! Category deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    access::Actor,
    alert::Alert,
    category::{CategoryId, db::delete_category, get_category},
    user::UserID,
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle category deletion. Returns success alert or error.
///
/// Transactions in the category become uncategorized.
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<DeleteCategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let can_access = Actor::load(user_id, &connection).and_then(|actor| {
        let category = get_category(category_id, &connection)?;
        actor.ensure_can_access(category.user_id)
    });

    match can_access {
        Ok(()) => {}
        Err(Error::NotFound) => return Error::DeleteMissingCategory.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    }

    match delete_category(category_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Category deleted successfully".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingCategory) => Error::DeleteMissingCategory.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::Html;

    use crate::{
        Error, PasswordHash,
        category::{CategoryColor, CategoryName, create_category, delete_category_endpoint, get_category},
        db::initialize,
        test_utils::{assert_valid_html, get_header, parse_html_fragment},
        user::{Email, NewUser, UserID, create_user},
    };

    use super::DeleteCategoryState;

    fn get_delete_category_state() -> (DeleteCategoryState, UserID, UserID) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
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
            DeleteCategoryState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            ids[0],
            ids[1],
        )
    }

    #[tokio::test]
    async fn delete_category_endpoint_succeeds() {
        let (state, alice, _) = get_delete_category_state();
        let category = create_category(
            CategoryName::new_unchecked("Test Category"),
            CategoryColor::default(),
            alice,
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test category");

        let response = delete_category_endpoint(Path(category.id), State(state.clone()), Extension(alice))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_category(category.id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_category_endpoint_with_invalid_id_returns_error_html() {
        let (state, alice, _) = get_delete_category_state();
        let invalid_id = 999999;

        let response = delete_category_endpoint(Path(invalid_id), State(state), Extension(alice))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_header(&response, "content-type"),
            "text/html; charset=utf-8"
        );

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_error_content(&html, "Could not delete category");
    }

    #[tokio::test]
    async fn other_user_cannot_delete_category() {
        let (state, alice, bob) = get_delete_category_state();
        let category = create_category(
            CategoryName::new_unchecked("Alice's"),
            CategoryColor::default(),
            alice,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = delete_category_endpoint(Path(category.id), State(state.clone()), Extension(bob))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(get_category(category.id, &state.db_connection.lock().unwrap()).is_ok());
    }

    #[track_caller]
    fn assert_error_content(html: &Html, want_error_message: &str) {
        let p = scraper::Selector::parse("p.font-semibold").unwrap();
        let error_message = html
            .select(&p)
            .next()
            .expect("No error message found")
            .text()
            .collect::<Vec<_>>()
            .join("");
        let got_error_message = error_message.trim();

        assert_eq!(want_error_message, got_error_message);
    }
}
