//! The endpoint for deleting a user and everything they own.

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
    user::{UserID, delete_user},
};

/// The state needed for deleting a user.
#[derive(Debug, Clone)]
pub struct DeleteUserState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle user deletion. Returns a success alert or an error alert.
pub async fn delete_user_endpoint(
    Path(target_id): Path<i64>,
    State(state): State<DeleteUserState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
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

    if let Err(error) = actor.require_admin() {
        return error.into_alert_response();
    }

    let target_id = UserID::new(target_id);

    if target_id == actor.user_id {
        return Error::CannotDeleteSelf.into_alert_response();
    }

    match delete_user(target_id, &connection) {
        Ok(()) => {
            tracing::info!("User {user_id} deleted user {target_id}");
            Alert::SuccessSimple {
                message: "User deleted successfully".to_owned(),
            }
            .into_response()
        }
        Err(Error::DeleteMissingUser) => Error::DeleteMissingUser.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting user {target_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        db::initialize,
        test_utils::{assert_valid_html, parse_html_fragment},
        user::{Email, NewUser, UserID, create_user, get_user_by_id},
    };

    use super::{DeleteUserState, delete_user_endpoint};

    fn get_test_state() -> (DeleteUserState, UserID, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let mut ids = Vec::new();
        for (email, is_admin) in [("admin@example.com", true), ("member@example.com", false)] {
            let user = create_user(
                NewUser {
                    email: Email::new_unchecked(email),
                    full_name: None,
                    is_admin,
                    password_hash: PasswordHash::new_unchecked("hunter2"),
                },
                &connection,
            )
            .unwrap();
            ids.push(user.id);
        }

        (
            DeleteUserState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            ids[0],
            ids[1],
        )
    }

    #[tokio::test]
    async fn admin_can_delete_member() {
        let (state, admin_id, member_id) = get_test_state();

        let response = delete_user_endpoint(
            Path(member_id.as_i64()),
            State(state.clone()),
            Extension(admin_id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_user_by_id(member_id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn admin_cannot_delete_themselves() {
        let (state, admin_id, _) = get_test_state();

        let response =
            delete_user_endpoint(Path(admin_id.as_i64()), State(state.clone()), Extension(admin_id))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("You cannot delete your own account."));
        assert!(get_user_by_id(admin_id, &state.db_connection.lock().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn deleting_missing_user_returns_not_found() {
        let (state, admin_id, _) = get_test_state();

        let response = delete_user_endpoint(Path(999), State(state), Extension(admin_id)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn member_cannot_delete_users() {
        let (state, admin_id, member_id) = get_test_state();

        let response =
            delete_user_endpoint(Path(admin_id.as_i64()), State(state), Extension(member_id))
                .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
