//! The admin page and endpoint for changing a user's name and role.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    access::Actor,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        full_name_input,
    },
    navigation::NavBar,
    user::{User, UserID, get_user_by_id, normalize_full_name, update_user},
};

/// The state needed for the edit user page and endpoint.
#[derive(Debug, Clone)]
pub struct EditUserState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data entered into the edit user form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditUserForm {
    pub full_name: Option<String>,
    /// Set when the admin checkbox is ticked.
    pub is_admin: Option<String>,
}

/// Render the page for editing a user.
pub async fn get_edit_user_page(
    Path(target_id): Path<i64>,
    State(state): State<EditUserState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    Actor::load(user_id, &connection)?.require_admin()?;

    let user = get_user_by_id(UserID::new(target_id), &connection)?;

    Ok(edit_user_view(&user).into_response())
}

/// Handle the edit user form.
///
/// Admins cannot remove their own admin role, otherwise the family could be
/// left without an admin.
pub async fn update_user_endpoint(
    Path(target_id): Path<i64>,
    State(state): State<EditUserState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<EditUserForm>,
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
    let is_admin = form.is_admin.is_some();

    if target_id == actor.user_id && !is_admin {
        return Error::CannotDemoteSelf.into_alert_response();
    }

    let full_name = normalize_full_name(form.full_name.as_deref());

    match update_user(target_id, full_name.as_deref(), is_admin, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::USERS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingUser) => Error::UpdateMissingUser.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating user {target_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_user_view(user: &User) -> Markup {
    let nav_bar = NavBar::new(endpoints::USERS_VIEW, true).into_html();
    let update_endpoint = endpoints::format_endpoint(endpoints::USER, user.id.as_i64());

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                    input
                        type="email"
                        id="email"
                        value=(user.email)
                        disabled
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (full_name_input(user.full_name.as_deref().unwrap_or_default()))

                div class="flex items-center gap-x-3"
                {
                    input
                        type="checkbox"
                        name="is_admin"
                        id="is_admin"
                        checked[user.is_admin]
                        class="rounded-xs";

                    label
                        for="is_admin"
                        class="block text-sm font-medium text-gray-900 dark:text-white"
                    {
                        "Admin (can see and manage everyone's data)"
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update User" }
            }
        }
    };

    base("Edit User", &[], &content)
}
