//! The admin page and endpoint for adding a member of the family.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    access::Actor,
    auth::PASSWORD_INPUT_MIN_LENGTH,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, email_input, full_name_input,
        password_input,
    },
    navigation::NavBar,
    user::{Email, NewUser, UserID, create_user, normalize_full_name},
};

/// The state needed for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used when hashing the new user's password.
    pub hash_cost: u32,
}

impl FromRef<AppState> for CreateUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            hash_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// The data entered into the new user form.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NewUserForm {
    pub email: String,
    pub full_name: Option<String>,
    pub password: String,
    /// Set when the admin checkbox is ticked.
    pub is_admin: Option<String>,
}

#[derive(Default)]
struct NewUserFormErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
}

/// Render the page for adding a user.
pub async fn get_new_user_page(
    State(state): State<CreateUserState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    Actor::load(user_id, &connection)?.require_admin()?;

    Ok(new_user_view().into_response())
}

/// Handle the new user form.
///
/// Validation errors are shown in the form, everything else is shown as an
/// alert.
pub async fn create_user_endpoint(
    State(state): State<CreateUserState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<NewUserForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = Actor::load(user_id, &connection).and_then(|actor| actor.require_admin())
    {
        return error.into_alert_response();
    }

    let email = match Email::new(&form.email) {
        Ok(email) => email,
        Err(error) => {
            return new_user_form_view(
                &form,
                NewUserFormErrors {
                    email: Some(&error.to_string()),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let full_name = normalize_full_name(form.full_name.as_deref());
    let mut user_inputs = vec![email.as_ref()];
    if let Some(full_name) = &full_name {
        user_inputs.push(full_name);
    }

    let password_hash = match ValidatedPassword::new(&form.password, &user_inputs)
        .and_then(|password| PasswordHash::new(password, state.hash_cost))
    {
        Ok(hash) => hash,
        Err(error @ Error::TooWeak(_)) => {
            return new_user_form_view(
                &form,
                NewUserFormErrors {
                    password: Some(&error.to_string()),
                    ..Default::default()
                },
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return error.into_alert_response();
        }
    };

    let new_user = NewUser {
        email,
        full_name,
        is_admin: form.is_admin.is_some(),
        password_hash,
    };

    match create_user(new_user, &connection) {
        Ok(user) => {
            tracing::info!("User {user_id} added user {}", user.id);
            (
                HxRedirect(endpoints::USERS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::DuplicateEmail) => new_user_form_view(
            &form,
            NewUserFormErrors {
                email: Some("A user with that email address already exists."),
                ..Default::default()
            },
        )
        .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a user: {error}");
            error.into_alert_response()
        }
    }
}

fn new_user_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_USER_VIEW, true).into_html();
    let form = new_user_form_view(&NewUserForm::default(), NewUserFormErrors::default());

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Add User", &[], &content)
}

fn new_user_form_view(form: &NewUserForm, errors: NewUserFormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (email_input(&form.email, errors.email))
            (full_name_input(form.full_name.as_deref().unwrap_or_default()))
            (password_input(&form.password, PASSWORD_INPUT_MIN_LENGTH, errors.password))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="is_admin"
                    id="is_admin"
                    checked[form.is_admin.is_some()]
                    class="rounded-xs";

                label
                    for="is_admin"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Admin (can see and manage everyone's data)"
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add User" }
        }
    }
}
