//! Category editing page and endpoint.

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

use crate::{
    AppState, Error,
    access::Actor,
    category::{
        CategoryId, DEFAULT_CATEGORY_COLOR, create::category_form_fields,
        domain::CategoryFormData, get_category, update_category,
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    user::UserID,
};

/// The state needed for the edit category page and endpoint.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category editing page.
///
/// Categories owned by someone else are reported as not found unless the
/// user is an admin.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let actor = Actor::load(user_id, &connection)?;
    let category = get_category(category_id, &connection)?;
    actor.ensure_can_access(category.user_id)?;

    let update_endpoint = endpoints::format_endpoint(endpoints::CATEGORY, category_id);

    Ok(edit_category_view(
        actor.is_admin,
        &update_endpoint,
        category.name.as_ref(),
        category.color.as_ref(),
    )
    .into_response())
}

/// Handle category update form submission.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let update_endpoint = endpoints::format_endpoint(endpoints::CATEGORY, category_id);

    let (name, color) = match form.parse() {
        Ok(parsed) => parsed,
        Err(error) => {
            return edit_category_form_view(
                &update_endpoint,
                &form.name,
                form.color.as_deref().unwrap_or(DEFAULT_CATEGORY_COLOR),
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

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
        Err(Error::NotFound) => return Error::UpdateMissingCategory.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    }

    match update_category(category_id, name, color, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingCategory) => Error::UpdateMissingCategory.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_category_view(is_admin: bool, update_endpoint: &str, name: &str, color: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW, is_admin).into_html();
    let form = edit_category_form_view(update_endpoint, name, color, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Category", &[], &content)
}

fn edit_category_form_view(
    update_endpoint: &str,
    name: &str,
    color: &str,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (category_form_fields(name, color))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Category" }
        }
    }
}
