//! The admin page listing every member of the family.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    access::Actor,
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links,
    },
    navigation::NavBar,
    user::{User, UserID, get_all_users},
};

/// The state needed for the users page.
#[derive(Debug, Clone)]
pub struct UsersPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UsersPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the list of users, newest first.
///
/// Only admins may view this page, everyone else gets a 403 page.
pub async fn get_users_page(
    State(state): State<UsersPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let actor = Actor::load(user_id, &connection)?;
    actor.require_admin()?;

    let users = get_all_users(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve users: {error}"))?;

    Ok(users_view(&users, actor.user_id).into_response())
}

fn users_view(users: &[User], current_user: UserID) -> Markup {
    let nav_bar = NavBar::new(endpoints::USERS_VIEW, true).into_html();

    let table_row = |user: &User| {
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_USER_VIEW, user.id.as_i64());
        let delete_url = endpoints::format_endpoint(endpoints::USER, user.id.as_i64());
        let confirm_message = format!(
            "Are you sure you want to delete {}? All of their transactions and categories will be deleted too.",
            user.display_name()
        );

        html!(
            tr class=(TABLE_ROW_STYLE) data-user-row="true"
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (user.full_name.as_deref().unwrap_or("N/A"))
                }

                td class=(TABLE_CELL_STYLE) { (user.email) }

                td class=(TABLE_CELL_STYLE) { (user.role_label()) }

                td class=(TABLE_CELL_STYLE) { (user.created_at.date()) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        @if user.id == current_user {
                            a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                        } @else {
                            (edit_delete_action_links(
                                &edit_url,
                                &delete_url,
                                &confirm_message,
                                "closest tr",
                                "delete",
                            ))
                        }
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Users" }

                    a href=(endpoints::NEW_USER_VIEW) class=(LINK_STYLE)
                    {
                        "Add User"
                    }
                }

                section class="overflow-x-auto dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Email" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Role" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for user in users {
                                (table_row(user))
                            }
                        }
                    }
                }
            }
        }
    );

    base("Users", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        PasswordHash,
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        user::{Email, NewUser, UserID, create_user},
    };

    use super::{UsersPageState, get_users_page};

    fn get_test_state() -> (UsersPageState, UserID, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let admin = create_user(
            NewUser {
                email: Email::new_unchecked("admin@example.com"),
                full_name: Some("Ada Admin".to_owned()),
                is_admin: true,
                password_hash: PasswordHash::new_unchecked("hunter2"),
            },
            &connection,
        )
        .unwrap();
        let member = create_user(
            NewUser {
                email: Email::new_unchecked("kid@example.com"),
                full_name: None,
                is_admin: false,
                password_hash: PasswordHash::new_unchecked("hunter2"),
            },
            &connection,
        )
        .unwrap();

        (
            UsersPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            admin.id,
            member.id,
        )
    }

    #[tokio::test]
    async fn admin_sees_all_users() {
        let (state, admin_id, _) = get_test_state();

        let response = get_users_page(State(state), Extension(admin_id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let rows = html
            .select(&Selector::parse("tr[data-user-row]").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 2);

        // Newest first.
        let first_row_text = rows[0].text().collect::<String>();
        assert!(first_row_text.contains("N/A"), "got {first_row_text}");
        assert!(first_row_text.contains("kid@example.com"));
        assert!(first_row_text.contains("User"));
        let second_row_text = rows[1].text().collect::<String>();
        assert!(second_row_text.contains("Ada Admin"));
        assert!(second_row_text.contains("Super Admin"));
    }

    #[tokio::test]
    async fn admin_cannot_delete_themselves_from_list() {
        let (state, admin_id, member_id) = get_test_state();

        let response = get_users_page(State(state), Extension(admin_id))
            .await
            .into_response();

        let html = parse_html_document(response).await;
        let delete_buttons = html
            .select(&Selector::parse("button[hx-delete]").unwrap())
            .map(|button| button.value().attr("hx-delete").unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(delete_buttons, vec![format!("/api/users/{member_id}")]);
    }

    #[tokio::test]
    async fn regular_user_is_forbidden() {
        let (state, _, member_id) = get_test_state();

        let response = get_users_page(State(state), Extension(member_id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
