//! Categories listing page.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

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
    category::{Category, count_transactions_per_category, get_categories},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, category_badge, edit_delete_action_links,
    },
    navigation::NavBar,
    user::{UserID, get_all_users},
};

/// The state needed for the categories listing page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A category with the details shown in its table row.
#[derive(Debug, Clone)]
struct CategoryRow {
    category: Category,
    edit_url: String,
    transaction_count: u32,
    /// The owner's name, only filled in for admins.
    owner: Option<String>,
}

/// Render the categories listing page with transaction counts.
///
/// Admins see every user's categories along with who owns them.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let actor = Actor::load(user_id, &connection)?;

    let categories = get_categories(actor.owner_scope(), &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let transactions_per_category = count_transactions_per_category(&connection).inspect_err(
        |error| tracing::error!("Could not count transactions per category: {error}"),
    )?;

    let owner_names: HashMap<UserID, String> = if actor.is_admin {
        get_all_users(&connection)?
            .into_iter()
            .map(|user| (user.id, user.display_name().to_owned()))
            .collect()
    } else {
        HashMap::new()
    };

    let rows = categories
        .into_iter()
        .map(|category| {
            let transaction_count = *transactions_per_category
                .get(&category.id)
                .unwrap_or(&0);
            let owner = actor
                .is_admin
                .then(|| owner_names.get(&category.user_id).cloned().unwrap_or_default());

            CategoryRow {
                edit_url: endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id),
                category,
                transaction_count,
                owner,
            }
        })
        .collect::<Vec<_>>();

    Ok(categories_view(&rows, actor.is_admin).into_response())
}

fn categories_view(rows: &[CategoryRow], is_admin: bool) -> Markup {
    let new_category_route = endpoints::NEW_CATEGORY_VIEW;
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW, is_admin).into_html();
    let column_count = if is_admin { 4 } else { 3 };

    let table_row = |row: &CategoryRow| {
        let delete_url = endpoints::format_endpoint(endpoints::CATEGORY, row.category.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? {} transaction(s) will become uncategorized.",
            row.category.name, row.transaction_count
        );

        html!(
            tr class=(TABLE_ROW_STYLE) data-category-row="true"
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (category_badge(Some((row.category.name.as_ref(), row.category.color.as_ref()))))
                }

                @if let Some(owner) = &row.owner {
                    td class=(TABLE_CELL_STYLE) { (owner) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (row.transaction_count)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
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
                    h1 class="text-xl font-bold" { "Categories" }

                    a href=(new_category_route) class=(LINK_STYLE)
                    {
                        "Create Category"
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
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Name"
                                }
                                @if is_admin {
                                    th scope="col" class=(TABLE_CELL_STYLE)
                                    {
                                        "Owner"
                                    }
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Transactions"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Actions"
                                }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan=(column_count)
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No categories created yet. "
                                        a href=(new_category_route) class=(LINK_STYLE)
                                        {
                                            "Create your first category"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Categories", &[], &content)
}
