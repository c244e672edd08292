//! Defines the route handler for the page that displays transactions as a table.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    access::Actor,
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, SELECT_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, category_badge, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, create_pagination_indicators, page_count, pagination_view},
    transaction::{
        PageWindow, TransactionRow, TransactionType, TransactionsQuery, count_transactions,
        filter::{CategoryFilter, UNCATEGORIZED_VALUE},
        get_transaction_rows,
    },
    user::UserID,
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to display pages of transactions.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Everything needed to render the transactions page.
struct TransactionsViewModel<'a> {
    is_admin: bool,
    query: &'a TransactionsQuery,
    rows: &'a [TransactionRow],
    categories: &'a [Category],
    total_count: u64,
    pagination: Markup,
}

/// Render a page of transactions matching the filters in the query string.
///
/// Regular users only see their own transactions, admins see everyone's
/// along with who owns each transaction.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let actor = Actor::load(user_id, &connection)?;
    let filter = query.to_filter(actor.owner_scope());
    let config = &state.pagination_config;

    let total_count = count_transactions(&filter, &connection)
        .inspect_err(|error| tracing::error!("could not count transactions: {error}"))?;
    let page_count = page_count(total_count, config.default_page_size);
    let curr_page = query
        .page
        .unwrap_or(config.default_page)
        .clamp(1, page_count);

    let rows = get_transaction_rows(
        &filter,
        Some(PageWindow {
            limit: config.default_page_size,
            offset: (curr_page - 1) * config.default_page_size,
        }),
        &connection,
    )
    .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let categories = get_categories(actor.owner_scope(), &connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let indicators = create_pagination_indicators(curr_page, page_count, config.max_pages);
    let pagination = if page_count > 1 {
        pagination_view(&indicators, |page| {
            query.to_url(endpoints::TRANSACTIONS_VIEW, Some(page))
        })
    } else {
        html!()
    };

    Ok(transactions_view(TransactionsViewModel {
        is_admin: actor.is_admin,
        query: &query,
        rows: &rows,
        categories: &categories,
        total_count,
        pagination,
    })
    .into_response())
}

fn transactions_view(model: TransactionsViewModel<'_>) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW, model.is_admin).into_html();
    let csv_url = model.query.to_url(endpoints::TRANSACTIONS_CSV, None);
    let has_filters = !model.query.to_query_string(None).is_empty();
    let column_count = if model.is_admin { 7 } else { 6 };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    div class="flex gap-4"
                    {
                        a href=(csv_url) class=(LINK_STYLE) download { "Download CSV" }

                        a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                        {
                            "Create Transaction"
                        }
                    }
                }

                (filter_form(model.query, model.categories))

                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    (model.total_count) " transaction(s)"
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class="px-6 py-4 text-right" { "Amount" }
                                @if model.is_admin {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "User" }
                                }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in model.rows {
                                (transaction_row_view(row, model.is_admin))
                            }

                            @if model.rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan=(column_count)
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        @if has_filters {
                                            "No transactions match these filters."
                                        } @else {
                                            "No transactions recorded yet. "
                                            a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                                            {
                                                "Record your first transaction"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                (model.pagination)
            }
        }
    );

    base("Transactions", &[], &content)
}

fn transaction_row_view(row: &TransactionRow, is_admin: bool) -> Markup {
    let transaction = &row.transaction;
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.description
    );
    let (amount, amount_style) = match transaction.transaction_type {
        TransactionType::Income => (
            format_currency(transaction.amount.as_decimal()),
            "px-6 py-4 text-right text-green-600 dark:text-green-400",
        ),
        TransactionType::Expense => (
            format_currency(-transaction.amount.as_decimal()),
            "px-6 py-4 text-right text-red-600 dark:text-red-400",
        ),
    };
    let category = row
        .category
        .as_ref()
        .map(|(name, color)| (name.as_str(), color.as_str()));

    html!(
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE) { (category_badge(category)) }
            td class=(TABLE_CELL_STYLE) { (transaction.transaction_type) }
            td class=(amount_style) { (amount) }
            @if is_admin {
                td class=(TABLE_CELL_STYLE) data-owner { (row.owner_name) }
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
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
    )
}

fn filter_form(query: &TransactionsQuery, categories: &[Category]) -> Markup {
    let search = query.search.as_deref().unwrap_or_default();
    let selected_type = query.transaction_type.as_deref().unwrap_or_default();
    let selected_category = query.category_filter();
    let from = query.from.as_deref().unwrap_or_default();
    let to = query.to.as_deref().unwrap_or_default();

    html!(
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            id="transaction-filters"
            class="grid grid-cols-1 md:grid-cols-3 lg:grid-cols-6 gap-4 items-end"
        {
            div class="lg:col-span-2"
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    id="search"
                    type="search"
                    name="search"
                    value=(search)
                    placeholder="Description"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="type" class=(FORM_LABEL_STYLE) { "Type" }
                select id="type" name="type" class=(SELECT_STYLE)
                {
                    option value="" selected[selected_type.is_empty()] { "All types" }
                    @for transaction_type in [TransactionType::Income, TransactionType::Expense] {
                        option
                            value=(transaction_type.as_str())
                            selected[selected_type == transaction_type.as_str()]
                        {
                            (transaction_type.label())
                        }
                    }
                }
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                select id="category" name="category" class=(SELECT_STYLE)
                {
                    option value="" selected[selected_category == CategoryFilter::Any]
                    {
                        "All categories"
                    }
                    option
                        value=(UNCATEGORIZED_VALUE)
                        selected[selected_category == CategoryFilter::Uncategorized]
                    {
                        "Uncategorized"
                    }
                    @for category in categories {
                        option
                            value=(category.id)
                            selected[selected_category == CategoryFilter::Id(category.id)]
                        {
                            (category.name)
                        }
                    }
                }
            }

            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input id="from" type="date" name="from" value=(from) class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input id="to" type="date" name="to" value=(to) class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex gap-4 items-center lg:col-span-6"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Clear" }
            }
        }
    )
}
