//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - HTML view functions for rendering the dashboard UI
//! - The state and query types used by the handler

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    access::Actor,
    dashboard::{
        aggregation::{
            DASHBOARD_WINDOW_MONTHS, Timeframe, aggregate_months, months_in_period, roll_up,
            summarize, totals,
        },
        cards::summary_cards_view,
        charts::{DashboardChart, cash_flow_chart, charts_script, charts_view, expenses_chart},
        tables::monthly_summary_table,
        transaction::{LedgerLoad, RejectedRow, get_category_colors, get_ledger_entries},
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    timezone::get_local_date,
    user::UserID,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string for the dashboard page.
///
/// The timeframe is kept as text so that an unknown value falls back to the
/// monthly view instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// How to group the charts and which period the summary cards cover.
    #[serde(default)]
    pub timeframe: Option<String>,
}

impl DashboardQuery {
    /// The requested timeframe, or [Timeframe::Month] if it is missing or unknown.
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
            .as_deref()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

/// Display a page with an overview of the user's finances.
///
/// Admins see the totals for the whole family.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let timeframe = query.timeframe();
    let today = get_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let actor = Actor::load(user_id, &connection)?;
    let owner = actor.owner_scope();

    let LedgerLoad { entries, rejected } = get_ledger_entries(owner, &connection)
        .inspect_err(|error| tracing::error!("could not load dashboard transactions: {error}"))?;
    let category_colors = get_category_colors(owner, &connection)
        .inspect_err(|error| tracing::error!("could not load category colors: {error}"))?;
    drop(connection);

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW, actor.is_admin).into_html();
    let heading = dashboard_heading(actor.is_admin);

    if entries.is_empty() && rejected.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar, heading).into_response());
    }

    let buckets = aggregate_months(&entries, today, DASHBOARD_WINDOW_MONTHS);
    let periods = roll_up(&buckets, timeframe);
    let all_time = totals(&entries);
    let this_period = summarize(&entries, &months_in_period(today, timeframe));

    let subtitle = format!("Last {DASHBOARD_WINDOW_MONTHS} months, {}", timeframe.label());
    let charts = [
        DashboardChart {
            id: "cash-flow-chart",
            options: cash_flow_chart(&periods, &subtitle).to_string(),
        },
        DashboardChart {
            id: "expenses-chart",
            options: expenses_chart(&periods, &category_colors, &subtitle).to_string(),
        },
    ];

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            div class="flex flex-wrap justify-between items-baseline w-full mb-6 gap-4"
            {
                h2 class="text-2xl font-bold" { (heading) }
                (timeframe_picker(timeframe))
            }

            @if !rejected.is_empty() {
                (data_integrity_alert(&rejected))
            }

            (summary_cards_view("All time", &all_time))
            (summary_cards_view(timeframe.current_period_label(), &this_period))
            (charts_view(&charts))
            (monthly_summary_table(&buckets))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        HeadElement::ScriptLink("/static/echarts-gl.2.0.9.min.js".to_owned()),
        charts_script(&charts),
    ];

    Ok(base("Dashboard", &scripts, &content).into_response())
}

fn dashboard_heading(is_admin: bool) -> &'static str {
    if is_admin {
        "Family Finance Dashboard"
    } else {
        "Personal Finance Dashboard"
    }
}

fn timeframe_picker(selected: Timeframe) -> Markup {
    html! {
        nav aria-label="Timeframe" class="inline-flex rounded shadow-sm" {
            @for timeframe in Timeframe::ALL {
                @let style = if timeframe == selected {
                    "px-4 py-2 text-sm font-medium text-white bg-blue-600 border border-blue-600"
                } else {
                    "px-4 py-2 text-sm font-medium text-gray-900 bg-white border
                    border-gray-200 hover:bg-gray-100 dark:bg-gray-800
                    dark:border-gray-700 dark:text-white dark:hover:bg-gray-700"
                };

                a
                    href=(format!("{}?timeframe={}", endpoints::DASHBOARD_VIEW, timeframe.as_str()))
                    class=(style)
                    aria-current=[(timeframe == selected).then_some("page")]
                {
                    (timeframe.label())
                }
            }
        }
    }
}

fn data_integrity_alert(rejected: &[RejectedRow]) -> Markup {
    let count = rejected.len();
    let noun = if count == 1 { "transaction was" } else { "transactions were" };

    html! {
        div
            role="alert"
            data-integrity-alert
            class="w-full p-4 mb-6 text-sm text-yellow-800 rounded-lg bg-yellow-50
                dark:bg-gray-800 dark:text-yellow-300"
        {
            p class="font-medium" {
                (count) " " (noun) " excluded from the dashboard because their amounts could not be read."
            }
            p {
                "Transaction IDs: "
                (rejected.iter().map(|row| row.transaction_id.to_string()).collect::<Vec<_>>().join(", "))
            }
        }
    }
}

fn dashboard_no_data_view(nav_bar: Markup, heading: &str) -> Markup {
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-2xl font-bold mb-4" { (heading) }

            h3 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once you add some transactions.
                Get started by " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::{Html, Selector};
    use time::OffsetDateTime;

    use crate::{
        PasswordHash,
        category::{CategoryColor, CategoryName, create_category},
        dashboard::aggregation::Timeframe,
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{Amount, Transaction, TransactionType, create_transaction},
        user::{Email, NewUser, UserID, create_user},
    };

    use super::{DashboardQuery, DashboardState, get_dashboard_page};

    struct Fixture {
        connection: Connection,
        admin: UserID,
        alice: UserID,
        bob: UserID,
    }

    fn fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let insert_user = |email: &str, is_admin: bool| {
            create_user(
                NewUser {
                    email: Email::new_unchecked(email),
                    full_name: None,
                    is_admin,
                    password_hash: PasswordHash::new_unchecked("hunter2"),
                },
                &connection,
            )
            .unwrap()
            .id
        };
        let admin = insert_user("admin@example.com", true);
        let alice = insert_user("alice@example.com", false);
        let bob = insert_user("bob@example.com", false);

        Fixture {
            connection,
            admin,
            alice,
            bob,
        }
    }

    fn add_transaction(
        amount: rust_decimal::Decimal,
        transaction_type: TransactionType,
        owner: UserID,
        connection: &Connection,
    ) {
        create_transaction(
            Transaction::build(
                Amount::new_unchecked(amount),
                transaction_type,
                OffsetDateTime::now_utc().date(),
                "test",
                owner,
            ),
            connection,
        )
        .unwrap();
    }

    async fn get_page(
        connection: Connection,
        user_id: UserID,
        timeframe: Option<Timeframe>,
    ) -> Html {
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(DashboardQuery {
                timeframe: timeframe.map(|timeframe| timeframe.as_str().to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        html
    }

    fn select_text(html: &Html, selector: &str) -> Vec<String> {
        let selector = Selector::parse(selector).unwrap();
        html.select(&selector)
            .map(|element| element.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn dashboard_page_loads_successfully() {
        let Fixture {
            connection, alice, ..
        } = fixture();
        let food = create_category(
            CategoryName::new("Food").unwrap(),
            CategoryColor::new("#22c55e").unwrap(),
            alice,
            &connection,
        )
        .unwrap();
        add_transaction(dec!(100), TransactionType::Income, alice, &connection);
        create_transaction(
            Transaction::build(
                Amount::new_unchecked(dec!(40)),
                TransactionType::Expense,
                OffsetDateTime::now_utc().date(),
                "groceries",
                alice,
            )
            .category_id(Some(food.id)),
            &connection,
        )
        .unwrap();

        let html = get_page(connection, alice, None).await;

        assert_eq!(select_text(&html, "h2"), ["Personal Finance Dashboard"]);
        assert_eq!(select_text(&html, "#cash-flow-chart").len(), 1);
        assert_eq!(select_text(&html, "#expenses-chart").len(), 1);
        assert_eq!(select_text(&html, "tr[data-month-row]").len(), 12);
        assert_eq!(
            select_text(&html, "[data-summary='All time'] [data-amount]"),
            ["$100.00", "$40.00", "$60.00"]
        );
        assert_eq!(
            select_text(&html, "[data-summary='This month'] [data-amount]"),
            ["$100.00", "$40.00", "$60.00"]
        );
    }

    #[tokio::test]
    async fn members_only_see_their_own_totals() {
        let Fixture {
            connection,
            alice,
            bob,
            ..
        } = fixture();
        add_transaction(dec!(100), TransactionType::Income, alice, &connection);
        add_transaction(dec!(30), TransactionType::Income, bob, &connection);

        let html = get_page(connection, bob, None).await;

        assert_eq!(
            select_text(&html, "[data-summary='All time'] [data-amount]"),
            ["$30.00", "$0.00", "$30.00"]
        );
    }

    #[tokio::test]
    async fn admins_see_family_totals() {
        let Fixture {
            connection,
            admin,
            alice,
            bob,
        } = fixture();
        add_transaction(dec!(100), TransactionType::Income, alice, &connection);
        add_transaction(dec!(30), TransactionType::Expense, bob, &connection);

        let html = get_page(connection, admin, Some(Timeframe::Year)).await;

        assert_eq!(select_text(&html, "h2"), ["Family Finance Dashboard"]);
        assert_eq!(
            select_text(&html, "[data-summary='This year'] [data-amount]"),
            ["$100.00", "$30.00", "$70.00"]
        );
        assert_eq!(
            select_text(&html, "nav[aria-label='Timeframe'] a[aria-current='page']"),
            ["Yearly"]
        );
    }

    #[tokio::test]
    async fn displays_prompt_text_on_no_data() {
        let Fixture {
            connection, alice, ..
        } = fixture();

        let html = get_page(connection, alice, None).await;

        assert_eq!(select_text(&html, "h3"), ["Nothing here yet..."]);
        assert!(select_text(&html, "#cash-flow-chart").is_empty());
    }

    #[tokio::test]
    async fn reports_rows_with_unreadable_amounts() {
        let Fixture {
            connection, alice, ..
        } = fixture();
        add_transaction(dec!(10), TransactionType::Income, alice, &connection);
        connection
            .execute(
                "INSERT INTO \"transaction\" (description, amount, type, date, user_id)
                VALUES ('broken', 'abc', 'expense', ?1, ?2)",
                (OffsetDateTime::now_utc().date(), alice.as_i64()),
            )
            .unwrap();

        let html = get_page(connection, alice, None).await;

        let alert = select_text(&html, "[data-integrity-alert] p");
        assert!(alert[0].starts_with("1 transaction was excluded"), "{alert:?}");
        assert_eq!(
            select_text(&html, "[data-summary='All time'] [data-amount]"),
            ["$10.00", "$0.00", "$10.00"]
        );
    }

    #[test]
    fn timeframe_query_parses() {
        let cases = [
            ("timeframe=quarter", Timeframe::Quarter),
            ("timeframe=Year", Timeframe::Year),
            ("", Timeframe::Month),
            ("timeframe=", Timeframe::Month),
            ("timeframe=bogus", Timeframe::Month),
        ];

        for (query_string, want) in cases {
            let query: DashboardQuery = serde_urlencoded::from_str(query_string).unwrap();
            assert_eq!(query.timeframe(), want, "parsing {query_string:?}");
        }
    }

    #[tokio::test]
    async fn unknown_timeframe_shows_monthly_view() {
        let Fixture {
            connection, alice, ..
        } = fixture();
        add_transaction(dec!(10), TransactionType::Income, alice, &connection);
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(
            State(state),
            Extension(alice),
            Query(DashboardQuery {
                timeframe: Some("bogus".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_eq!(
            select_text(&html, "nav[aria-label='Timeframe'] a[aria-current='page']"),
            ["Monthly"]
        );
    }
}
