//! Summary cards for the top of the dashboard.
//!
//! Shows total income, total expenses and the balance, both over all time and
//! for the period picked with the timeframe selector.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{dashboard::aggregation::Totals, html::format_currency};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";
const CARD_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const CARD_RED_STYLE: &str = "text-red-600 dark:text-red-400";

fn balance_color_class(balance: Decimal) -> &'static str {
    if balance.is_sign_negative() {
        CARD_RED_STYLE
    } else {
        CARD_GREEN_STYLE
    }
}

/// Renders a row of three cards for `totals` under the heading `title`.
pub(super) fn summary_cards_view(title: &str, totals: &Totals) -> Markup {
    html! {
        section class="w-full mx-auto mb-6" data-summary=(title) {
            h3 class="text-xl font-semibold mb-4" { (title) }

            div class="grid grid-cols-1 sm:grid-cols-3 gap-4" {
                (summary_card("Total Income", totals.income, CARD_GREEN_STYLE))
                (summary_card("Total Expenses", totals.expense, CARD_RED_STYLE))
                (summary_card("Balance", totals.balance, balance_color_class(totals.balance)))
            }
        }
    }
}

fn summary_card(label: &str, amount: Decimal, amount_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) aria-label=(format!("{label}: {}", format_currency(amount))) {
            div class="text-sm text-gray-600 dark:text-gray-400 mb-1" { (label) }
            div class={"text-3xl font-bold " (amount_style)} data-amount { (format_currency(amount)) }
        }
    }
}
