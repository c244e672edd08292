//! Table views for dashboard data display.
//!
//! Provides the monthly summary table listing income, expenses and the
//! balance for each month of the dashboard window.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    dashboard::aggregation::MonthBucket,
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency},
};

const TABLE_DATA_CELL_STYLE: &str = "text-right whitespace-nowrap";
const TABLE_CELL_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const TABLE_CELL_RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// Gets the CSS class for coloring amounts (green for positive, red for negative).
fn amount_color_class(amount: Decimal) -> &'static str {
    if amount.is_sign_negative() && !amount.is_zero() {
        TABLE_CELL_RED_STYLE
    } else {
        TABLE_CELL_GREEN_STYLE
    }
}

/// Renders a table with one row per month, most recent month first.
pub(super) fn monthly_summary_table(buckets: &[MonthBucket]) -> Markup {
    html! {
        div class="w-full" {
            h3 class="text-xl font-semibold mb-4" { "Monthly Summary" }

            div
                id="monthly-summary-table"
                class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Income" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Expenses" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Balance" }
                        }
                    }
                    tbody {
                        @for bucket in buckets.iter().rev() {
                            tr class=(TABLE_ROW_STYLE) data-month-row {
                                th
                                    scope="row"
                                    class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"}
                                {
                                    (bucket.label) " " (bucket.year)
                                }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE) " " (TABLE_CELL_GREEN_STYLE)} {
                                    (format_currency(bucket.income))
                                }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE) " " (TABLE_CELL_RED_STYLE)} {
                                    (format_currency(bucket.expense))
                                }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE) " " (amount_color_class(bucket.balance))} {
                                    (format_currency(bucket.balance))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
