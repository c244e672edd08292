//! Shared page layout, styles and small HTML helpers.
use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};
use rust_decimal::{Decimal, prelude::ToPrimitive};

pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500 \
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600";
pub const SELECT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white bg-gray-50 dark:bg-gray-700 border \
    border-gray-300 dark:border-gray-600 focus:ring-blue-600 focus:border-blue-600";

// Radio buttons drawn as toggle cards, used for picking income or expense.
pub const FORM_RADIO_GROUP_STYLE: &str = "flex flex-col gap-2";
pub const FORM_RADIO_INPUT_STYLE: &str = "peer h-4 w-4 shrink-0 cursor-pointer \
    text-blue-600 border-gray-300 dark:border-gray-600 focus-visible:ring-2 \
    focus-visible:ring-blue-500";
pub const FORM_RADIO_LABEL_STYLE: &str = "flex-1 rounded border border-gray-300 \
    dark:border-gray-600 bg-white dark:bg-gray-700 px-3 py-2 text-sm font-medium \
    text-gray-700 dark:text-white cursor-pointer hover:bg-gray-50 \
    hover:dark:bg-gray-600 peer-checked:border-blue-600 peer-checked:bg-blue-50 \
    peer-checked:text-blue-700 peer-checked:dark:bg-blue-600/20 \
    peer-checked:dark:text-blue-200";

pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";
pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";
pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

const BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold rounded-full";

pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

/// Extra tags for the `<head>` of a single page.
pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
    Style(PreEscaped<String>),
}

/// The document every page is rendered into.
pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Family Finance" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link rel="icon" type="image/png" href="/static/favicon-128x128.png" sizes="128x128";
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" integrity="sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg" {}

                style
                {
                    r#"
                    #indicator .htmx-indicator { display: none; }
                    #indicator.htmx-request .htmx-indicator,
                    #indicator.htmx-request.htmx-indicator { display: inline; }
                    .echarts-tooltip { z-index: 30 !important; }
                    "#
                }

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                        HeadElement::Style(text) => style { (text) }
                    }
                }
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900 pb-[calc(5rem+env(safe-area-inset-bottom))] lg:pb-0"
            {
                (content)

                // Target for alerts swapped in by htmx.
                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

/// A full page explaining that something went wrong, with a link home.
pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-sm text-center lg:py-16"
            {
                h1 class="mb-4 text-7xl lg:text-9xl font-extrabold tracking-tight text-blue-600 dark:text-blue-500"
                {
                    (header)
                }

                p class="mb-4 text-3xl md:text-4xl font-bold tracking-tight text-gray-900 dark:text-white"
                {
                    (description)
                }

                p class="mb-4 text-xl md:text-2xl tracking-tight text-gray-900 dark:text-white"
                {
                    (fix)
                }

                a
                    href="/"
                    class="inline-flex my-4 px-5 py-2.5 rounded text-sm font-medium text-white bg-blue-600 hover:bg-blue-800"
                {
                    "Back to Homepage"
                }
            }
        }
    );

    base(title, &[], &content)
}

/// The card that holds the log-in and registration forms.
pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            div class="flex items-center mb-6 text-2xl font-semibold text-gray-900 dark:text-white"
            {
                img class="w-8 h-8 mr-2" src="/static/favicon-128x128.png" alt="";
                "Family Finance"
            }

            div class="w-full sm:max-w-md p-6 sm:p-8 space-y-4 md:space-y-6 bg-white rounded-lg shadow dark:bg-gray-800 dark:border dark:border-gray-700"
            {
                h1 class="text-xl md:text-2xl font-bold leading-tight tracking-tight text-gray-900 dark:text-white"
                {
                    (form_title)
                }

                (form)
            }
        }
    }
}

/// A labelled form control with an optional error message below it.
fn field(id: &str, label: &str, control: Markup, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            (control)

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

pub fn email_input(email: &str, error_message: Option<&str>) -> Markup {
    field(
        "email",
        "Email",
        html! {
            input
                type="email"
                name="email"
                id="email"
                placeholder="name@example.com"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autofocus
                value=(email);
        },
        error_message,
    )
}

pub fn password_input(password: &str, min_length: u8, error_message: Option<&str>) -> Markup {
    field(
        "password",
        "Password",
        html! {
            input
                type="password"
                name="password"
                id="password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=(password)
                minlength=(min_length);
        },
        error_message,
    )
}

pub fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    field(
        "confirm-password",
        "Confirm Password",
        html! {
            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()];
        },
        error_message,
    )
}

pub fn full_name_input(full_name: &str) -> Markup {
    field(
        "full_name",
        "Full Name (optional)",
        html! {
            input
                type="text"
                name="full_name"
                id="full_name"
                placeholder="Jane Doe"
                class=(FORM_TEXT_INPUT_STYLE)
                value=(full_name);
        },
        None,
    )
}

/// Shown on submit buttons while htmx waits for a response.
pub fn loading_spinner() -> Markup {
    // SVG from https://flowbite.com/docs/components/spinner/
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

/// Puts a dollar sign in front of amount inputs wrapped in `.input-wrapper`.
pub fn dollar_input_styles() -> HeadElement {
    HeadElement::Style(PreEscaped(
        r#"
        .input-wrapper { position: relative; display: inline-block; }
        .input-wrapper input[type="number"] { padding-left: 1.4rem; }
        .input-wrapper::before {
            content: '$';
            position: absolute;
            left: 0.6rem;
            top: 50%;
            transform: translateY(-50%);
            pointer-events: none;
        }
        "#
        .to_owned(),
    ))
}

fn dollar_formatter() -> Option<&'static Formatter> {
    static FORMATTER: OnceLock<Option<Formatter>> = OnceLock::new();

    FORMATTER
        .get_or_init(|| {
            Formatter::currency("$")
                .inspect_err(|error| tracing::error!("could not build currency formatter: {error:?}"))
                .ok()
                .map(|formatter| formatter.precision(Precision::Decimals(2)))
        })
        .as_ref()
}

/// Formats `amount` as dollars and cents, e.g. "$1,234.50" or "-$12.00".
pub fn format_currency(amount: Decimal) -> String {
    let amount = amount.round_dp(2);
    if amount.is_zero() {
        return "$0.00".to_owned();
    }

    let sign = if amount.is_sign_negative() { "-" } else { "" };
    let magnitude = amount.abs();

    let mut dollars = match (dollar_formatter(), magnitude.to_f64()) {
        (Some(formatter), Some(number)) => formatter.fmt_string(number),
        _ => format!("${magnitude:.2}"),
    };

    // numfmt drops trailing zeros, e.g. "$12.3" and "$12".
    match dollars.rfind('.') {
        Some(index) if dollars.len() - index == 2 => dollars.push('0'),
        None => dollars.push_str(".00"),
        _ => {}
    }

    format!("{sign}{dollars}")
}

/// A badge showing a category name on the category's colour.
///
/// Transactions without a category get a grey "Uncategorized" badge.
pub fn category_badge(category: Option<(&str, &str)>) -> Markup {
    match category {
        Some((name, color)) => html!(
            span class={ (BADGE_STYLE) " text-white" } style={ "background-color: " (color) ";" } { (name) }
        ),
        None => html!(
            span class={ (BADGE_STYLE) " text-gray-700 bg-gray-200 dark:bg-gray-600 dark:text-gray-200" }
            { "Uncategorized" }
        ),
    }
}

/// An edit link and a delete button for a row in a table or list.
///
/// The delete button asks for confirmation with `confirm_message`, sends a
/// DELETE request to `delete_url` and swaps `hx_target` with `hx_swap` on
/// success. Errors are shown in the alert container.
pub fn edit_delete_action_links(
    edit_url: &str,
    delete_url: &str,
    confirm_message: &str,
    hx_target: &str,
    hx_swap: &str,
) -> Markup {
    html!(
        a href=(edit_url) class=(LINK_STYLE) { "Edit" }

        button
            hx-delete=(delete_url)
            hx-confirm=(confirm_message)
            hx-target=(hx_target)
            hx-target-error="#alert-container"
            hx-swap=(hx_swap)
            class=(BUTTON_DELETE_STYLE)
        {
            "Delete"
        }
    )
}

/// An inline link, e.g. inside a paragraph.
pub fn link(url: &str, text: &str) -> Markup {
    html!(a href=(url) class=(LINK_STYLE) { (text) })
}
