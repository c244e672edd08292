//! Alert system for displaying success and error messages to users.
//!
//! Alerts are HTML fragments that htmx swaps into the `#alert-container`
//! element defined in [crate::html::base].

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A dismissable message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with a title and some details.
    Success { message: String, details: String },
    /// A success message with only a title.
    SuccessSimple { message: String },
    /// An error message with a title and some details.
    Error { message: String, details: String },
    /// An error message with only a title.
    ErrorSimple { message: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::Success { message, details } => (false, message, Some(details)),
            Alert::SuccessSimple { message } => (false, message, None),
            Alert::Error { message, details } => (true, message, Some(details)),
            Alert::ErrorSimple { message } => (true, message, None),
        };

        let container_style = if is_error {
            "flex items-start p-4 rounded-lg shadow-lg border text-red-800 \
            bg-red-50 border-red-300 dark:bg-gray-800 dark:text-red-400 \
            dark:border-red-800"
        } else {
            "flex items-start p-4 rounded-lg shadow-lg border text-green-800 \
            bg-green-50 border-green-300 dark:bg-gray-800 dark:text-green-400 \
            dark:border-green-800"
        };

        html! {
            div class=(container_style) role="alert"
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (message) }

                    @if let Some(details) = details.filter(|details| !details.is_empty())
                    {
                        p class="mt-1 text-sm" { (details) }
                    }
                }

                button
                    type="button"
                    class="ms-3 -my-1 text-xl leading-none bg-transparent border-none cursor-pointer"
                    aria-label="Dismiss"
                    onclick="this.closest('#alert-container').classList.add('hidden')"
                {
                    "×"
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::{Html, Selector};

    use crate::test_utils::parse_html_fragment;

    use super::Alert;

    #[tokio::test]
    async fn renders_error_alert_with_details() {
        let response = Alert::Error {
            message: "Could not delete category".to_owned(),
            details: "The category could not be found.".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let paragraphs = paragraph_texts(&html);
        assert_eq!(
            paragraphs,
            vec!["Could not delete category", "The category could not be found."]
        );
    }

    #[tokio::test]
    async fn simple_alert_has_no_details() {
        let response = Alert::SuccessSimple {
            message: "Category deleted successfully".to_owned(),
        }
        .into_response();

        let html = parse_html_fragment(response).await;
        assert_eq!(paragraph_texts(&html), vec!["Category deleted successfully"]);
    }

    fn paragraph_texts(html: &Html) -> Vec<String> {
        let selector = Selector::parse("p").unwrap();
        html.select(&selector)
            .map(|p| p.text().collect::<String>().trim().to_owned())
            .collect()
    }
}
