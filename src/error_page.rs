//! Full pages shown when a request cannot be served: missing pages, pages the
//! user may not see and server errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{endpoints, html::error_view};

/// A status code and the text to explain it.
pub struct ErrorPage {
    status: StatusCode,
    title: &'static str,
    description: String,
    fix: String,
}

impl ErrorPage {
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            title: "Not Found",
            description: "Something's missing.".to_owned(),
            fix: "Sorry, we can't find that page. Head back to the home page to find your way."
                .to_owned(),
        }
    }

    pub fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            title: "Forbidden",
            description: "You do not have access to this page.".to_owned(),
            fix: "Ask an admin of your family account for access.".to_owned(),
        }
    }

    /// A 500 page with a specific explanation.
    pub fn internal(description: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            title: "Internal Server Error",
            description: description.into(),
            fix: fix.into(),
        }
    }

    /// The 500 page for errors the user can do nothing about.
    pub fn internal_generic() -> Self {
        Self::internal(
            "Sorry, something went wrong.",
            "Try again later or check the server logs.",
        )
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let header = self.status.as_str().to_owned();

        (
            self.status,
            error_view(self.title, &header, &self.description, &self.fix),
        )
            .into_response()
    }
}

/// The route handler for the generic error page.
pub async fn get_internal_server_error_page() -> Response {
    ErrorPage::internal_generic().into_response()
}

/// The fallback route handler for paths that do not match any route.
pub async fn get_404_not_found() -> Response {
    ErrorPage::not_found().into_response()
}

/// Send an htmx request to the generic error page.
pub(crate) fn get_internal_server_error_redirect() -> Response {
    (
        HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        endpoints,
        test_utils::{assert_hx_redirect, assert_valid_html, parse_html_document},
    };

    use super::{
        ErrorPage, get_404_not_found, get_internal_server_error_page,
        get_internal_server_error_redirect,
    };

    #[tokio::test]
    async fn error_page_has_500_status() {
        let response = get_internal_server_error_page().await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
    }

    #[tokio::test]
    async fn not_found_page_shows_status_code() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let heading = document
            .select(&scraper::Selector::parse("h1").unwrap())
            .next()
            .map(|h1| h1.text().collect::<String>());
        assert_eq!(heading.as_deref(), Some("404"));
    }

    #[tokio::test]
    async fn forbidden_page_has_403_status() {
        let response = ErrorPage::forbidden().into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn redirect_points_to_error_page() {
        let response = get_internal_server_error_redirect();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_hx_redirect(&response, endpoints::INTERNAL_ERROR_VIEW);
    }
}
