//! Where to send the user after they log in.
//!
//! When an unauthenticated request is turned away, the log-in page is given
//! the page the user was on so it can send them back there afterwards.

use axum::{extract::Request, http::Uri};
use axum_htmx::{HX_CURRENT_URL, HX_REQUEST};

use crate::endpoints;

/// The path and query of `uri` if it is a page inside the app that the user
/// could return to.
fn returnable_page(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?;
    let path = path_and_query.path();

    let is_returnable = path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/api")
        && path != endpoints::LOG_IN_VIEW
        && path != endpoints::REGISTER_VIEW;

    is_returnable.then(|| path_and_query.as_str().to_owned())
}

/// Returns the path and query of `raw_url` if it is safe to redirect to after
/// logging in, i.e. a same-origin page that is not an auth page or API route.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    returnable_page(&uri)
}

/// The page an htmx request was sent from. htmx sends the full URL, so only
/// its path and query are kept.
fn page_of_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_htmx = headers
        .get(HX_REQUEST)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));

    if !is_htmx {
        tracing::warn!("API request to {} was not made by htmx.", request.uri().path());
        return None;
    }

    let Some(current_url) = headers
        .get(HX_CURRENT_URL)
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("htmx request to {} has no current URL.", request.uri().path());
        return None;
    };

    let page = current_url
        .parse::<Uri>()
        .ok()
        .and_then(|uri| returnable_page(&uri));
    if page.is_none() {
        tracing::warn!("Cannot return to the page {current_url} after logging in.");
    }

    page
}

/// Builds the URL of the log-in page that sends the user back to where they
/// were after logging in.
///
/// For `/api` routes the page is taken from the `HX-Current-URL` header, since
/// the request URI is the API route itself.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        page_of_hx_request(request)?
    } else {
        returnable_page(request.uri())?
    };

    build_log_in_redirect_url_from_target(&target)
}

pub(super) fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", redirect_target)])
        .inspect_err(|error| {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
        })
        .ok()
        .map(|query| format!("{}?{query}", endpoints::LOG_IN_VIEW))
}
