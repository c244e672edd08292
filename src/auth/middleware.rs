//! Middleware that only lets requests with a valid session through.
//!
//! A session is valid when the private `token` cookie decrypts, has not
//! expired and names a user that still exists. Deleted users are logged out
//! on their next request.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::{Duration, UtcOffset};

use crate::{
    AppState, Error,
    auth::{
        cookie::{
            DEFAULT_COOKIE_DURATION, extend_auth_cookie_duration_if_needed,
            get_token_from_cookies, invalidate_auth_cookie,
        },
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
    user::{UserID, get_user_by_id},
};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// Used to check that the user in the cookie has not been deleted.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Why a request was not let through.
enum Rejection {
    /// No usable session, send the client to the log-in page.
    LogIn,
    /// The session names a user that no longer exists.
    UnknownUser(PrivateCookieJar),
}

/// Read the session from the request cookies.
async fn authenticate(
    parts: &mut Parts,
    state: &AuthState,
) -> Result<(UserID, PrivateCookieJar), Rejection> {
    let jar = PrivateCookieJar::from_request_parts(parts, state)
        .await
        .map_err(|error| {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            Rejection::LogIn
        })?;

    let user_id = get_token_from_cookies(&jar)
        .map_err(|error| {
            tracing::debug!("Rejected request to {}: {error}", parts.uri.path());
            Rejection::LogIn
        })?
        .user_id;

    let lookup = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Rejection::LogIn
        })?;
        get_user_by_id(user_id, &connection)
    };

    match lookup {
        Ok(_) => Ok((user_id, jar)),
        Err(Error::NotFound) => {
            tracing::info!("Logging out deleted user {user_id}.");
            Err(Rejection::UnknownUser(invalidate_auth_cookie(jar)))
        }
        Err(error) => {
            tracing::error!("Could not look up user {user_id}: {error}");
            Err(Rejection::LogIn)
        }
    }
}

/// Copy the refreshed session cookie onto `response`.
fn slide_session(
    response: Response,
    jar: PrivateCookieJar,
    cookie_duration: Duration,
    local_offset: UtcOffset,
) -> Response {
    let (mut parts, body) = response.into_parts();
    let extension = cookie_duration.max(DEFAULT_COOKIE_DURATION);
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), extension, local_offset) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending cookie duration: {error:?}. Keeping the old cookie.");
            jar
        }
    };

    for value in jar.into_response().headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, value.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Runs the request with the user's ID in the request extensions, or answers
/// with the response built by `get_redirect`.
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        tracing::warn!(
            "Could not work out where to return to after logging in. Falling back to dashboard."
        );

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Error getting local timezone. Redirecting to log in page.");
        return get_redirect(&log_in_redirect_url);
    };

    let (mut parts, body) = request.into_parts();
    let (user_id, jar) = match authenticate(&mut parts, &state).await {
        Ok(session) => session,
        Err(Rejection::LogIn) => return get_redirect(&log_in_redirect_url),
        Err(Rejection::UnknownUser(jar)) => {
            return (jar, get_redirect(endpoints::LOG_IN_VIEW)).into_response();
        }
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    slide_session(response, jar, state.cookie_duration, local_offset)
}

/// Middleware for page routes. Unauthenticated requests are redirected to the
/// log-in page with a `303 See Other`.
///
/// Route handlers can use the function argument `Extension(user_id): Extension<UserID>`
/// to receive the ID of the logged in user.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware for htmx API routes. Unauthenticated requests get an
/// `HX-Redirect` to the log-in page, which returns to the page the request
/// was made from.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
