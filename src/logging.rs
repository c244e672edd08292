//! Middleware for logging request and response bodies.
//!
//! Enabled with `--log-bodies` on the server. Request line and timing are
//! already covered by the trace layer, this adds the bodies.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, Method, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Bodies longer than this many bytes are truncated at the `info` level and
/// logged in full at the `debug` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields whose values never appear in the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];
const REDACTED_VALUE: &str = "********";

/// Log the body of each request and response.
///
/// Password fields in submitted forms are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = match read_body(body).await {
        Ok(body) => body,
        Err(response) => return response,
    };

    let body_text = String::from_utf8_lossy(&body);
    let display_text = if is_form_submission(&parts.method, &parts.headers) {
        redact_form_fields(&body_text)
    } else {
        body_text.into_owned()
    };
    log_body("Received request", &parts.method.to_string(), parts.uri.path(), &display_text);

    let request = Request::from_parts(parts, Body::from(body));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body = match read_body(body).await {
        Ok(body) => body,
        Err(response) => return response,
    };
    log_body(
        "Sending response",
        parts.status.as_str(),
        "",
        &String::from_utf8_lossy(&body),
    );

    Response::from_parts(parts, Body::from(body))
}

async fn read_body(body: Body) -> Result<Bytes, Response> {
    axum::body::to_bytes(body, usize::MAX).await.map_err(|error| {
        tracing::error!("could not read body for logging: {error}");
        axum::http::StatusCode::BAD_REQUEST.into_response()
    })
}

fn is_form_submission(method: &Method, headers: &HeaderMap) -> bool {
    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    is_form && (method == Method::POST || method == Method::PUT)
}

/// Replace the values of password fields in a URL encoded form.
///
/// Text that is not a valid form is logged as a placeholder rather than
/// risk leaking a password.
fn redact_form_fields(form_text: &str) -> String {
    let Ok(fields) = serde_urlencoded::from_str::<Vec<(String, String)>>(form_text) else {
        return "<unparseable form>".to_owned();
    };

    let fields: Vec<(String, String)> = fields
        .into_iter()
        .map(|(key, value)| {
            if REDACTED_FIELDS.contains(&key.as_str()) {
                (key, REDACTED_VALUE.to_owned())
            } else {
                (key, value)
            }
        })
        .collect();

    serde_urlencoded::to_string(&fields).unwrap_or_else(|_| "<unparseable form>".to_owned())
}

/// The longest prefix of `text` that is at most `limit` bytes and ends on a
/// character boundary.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_body(event: &str, method_or_status: &str, path: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{event}: {method_or_status} {path} body: {:?}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("{event}: full body: {body:?}");
    } else {
        tracing::info!("{event}: {method_or_status} {path} body: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, middleware, routing::post};
    use axum_test::TestServer;

    use super::{logging_middleware, redact_form_fields, truncate};

    #[test]
    fn redacts_password_fields() {
        let redacted =
            redact_form_fields("email=a%40example.com&password=hunter2&confirm_password=hunter2");

        assert_eq!(
            redacted,
            "email=a%40example.com&password=********&confirm_password=********"
        );
    }

    #[test]
    fn leaves_other_fields_alone() {
        assert_eq!(
            redact_form_fields("description=Passwords+book&amount=12.50"),
            "description=Passwords+book&amount=12.50"
        );
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate("hello", 64), "hello");
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("héllo", 3), "hé");
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post("/echo")
            .form(&[("password", "hunter2"), ("email", "a@example.com")])
            .await;

        response.assert_status_ok();
        response.assert_text("password=hunter2&email=a%40example.com");
    }
}
