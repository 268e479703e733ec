//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of characters of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Password fields in forms are redacted and multipart bodies, which carry
/// photos, are only logged by size.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read the request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let display_text = body_display_text(&parts.headers, &body_bytes);
    log_body(
        &format!("Received request: {} {}", parts.method, parts.uri),
        &display_text,
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read the response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_body(
        &format!("Sending response: {} {:?}", parts.status, parts.headers),
        &body_display_text(&parts.headers, &body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

fn body_display_text(headers: &HeaderMap, body: &Bytes) -> String {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("multipart/form-data") {
        format!("<multipart form, {} bytes>", body.len())
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        redact_passwords(&String::from_utf8_lossy(body))
    } else {
        String::from_utf8_lossy(body).into_owned()
    }
}

/// Replace the value of every form field whose name contains "password".
fn redact_passwords(form_text: &str) -> String {
    let Ok(fields) = serde_urlencoded::from_str::<Vec<(String, String)>>(form_text) else {
        return form_text.to_owned();
    };

    let redacted = fields
        .into_iter()
        .map(|(name, value)| {
            if name.contains("password") {
                (name, REDACTED.to_owned())
            } else {
                (name, value)
            }
        })
        .collect::<Vec<_>>();

    serde_urlencoded::to_string(&redacted).unwrap_or_default()
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if the
/// body is short enough to log in full.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_body(summary: &str, body: &str) {
    match truncate(body) {
        Some(prefix) => {
            tracing::info!("{summary}\nbody: {prefix}...");
            tracing::debug!("Full body: {body:?}");
        }
        None => tracing::info!("{summary}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{
        Router,
        body::Bytes,
        http::{HeaderMap, HeaderValue, header::CONTENT_TYPE},
        middleware,
        routing::post,
    };
    use axum_test::TestServer;

    use super::{
        LOG_BODY_LENGTH_LIMIT, body_display_text, logging_middleware, redact_passwords, truncate,
    };

    #[test]
    fn redacts_all_password_fields() {
        let redacted =
            redact_passwords("email=ana%40example.com&password=secret&confirm_password=secret");

        assert_eq!(
            redacted,
            "email=ana%40example.com&password=********&confirm_password=********"
        );
    }

    #[test]
    fn multipart_bodies_are_logged_by_size() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=X"),
        );

        let text = body_display_text(&headers, &Bytes::from_static(b"0123456789"));

        assert_eq!(text, "<multipart form, 10 bytes>");
    }

    #[test]
    fn truncates_on_character_boundaries() {
        let body = "ã".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        let prefix = truncate(&body).unwrap();

        assert_eq!(prefix.chars().count(), LOG_BODY_LENGTH_LIMIT);
        assert_eq!(truncate("short"), None);
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.post("/echo").text("Batom Rubi Vermelho").await;

        response.assert_status_ok();
        response.assert_text("Batom Rubi Vermelho");
    }
}
