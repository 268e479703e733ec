//! Where to send the user after they log in.
//!
//! Only same-site paths are accepted, so a crafted `redirect_url` cannot send
//! the user to another site.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

fn is_safe_redirect_url(path_and_query: &str) -> bool {
    if !path_and_query.starts_with('/') || path_and_query.starts_with("//") {
        return false;
    }

    let path = path_and_query
        .split_once('?')
        .map_or(path_and_query, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW && path != endpoints::REGISTER_VIEW
}

/// Reduce `raw_url` to a safe path and query, or `None` if it points
/// off-site or back at the log-in page.
///
/// With `allow_origin` a full URL is accepted and its origin dropped, which
/// is what browsers send in `HX-Current-URL`.
fn normalize(raw_url: &str, allow_origin: bool) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if !allow_origin && (uri.scheme().is_some() || uri.authority().is_some()) {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// Accept `raw_url` as a redirect target if it is a path on this site.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    normalize(raw_url, false)
}

/// The log-in page URL that returns the user to where `request` was going.
///
/// For `/api` requests the target is the page htmx was on, from the
/// `HX-Current-URL` header.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        hx_current_url(request)?
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())?
    };

    build_log_in_redirect_url_from_target(&target)
}

/// The log-in page URL with `redirect_target` in the query string.
pub fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", redirect_target)])
        .inspect_err(|error| {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}")
        })
        .ok()
        .map(|query| format!("{}?{query}", endpoints::LOG_IN_VIEW))
}

fn hx_current_url(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        tracing::warn!("Missing HX-Current-URL header for /api request.");
        return None;
    };

    let redirect_url = normalize(current_url, true);
    if redirect_url.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}
