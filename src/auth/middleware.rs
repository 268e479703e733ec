//! Authentication middleware that validates cookies, extends sessions, and handles redirects.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        AuthBackend, SessionManager, SessionState, build_log_in_redirect_url,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::build_log_in_redirect_url_from_target,
    },
    endpoints,
    i18n::Language,
    persistence::InventoryStore,
    preferences::PreferenceStore,
};

/// The state needed for the auth middleware and the log-in, registration and
/// log-out handlers.
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The bcrypt cost for the passwords of new accounts.
    pub password_cost: u32,
    /// User accounts and credentials.
    pub auth: Arc<dyn AuthBackend>,
    /// The theme, font and language of each user.
    pub preferences: PreferenceStore,
    /// The inventories, tidied up after each log-in.
    pub inventory: Arc<dyn InventoryStore>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            password_cost: state.password_cost,
            auth: state.auth.clone(),
            preferences: state.preferences.clone(),
            inventory: state.inventory.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How the guard answers requests it rejects.
#[derive(Clone, Copy)]
enum Guard {
    /// Full page navigation: HTTP redirects and error pages.
    Page,
    /// htmx requests: `HX-Redirect` headers and alerts.
    Htmx,
}

impl Guard {
    fn redirect(self, redirect_url: &str) -> Response {
        match self {
            Guard::Page => Redirect::to(redirect_url).into_response(),
            Guard::Htmx => (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response(),
        }
    }

    fn error(self, error: Error) -> Response {
        match self {
            Guard::Page => error.into_response(),
            Guard::Htmx => error.into_alert_response(Language::default()),
        }
    }
}

/// Checks for a valid auth cookie that belongs to a user who may sign in.
///
/// The [crate::auth::User] and their [crate::Preferences] are placed into the
/// request extensions and the request is executed normally. Otherwise the
/// client is sent to the log-in page.
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    guard: Guard,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        if request.uri().path().starts_with("/api") {
            tracing::warn!(
                "Missing or invalid HTMX headers for /api request. Falling back to categories."
            );
        } else {
            tracing::warn!("Invalid redirect URL from request URI. Falling back to categories.");
        }

        build_log_in_redirect_url_from_target(endpoints::CATEGORIES_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to log in page.");
            return guard.redirect(&log_in_redirect_url);
        }
    };
    let Ok(token) = get_token_from_cookies(&jar) else {
        return guard.redirect(&log_in_redirect_url);
    };

    let mut session = SessionManager::new(state.auth.clone(), state.password_cost);
    let user = match session.restore(Some(&token.user_id)) {
        Ok(SessionState::Approved(user)) => user.clone(),
        Ok(SessionState::PendingApproval(user)) => {
            tracing::info!("Rejecting session of {} until they are approved.", user.email);
            return guard.redirect(&log_in_redirect_url);
        }
        Ok(_) => return guard.redirect(&log_in_redirect_url),
        Err(error) => {
            tracing::error!("Could not restore session of {}: {error}", token.user_id);
            return guard.error(error);
        }
    };

    let preferences = state
        .preferences
        .load(&user.email)
        .inspect_err(|error| {
            tracing::error!("Could not load preferences of {}: {error}", user.email)
        })
        .unwrap_or_default();

    parts.extensions.insert(user);
    parts.extensions.insert(preferences);
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware for pages: the client is redirected to the log-in page unless
/// the request carries a valid session.
///
/// **Note**: Route handlers can use `Extension(user): Extension<User>` and
/// `Extension(preferences): Extension<Preferences>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, Guard::Page).await
}

/// Middleware for htmx endpoints: like [auth_guard], but redirects with the
/// `HX-Redirect` header.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, Guard::Htmx).await
}
