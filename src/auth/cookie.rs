//! Reading and writing the encrypted auth cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{UserId, token::Token},
};

/// The name of the cookie that holds the JSON [Token].
pub const COOKIE_TOKEN: &str = "token";

/// How long a session lasts without activity.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

fn token_cookie(value: String, expires_at: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((COOKIE_TOKEN, value))
        .path("/")
        .expires(expires_at)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

fn add_token(jar: PrivateCookieJar, token: &Token) -> Result<PrivateCookieJar, Error> {
    let value = serde_json::to_string(token)?;

    Ok(jar.add(token_cookie(value, token.expires_at)))
}

/// Sign `user_id` in for `duration` from now.
///
/// # Errors
///
/// Returns an [Error::InvalidDateFormat] if the expiry overflows, or an
/// [Error::JSONSerializationError] if the token cannot be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: &UserId,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::InvalidDateFormat(format!("now + {duration} overflows")))?;

    add_token(
        jar,
        &Token {
            user_id: user_id.clone(),
            expires_at,
        },
    )
}

/// Replace the auth cookie with an expired one so the browser drops it.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read the token from `jar`.
///
/// # Errors
///
/// Returns an [Error::CookieMissing] if there is no cookie, it cannot be
/// parsed, or the token has expired.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::CookieMissing)?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::CookieMissing);
    }

    Ok(token)
}

/// Push the expiry of the token in `jar` out to `duration` from now, unless
/// it already expires later.
///
/// # Errors
///
/// Returns the errors of [get_token_from_cookies] and [set_auth_cookie]. The
/// jar is not modified when an error is returned.
pub fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;
    let extended = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::InvalidDateFormat(format!("now + {duration} overflows")))?;

    if extended <= token.expires_at {
        return Ok(jar);
    }

    add_token(
        jar,
        &Token {
            user_id: token.user_id,
            expires_at: extended,
        },
    )
}
