//! The fallback for unknown routes.

use axum::response::{IntoResponse, Response};

use crate::{i18n::Language, internal_server_error::ErrorPage};

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    ErrorPage::not_found(Language::default()).into_response()
}
