//! Full error pages for requests that expect a page rather than a fragment.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{html::error_view, i18n::Language};

/// An error page whose text comes from the translation tables.
pub struct ErrorPage {
    pub status: StatusCode,
    pub language: Language,
    pub title_key: &'static str,
    pub message_key: &'static str,
}

impl ErrorPage {
    pub fn internal(language: Language) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            language,
            title_key: "generic_error_title",
            message_key: "generic_error_msg",
        }
    }

    pub fn forbidden(language: Language) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            language,
            title_key: "forbidden_title",
            message_key: "forbidden_msg",
        }
    }

    pub fn not_found(language: Language) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            language,
            title_key: "not_found_title",
            message_key: "not_found_msg",
        }
    }

    pub fn into_html(self) -> Html<String> {
        Html(
            error_view(
                self.language,
                self.language.translate(self.title_key),
                self.status.as_str(),
                self.language.translate(self.message_key),
            )
            .into_string(),
        )
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        (self.status, self.into_html()).into_response()
    }
}

pub async fn get_internal_server_error_page() -> Response {
    ErrorPage::internal(Language::default()).into_response()
}
