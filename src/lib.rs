//! Makeup Inventory is a web app for cataloguing makeup items into categories.
//!
//! Items carry an optional photo that is downsized and recompressed before it
//! is stored. The inventory lives either in a per-user document database
//! ("remote" mode, with an approval gate for new accounts) or, when no
//! database is configured, in JSON blobs in a local data directory ("demo"
//! mode).
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod admin;
mod advisor;
mod alert;
mod app_state;
pub mod auth;
mod category;
mod db;
mod endpoints;
mod entity_id;
mod html;
pub mod i18n;
pub mod image_ingest;
mod internal_server_error;
mod item;
mod logging;
mod navigation;
mod not_found;
pub mod persistence;
mod preferences;
mod routing;
mod settings;
pub mod storage;

#[cfg(test)]
mod test_utils;

pub use advisor::{AdviceClient, summarize_inventory};
pub use app_state::AppState;
pub use category::{Category, CategoryId, CategoryName};
pub use db::initialize as initialize_db;
pub use item::{Item, ItemDraft, ItemId, ItemQuery, ItemTitle, SortOrder};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use preferences::{Font, PreferenceStore, Preferences, Theme};
pub use routing::build_router;

use crate::{alert::Alert, i18n::Language, internal_server_error::ErrorPage};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
///
/// Credential problems during log-in and registration have their own type,
/// [auth::AuthError], since the client must be able to tell them apart.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid e-mail address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used to create an item title.
    #[error("Item title cannot be empty")]
    EmptyItemTitle,

    /// An item referenced a category that does not exist.
    #[error("the category does not exist")]
    CategoryNotFound,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a category that does not exist.
    #[error("tried to update a category that does not exist")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist.
    #[error("tried to delete a category that does not exist")]
    DeleteMissingCategory,

    /// Tried to update an item that does not exist.
    #[error("tried to update an item that does not exist")]
    UpdateMissingItem,

    /// Tried to delete an item that does not exist.
    #[error("tried to delete an item that does not exist")]
    DeleteMissingItem,

    /// The uploaded photo could not be decoded, resized or encoded.
    #[error("could not process image: {0}")]
    ImageProcessing(String),

    /// The document store rejected a document because its serialized size is
    /// over the per-document limit.
    ///
    /// In practice this is caused by an embedded photo.
    #[error("document is {size} bytes, which is over the limit of {limit} bytes")]
    DocumentTooLarge {
        /// The serialized size of the rejected document.
        size: usize,
        /// The maximum size of a document.
        limit: usize,
    },

    /// The key-value store rejected a value because it is over the quota.
    #[error("value is {size} bytes, which is over the storage quota of {limit} bytes")]
    StorageQuotaExceeded {
        /// The size of the rejected value.
        size: usize,
        /// The maximum size of a value.
        limit: usize,
    },

    /// The user tried to access something that requires the admin role.
    #[error("the user is not allowed to access this resource")]
    Forbidden,

    /// The multipart form could not be parsed.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// Either the token cookie is missing from the cookie jar or it could not
    /// be read.
    #[error("no valid auth token in the cookie jar")]
    CookieMissing,

    /// There was an error formatting or computing the token expiry.
    #[error("could not create the token expiry: {0}")]
    InvalidDateFormat(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while reading or writing a file.
    #[error("an I/O error occurred: {0}")]
    Io(String),

    /// An error occurred while serializing or deserializing JSON.
    #[error("could not (de)serialize JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire a lock on shared state.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        tracing::error!("an I/O error occurred: {value}");
        Error::Io(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JSONSerializationError(value.to_string())
    }
}

impl Error {
    /// Whether the error was caused by a payload that is too big to store.
    ///
    /// These errors are reported to the user with a hint to check the size of
    /// the photo.
    pub fn is_oversize(&self) -> bool {
        matches!(
            self,
            Error::DocumentTooLarge { .. }
                | Error::StorageQuotaExceeded { .. }
                | Error::ImageProcessing(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_page_response(Language::default())
    }
}

impl Error {
    /// Render the error as a full page, translated into `language`.
    fn into_page_response(self, language: Language) -> Response {
        match self {
            Error::NotFound | Error::CategoryNotFound => {
                ErrorPage::not_found(language).into_response()
            }
            Error::Forbidden => ErrorPage::forbidden(language).into_response(),
            Error::DatabaseLockError => ErrorPage::internal(language).into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                ErrorPage::internal(language).into_response()
            }
        }
    }

    /// Render the error as an alert for htmx requests, translated into `language`.
    fn into_alert_response(self, language: Language) -> Response {
        let t = |key: &'static str| -> &'static str { language.translate(key) };

        let (status, message, details) = match &self {
            error if error.is_oversize() => (
                StatusCode::UNPROCESSABLE_ENTITY,
                t("save_error_title"),
                t("save_error"),
            ),
            Error::CategoryNotFound | Error::NotFound => (
                StatusCode::NOT_FOUND,
                t("not_found_title"),
                t("not_found_msg"),
            ),
            Error::UpdateMissingCategory | Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                t("missing_category_title"),
                t("missing_category_msg"),
            ),
            Error::UpdateMissingItem | Error::DeleteMissingItem => (
                StatusCode::NOT_FOUND,
                t("missing_item_title"),
                t("missing_item_msg"),
            ),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                t("forbidden_title"),
                t("forbidden_msg"),
            ),
            Error::MultipartError(_) => (
                StatusCode::BAD_REQUEST,
                t("save_error_title"),
                t("invalid_form_msg"),
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    t("generic_error_title"),
                    t("generic_error_msg"),
                )
            }
        };

        (
            status,
            Alert::Error {
                message: message.to_owned(),
                details: details.to_owned(),
            },
        )
            .into_response()
    }
}
