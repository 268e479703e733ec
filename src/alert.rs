//! Success and error messages shown in response to htmx requests.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A message box swapped into the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// Something worked.
    Success {
        /// The headline.
        message: String,
        /// An optional explanation. Empty strings are not rendered.
        details: String,
    },
    /// Something failed.
    Error {
        /// The headline.
        message: String,
        /// What the user can do about it. Empty strings are not rendered.
        details: String,
    },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (class, message, details) = match self {
            Alert::Success { message, details } => ("alert alert-success", message, details),
            Alert::Error { message, details } => ("alert alert-error", message, details),
        };

        html! {
            div class=(class) role="alert"
            {
                div
                {
                    p class="alert-message" { (message) }

                    @if !details.is_empty() {
                        p class="alert-details" { (details) }
                    }
                }

                button
                    type="button"
                    class="alert-close"
                    aria-label="Close"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}
