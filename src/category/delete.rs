//! Category deletion endpoint.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    Error,
    auth::User,
    category::{CategoryId, CategoryState},
    endpoints,
    preferences::Preferences,
};

/// Delete a category together with every item in it.
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<CategoryState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    match state.inventory.delete_category(&user, &category_id) {
        Ok(()) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::DeleteMissingCategory) => {
            Error::DeleteMissingCategory.into_alert_response(preferences.language)
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_alert_response(preferences.language)
        }
    }
}
