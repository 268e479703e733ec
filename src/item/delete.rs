//! Item deletion endpoint.

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
    endpoints,
    item::{ItemId, ItemState},
    preferences::Preferences,
};

/// Delete an item and send the client back to the item's category.
pub async fn delete_item_endpoint(
    Path(item_id): Path<ItemId>,
    State(state): State<ItemState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    let language = preferences.language;

    let category_id = match state.inventory.load(&user) {
        Ok(inventory) => inventory
            .item(&item_id)
            .map(|item| item.category_id.clone()),
        Err(error) => return error.into_alert_response(language),
    };
    let Some(category_id) = category_id else {
        return Error::DeleteMissingItem.into_alert_response(language);
    };

    match state.inventory.delete_item(&user, &item_id) {
        Ok(()) => (
            HxRedirect(endpoints::format_endpoint(
                endpoints::CATEGORY_ITEMS_VIEW,
                &category_id,
            )),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting item {item_id}: {error}");
            error.into_alert_response(language)
        }
    }
}

#[cfg(test)]
mod delete_item_endpoint_tests {
    use axum::{
        Extension,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };

    use crate::{
        category::CategoryName,
        endpoints,
        item::{ItemState, delete_item_endpoint},
        persistence::contract::draft,
        preferences::Preferences,
        test_utils::{assert_hx_redirect, create_user, demo_state, remote_state},
    };

    #[tokio::test]
    async fn deletes_only_that_item() {
        for (_dir, state) in [demo_state(), remote_state()] {
            let user = create_user(&state, "ana@example.com");
            let category = state
                .inventory
                .save_category(&user, None, CategoryName::new_unchecked("Lipsticks"))
                .unwrap();
            let ruby = state
                .inventory
                .save_item(&user, None, &category.id, draft("Ruby Red", "BrandX", ""))
                .unwrap();
            let nude = state
                .inventory
                .save_item(&user, None, &category.id, draft("Nude Rose", "BrandY", ""))
                .unwrap();

            let response = delete_item_endpoint(
                Path(ruby.id.clone()),
                State(ItemState::from_ref(&state)),
                Extension(user.clone()),
                Extension(Preferences::default()),
            )
            .await;

            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_hx_redirect(
                &response,
                &endpoints::format_endpoint(endpoints::CATEGORY_ITEMS_VIEW, &category.id),
            );
            let inventory = state.inventory.load(&user).unwrap();
            assert!(inventory.item(&ruby.id).is_none());
            assert!(inventory.item(&nude.id).is_some());
        }
    }

    #[tokio::test]
    async fn deleting_missing_item_returns_not_found() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");

        let response = delete_item_endpoint(
            Path("missing".to_owned()),
            State(ItemState::from_ref(&state)),
            Extension(user),
            Extension(Preferences::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
