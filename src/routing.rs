//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    admin::{approve_user_endpoint, delete_user_endpoint, get_users_page},
    advisor::{get_advisor_page, post_advice},
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_edit_category_page, get_new_category_page, update_category_endpoint,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    item::{
        create_item_endpoint, delete_item_endpoint, get_edit_item_page, get_item_page,
        get_items_page, get_new_item_page, update_item_endpoint,
    },
    not_found::get_404_not_found,
    settings::{get_settings_page, update_settings_endpoint},
};

/// The largest request body accepted by the item endpoints, which receive
/// photos before they are downsized.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::NEW_CATEGORY_VIEW, get(get_new_category_page))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(endpoints::CATEGORY_ITEMS_VIEW, get(get_items_page))
        .route(endpoints::NEW_ITEM_VIEW, get(get_new_item_page))
        .route(endpoints::ITEM_VIEW, get(get_item_page))
        .route(endpoints::EDIT_ITEM_VIEW, get(get_edit_item_page))
        .route(endpoints::SETTINGS_VIEW, get(get_settings_page))
        .route(endpoints::USERS_VIEW, get(get_users_page))
        .route(endpoints::ADVISOR_VIEW, get(get_advisor_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::POST_CATEGORY, post(create_category_endpoint))
            .route(
                endpoints::PUT_CATEGORY,
                put(update_category_endpoint).delete(delete_category_endpoint),
            )
            .route(endpoints::POST_ITEM, post(create_item_endpoint))
            .route(
                endpoints::PUT_ITEM,
                put(update_item_endpoint).delete(delete_item_endpoint),
            )
            .route(endpoints::PUT_SETTINGS, post(update_settings_endpoint))
            .route(endpoints::APPROVE_USER, post(approve_user_endpoint))
            .route(endpoints::DELETE_USER, delete(delete_user_endpoint))
            .route(endpoints::POST_ADVICE, post(post_advice))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the categories page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::CATEGORIES_VIEW)
}
