//! The page and API URIs.
//!
//! For endpoints that take a parameter, e.g., '/items/{item_id}', use [format_endpoint].

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The root route which redirects to the categories or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users: the list of categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for creating a category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page for renaming a category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The items of a category with search, sort and filters.
pub const CATEGORY_ITEMS_VIEW: &str = "/categories/{category_id}/items";
/// The page for adding an item to a category.
pub const NEW_ITEM_VIEW: &str = "/categories/{category_id}/items/new";
/// The details of an item.
pub const ITEM_VIEW: &str = "/items/{item_id}";
/// The page for editing an item.
pub const EDIT_ITEM_VIEW: &str = "/items/{item_id}/edit";
/// The theme, font and language settings.
pub const SETTINGS_VIEW: &str = "/settings";
/// The admin's list of users.
pub const USERS_VIEW: &str = "/admin/users";
/// The beauty advisor.
pub const ADVISOR_VIEW: &str = "/advisor";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route for registering a user.
pub const USERS: &str = "/api/users";
/// The route to create a category.
pub const POST_CATEGORY: &str = "/api/categories";
/// The route to rename a category.
pub const PUT_CATEGORY: &str = "/api/categories/{category_id}";
/// The route to delete a category and its items.
pub const DELETE_CATEGORY: &str = "/api/categories/{category_id}";
/// The route to add an item to a category.
pub const POST_ITEM: &str = "/api/categories/{category_id}/items";
/// The route to update an item.
pub const PUT_ITEM: &str = "/api/items/{item_id}";
/// The route to delete an item.
pub const DELETE_ITEM: &str = "/api/items/{item_id}";
/// The route to save the user's preferences.
pub const PUT_SETTINGS: &str = "/api/settings";
/// The route for an admin to approve a user.
pub const APPROVE_USER: &str = "/api/admin/users/{user_id}/approve";
/// The route for an admin to delete a user.
pub const DELETE_USER: &str = "/api/admin/users/{user_id}";
/// The route to ask the beauty advisor a question.
pub const POST_ADVICE: &str = "/api/advisor";

/// Characters escaped when an ID is placed in a path.
const PATH_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-');

/// Replace the first `{param}` in `endpoint_path` with `id`.
///
/// `id` is percent-encoded, so any string is safe to pass.
pub fn format_endpoint(endpoint_path: &str, id: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };
    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        utf8_percent_encode(id, PATH_ESCAPES),
        &endpoint_path[param_end..]
    )
}
