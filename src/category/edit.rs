//! Category editing page and endpoint.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    auth::User,
    category::{CategoryFormData, CategoryId, CategoryName, CategoryState},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, FORM_ERROR_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    i18n::Language,
    navigation::NavBar,
    preferences::Preferences,
};

/// Render the category editing page.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<CategoryState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    let language = preferences.language;

    let category = match state.inventory.load(&user) {
        Ok(inventory) => inventory.category(&category_id).cloned(),
        Err(error) => {
            tracing::error!("Failed to retrieve category {category_id}: {error}");
            return error.into_page_response(language);
        }
    };
    let Some(category) = category else {
        return Error::NotFound.into_page_response(language);
    };

    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, &category.id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, &category.id);
    let nav_bar = NavBar::new(&edit_endpoint, language, user.is_admin()).into_html();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 { (language.translate("edit_category")) }
            (edit_category_form_view(language, &update_endpoint, category.name.as_ref(), None))
        }
    };

    base(language.translate("edit_category"), &preferences, &content).into_response()
}

/// Handle category rename form submission. The category keeps its ID, so its
/// items stay with it.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<CategoryState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let language = preferences.language;
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, &category_id);

    let Ok(name) = CategoryName::new(&form_data.name) else {
        return edit_category_form_view(
            language,
            &update_endpoint,
            &form_data.name,
            Some(language.translate("error_fill_all")),
        )
        .into_response();
    };

    let existing = match state.inventory.load(&user) {
        Ok(inventory) => inventory.category(&category_id).cloned(),
        Err(error) => return error.into_alert_response(language),
    };
    let Some(existing) = existing else {
        return Error::UpdateMissingCategory.into_alert_response(language);
    };

    match state.inventory.save_category(&user, Some(&existing), name) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response(language)
        }
    }
}

fn edit_category_form_view(
    language: Language,
    update_endpoint: &str,
    name: &str,
    error_message: Option<&str>,
) -> Markup {
    let t = |key: &'static str| language.translate(key);

    html! {
        form
            hx-put=(update_endpoint)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="stack"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { (t("category_name")) }

                input
                    id="name"
                    type="text"
                    name="name"
                    value=(name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            div class="form-actions"
            {
                a href=(endpoints::CATEGORIES_VIEW) class=(BUTTON_SECONDARY_STYLE) { (t("cancel")) }
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { (t("save")) }
            }
        }
    }
}
