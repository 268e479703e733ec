//! Category creation page and endpoint.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    auth::User,
    category::{CategoryFormData, CategoryName, CategoryState},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, FORM_ERROR_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    i18n::Language,
    navigation::NavBar,
    preferences::Preferences,
};

/// Render the category creation page.
pub async fn get_new_category_page(
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    let language = preferences.language;
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW, language, user.is_admin()).into_html();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 { (language.translate("new_category")) }
            (new_category_form_view(language, "", None))
        }
    };

    base(language.translate("new_category"), &preferences, &content).into_response()
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
    Form(new_category): Form<CategoryFormData>,
) -> Response {
    let language = preferences.language;

    let Ok(name) = CategoryName::new(&new_category.name) else {
        return new_category_form_view(
            language,
            &new_category.name,
            Some(language.translate("error_fill_all")),
        )
        .into_response();
    };

    match state.inventory.save_category(&user, None, name) {
        Ok(category) => {
            tracing::debug!("{} created category {}", user.email, category.id);
            (
                HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response(language)
        }
    }
}

fn new_category_form_view(language: Language, name: &str, error_message: Option<&str>) -> Markup {
    let t = |key: &'static str| language.translate(key);

    html! {
        form
            hx-post=(endpoints::POST_CATEGORY)
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
                    placeholder=(t("category_name"))
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
