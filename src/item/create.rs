//! Item creation page and endpoint.

use axum::{
    Extension,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::html;

use crate::{
    Error,
    auth::User,
    category::CategoryId,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    item::{
        ItemState,
        form::{FormTarget, ItemForm, ItemFormValues, item_form_view},
    },
    navigation::NavBar,
    preferences::Preferences,
};

/// Render the page for adding an item to a category.
pub async fn get_new_item_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<ItemState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    let language = preferences.language;

    let category = match state.inventory.load(&user) {
        Ok(inventory) => inventory.category(&category_id).cloned(),
        Err(error) => return error.into_page_response(language),
    };
    let Some(category) = category else {
        return Error::CategoryNotFound.into_page_response(language);
    };

    let create_url = endpoints::format_endpoint(endpoints::POST_ITEM, &category.id);
    let items_url = endpoints::format_endpoint(endpoints::CATEGORY_ITEMS_VIEW, &category.id);
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW, language, user.is_admin()).into_html();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 { (language.translate("add_item")) }
            p class="subtitle" { (category.name) }
            (item_form_view(
                language,
                FormTarget::Create(&create_url),
                &ItemFormValues::default(),
                &items_url,
                None
            ))
        }
    };

    base(language.translate("add_item"), &preferences, &content).into_response()
}

/// Handle the item creation form, including an optional photo.
pub async fn create_item_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<ItemState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
    multipart: Multipart,
) -> Response {
    let language = preferences.language;
    let create_url = endpoints::format_endpoint(endpoints::POST_ITEM, &category_id);
    let items_url = endpoints::format_endpoint(endpoints::CATEGORY_ITEMS_VIEW, &category_id);

    let form = match ItemForm::read(multipart).await {
        Ok(form) => form,
        Err(error) => return error.into_alert_response(language),
    };
    let values = ItemFormValues::from_form(&form, None);

    let draft = match form.into_draft(state.image_ingestor).await {
        Ok(draft) => draft,
        Err(Error::EmptyItemTitle) => {
            return item_form_view(
                language,
                FormTarget::Create(&create_url),
                &values,
                &items_url,
                Some(language.translate("error_fill_all")),
            )
            .into_response();
        }
        Err(error) => {
            tracing::warn!("Rejected the photo of a new item: {error}");
            return error.into_alert_response(language);
        }
    };

    match state.inventory.save_item(&user, None, &category_id, draft) {
        Ok(item) => {
            tracing::debug!("{} added item {} to {category_id}", user.email, item.id);
            (HxRedirect(items_url), StatusCode::SEE_OTHER).into_response()
        }
        Err(error) => {
            tracing::error!("Could not create an item in category {category_id}: {error}");
            error.into_alert_response(language)
        }
    }
}

#[cfg(test)]
mod new_item_page_tests {
    use axum::{
        Extension,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };

    use crate::{
        category::CategoryName,
        endpoints,
        item::{ItemState, get_new_item_page},
        preferences::Preferences,
        test_utils::{
            assert_form_input, assert_form_input_with_value, assert_form_submit_button,
            assert_hx_endpoint, assert_valid_html, create_user, demo_state, must_get_form,
            parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");
        let category = state
            .inventory
            .save_category(&user, None, CategoryName::new_unchecked("Lipsticks"))
            .unwrap();

        let response = get_new_item_page(
            Path(category.id.clone()),
            State(ItemState::from_ref(&state)),
            Extension(user),
            Extension(Preferences::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::POST_ITEM, &category.id),
            "hx-post",
        );
        assert_form_input(&form, "title", "text");
        assert_form_input_with_value(&form, "tipo", "text", "");
        assert_form_input_with_value(&form, "marca", "text", "");
        assert_form_input_with_value(&form, "cor", "text", "");
        assert_form_input_with_value(&form, "photo", "file", "");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");

        let response = get_new_item_page(
            Path("missing".to_owned()),
            State(ItemState::from_ref(&state)),
            Extension(user),
            Extension(Preferences::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
