//! Item editing page and endpoint.

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
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    item::{
        ItemId, ItemState,
        form::{FormTarget, ItemForm, ItemFormValues, item_form_view},
    },
    navigation::NavBar,
    preferences::Preferences,
};

/// Render the item editing page.
pub async fn get_edit_item_page(
    Path(item_id): Path<ItemId>,
    State(state): State<ItemState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    let language = preferences.language;

    let item = match state.inventory.load(&user) {
        Ok(inventory) => inventory.item(&item_id).cloned(),
        Err(error) => {
            tracing::error!("Failed to retrieve item {item_id}: {error}");
            return error.into_page_response(language);
        }
    };
    let Some(item) = item else {
        return Error::NotFound.into_page_response(language);
    };

    let update_url = endpoints::format_endpoint(endpoints::PUT_ITEM, &item.id);
    let item_url = endpoints::format_endpoint(endpoints::ITEM_VIEW, &item.id);
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW, language, user.is_admin()).into_html();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 { (language.translate("edit_item")) }
            (item_form_view(
                language,
                FormTarget::Update(&update_url),
                &ItemFormValues::from(&item),
                &item_url,
                None
            ))
        }
    };

    base(language.translate("edit_item"), &preferences, &content).into_response()
}

/// Handle the item editing form.
///
/// The item keeps its ID, category and creation date. Without a new photo or
/// `remove_photo` the current photo is kept.
pub async fn update_item_endpoint(
    Path(item_id): Path<ItemId>,
    State(state): State<ItemState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
    multipart: Multipart,
) -> Response {
    let language = preferences.language;

    let existing = match state.inventory.load(&user) {
        Ok(inventory) => inventory.item(&item_id).cloned(),
        Err(error) => return error.into_alert_response(language),
    };
    let Some(existing) = existing else {
        return Error::UpdateMissingItem.into_alert_response(language);
    };

    let form = match ItemForm::read(multipart).await {
        Ok(form) => form,
        Err(error) => return error.into_alert_response(language),
    };
    let values = ItemFormValues::from_form(&form, existing.image().map(str::to_owned));

    let draft = match form.into_draft(state.image_ingestor).await {
        Ok(draft) => draft,
        Err(Error::EmptyItemTitle) => {
            let update_url = endpoints::format_endpoint(endpoints::PUT_ITEM, &existing.id);
            let item_url = endpoints::format_endpoint(endpoints::ITEM_VIEW, &existing.id);

            return item_form_view(
                language,
                FormTarget::Update(&update_url),
                &values,
                &item_url,
                Some(language.translate("error_fill_all")),
            )
            .into_response();
        }
        Err(error) => {
            tracing::warn!("Rejected the photo for item {item_id}: {error}");
            return error.into_alert_response(language);
        }
    };

    match state
        .inventory
        .save_item(&user, Some(&existing), &existing.category_id, draft)
    {
        Ok(item) => (
            HxRedirect(endpoints::format_endpoint(endpoints::ITEM_VIEW, &item.id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update item {item_id}: {error}");
            error.into_alert_response(language)
        }
    }
}

#[cfg(test)]
mod edit_item_tests {
    use axum::{
        Extension,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };

    use crate::{
        AppState,
        auth::User,
        category::CategoryName,
        endpoints,
        i18n::Language,
        item::{
            ImageChange, Item, ItemState, form::tests::png, get_edit_item_page,
            update_item_endpoint,
        },
        persistence::contract::draft,
        preferences::Preferences,
        test_utils::{
            MultipartBuilder, assert_form_error_message, assert_form_input_with_value,
            assert_hx_endpoint, assert_hx_redirect, assert_valid_html, create_user, demo_state,
            must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    fn english() -> Preferences {
        Preferences {
            language: Language::En,
            ..Default::default()
        }
    }

    fn item_with_photo(state: &AppState, user: &User) -> Item {
        let category = state
            .inventory
            .save_category(user, None, CategoryName::new_unchecked("Lipsticks"))
            .unwrap();
        let photo = state
            .image_ingestor
            .ingest(&png(64, 48))
            .unwrap()
            .to_data_url();
        let mut draft = draft("Ruby Red", "BrandX", "Everyday");
        draft.image = ImageChange::Replace(photo);

        state
            .inventory
            .save_item(user, None, &category.id, draft)
            .unwrap()
    }

    async fn update(
        state: &AppState,
        user: &User,
        item: &Item,
        builder: MultipartBuilder,
    ) -> axum::response::Response {
        update_item_endpoint(
            Path(item.id.clone()),
            State(ItemState::from_ref(state)),
            Extension(user.clone()),
            Extension(english()),
            builder.build().await,
        )
        .await
    }

    #[tokio::test]
    async fn edit_page_shows_current_values() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");
        let item = item_with_photo(&state, &user);

        let response = get_edit_item_page(
            Path(item.id.clone()),
            State(ItemState::from_ref(&state)),
            Extension(user),
            Extension(english()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::PUT_ITEM, &item.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "title", "text", "Ruby Red");
        assert_form_input_with_value(&form, "marca", "text", "BrandX");
        assert_form_input_with_value(&form, "remove_photo", "checkbox", "true");
    }

    #[tokio::test]
    async fn edit_page_for_missing_item_is_not_found() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");

        let response = get_edit_item_page(
            Path("missing".to_owned()),
            State(ItemState::from_ref(&state)),
            Extension(user),
            Extension(english()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_keeps_id_date_and_photo() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");
        let item = item_with_photo(&state, &user);

        let response = update(
            &state,
            &user,
            &item,
            MultipartBuilder::new()
                .text("title", "Ruby Red")
                .text("notes", "Only for parties")
                .text("marca", "BrandX"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(
            &response,
            &endpoints::format_endpoint(endpoints::ITEM_VIEW, &item.id),
        );
        let inventory = state.inventory.load(&user).unwrap();
        let updated = inventory.item(&item.id).expect("item is gone");
        assert_eq!(updated.notes, "Only for parties");
        assert_eq!(updated.date_added, item.date_added);
        assert_eq!(updated.category_id, item.category_id);
        assert_eq!(updated.images, item.images);
        assert_eq!(inventory.items.len(), 1);
    }

    #[tokio::test]
    async fn update_can_remove_photo() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");
        let item = item_with_photo(&state, &user);

        let response = update(
            &state,
            &user,
            &item,
            MultipartBuilder::new()
                .text("title", "Ruby Red")
                .text("remove_photo", "true"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let inventory = state.inventory.load(&user).unwrap();
        assert_eq!(inventory.item(&item.id).unwrap().image(), None);
    }

    #[tokio::test]
    async fn update_with_blank_title_shows_error() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");
        let item = item_with_photo(&state, &user);

        let response = update(
            &state,
            &user,
            &item,
            MultipartBuilder::new().text("title", ""),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_form_error_message(&must_get_form(&html), "Please fill in all fields.");
        let inventory = state.inventory.load(&user).unwrap();
        assert_eq!(inventory.item(&item.id).unwrap().title.as_ref(), "Ruby Red");
    }

    #[tokio::test]
    async fn update_missing_item_returns_not_found() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");
        let mut item = item_with_photo(&state, &user);
        item.id = "missing".to_owned();

        let response = update(
            &state,
            &user,
            &item,
            MultipartBuilder::new().text("title", "Ruby Red"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
