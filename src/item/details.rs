//! The details page of an item.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::{OffsetDateTime, macros::format_description};

use crate::{
    Error,
    auth::User,
    category::Category,
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, delete_button,
    },
    i18n::Language,
    item::{Item, ItemId, ItemState},
    navigation::NavBar,
    preferences::Preferences,
};

/// Render the photo, attributes and notes of an item.
pub async fn get_item_page(
    Path(item_id): Path<ItemId>,
    State(state): State<ItemState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    let language = preferences.language;

    let inventory = match state.inventory.load(&user) {
        Ok(inventory) => inventory,
        Err(error) => {
            tracing::error!("Failed to retrieve item {item_id}: {error}");
            return error.into_page_response(language);
        }
    };
    let Some(item) = inventory.item(&item_id) else {
        return Error::NotFound.into_page_response(language);
    };

    item_view(item, inventory.category(&item.category_id), &user, &preferences).into_response()
}

/// Format milliseconds since the Unix epoch as a date, e.g. "2024-06-10".
fn format_date_added(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|date_time| {
            date_time
                .format(format_description!("[year]-[month]-[day]"))
                .ok()
        })
        .unwrap_or_default()
}

fn attribute_row(label: &str, value: &str) -> Markup {
    html! {
        @if !value.is_empty() {
            div class="attribute"
            {
                dt { (label) }
                dd { (value) }
            }
        }
    }
}

fn item_view(
    item: &Item,
    category: Option<&Category>,
    user: &User,
    preferences: &Preferences,
) -> Markup {
    let language: Language = preferences.language;
    let t = |key: &'static str| language.translate(key);

    let back_url = endpoints::format_endpoint(endpoints::CATEGORY_ITEMS_VIEW, &item.category_id);
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_ITEM_VIEW, &item.id);
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_ITEM, &item.id);
    let confirm_message = language.translate_with("delete_item_msg", &[("name", item.title.as_ref())]);
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW, language, user.is_admin()).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            a href=(back_url) class=(LINK_STYLE)
            {
                "← "
                @if let Some(category) = category {
                    (category.name)
                } @else {
                    (t("back"))
                }
            }

            article class={(CARD_STYLE) " item-details"}
            {
                @if let Some(image) = item.image() {
                    img src=(image) alt=(item.title) class="item-photo";
                } @else {
                    div class="item-photo item-photo-empty" { (t("no_image")) }
                }

                h1 { (item.title) }

                dl class="attributes"
                {
                    (attribute_row(t("type"), &item.kind))
                    (attribute_row(t("brand"), &item.brand))
                    (attribute_row(t("color"), &item.colour))
                    (attribute_row(t("date_added"), &format_date_added(item.date_added)))
                }

                @if !item.notes.is_empty() {
                    section class="notes"
                    {
                        h2 { (t("notes")) }
                        p { (item.notes) }
                    }
                }

                div class="card-actions"
                {
                    a href=(edit_url) class=(BUTTON_SECONDARY_STYLE) { (t("edit")) }
                    (delete_button(&delete_url, &confirm_message, t("delete")))
                }
            }
        }
    };

    base(item.title.as_ref(), preferences, &content)
}

#[cfg(test)]
mod item_page_tests {
    use axum::{
        Extension,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };

    use crate::{
        category::CategoryName,
        i18n::Language,
        item::{ItemState, get_item_page},
        persistence::contract::draft,
        preferences::Preferences,
        test_utils::{
            assert_valid_html, create_user, demo_state, parse_html_document, select_texts,
        },
    };

    use super::format_date_added;

    #[test]
    fn date_added_is_formatted_as_date() {
        assert_eq!(format_date_added(1_718_000_000_000), "2024-06-10");
    }

    #[tokio::test]
    async fn shows_item_details() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");
        let category = state
            .inventory
            .save_category(&user, None, CategoryName::new_unchecked("Lipsticks"))
            .unwrap();
        let item = state
            .inventory
            .save_item(&user, None, &category.id, draft("Ruby Red", "BrandX", "Everyday"))
            .unwrap();

        let response = get_item_page(
            Path(item.id.clone()),
            State(ItemState::from_ref(&state)),
            Extension(user),
            Extension(Preferences {
                language: Language::En,
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(select_texts(&html, ".item-details h1"), vec!["Ruby Red"]);
        assert_eq!(
            select_texts(&html, ".attributes dt"),
            vec!["Type", "Brand", "Colour", "Added on"]
        );
        assert_eq!(
            select_texts(&html, ".attributes dd")[..3],
            ["matte", "BrandX", "red"]
        );
        assert_eq!(select_texts(&html, ".notes p"), vec!["Everyday"]);
        assert_eq!(select_texts(&html, ".item-photo-empty"), vec!["No image"]);
        assert_eq!(select_texts(&html, "main > a"), vec!["← Lipsticks"]);
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");

        let response = get_item_page(
            Path("missing".to_owned()),
            State(ItemState::from_ref(&state)),
            Extension(user),
            Extension(Preferences::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
