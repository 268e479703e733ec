//! The items of a category with search, sort and filters.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};

use crate::{
    Error,
    auth::User,
    category::{Category, CategoryId},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, base,
    },
    i18n::Language,
    item::{FilterOptions, Item, ItemQuery, ItemState, SortOrder},
    navigation::NavBar,
    preferences::Preferences,
};

/// Render the items of a category that match the search and filters in the
/// query string, e.g. `?search=red&sort=title-asc&brand=BrandX`.
///
/// The brand and colour options come from all of the user's items, so the
/// same filters can be used across categories.
pub async fn get_items_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<ItemState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
    Query(query): Query<ItemQuery>,
) -> Response {
    let language = preferences.language;

    let inventory = match state.inventory.load(&user) {
        Ok(inventory) => inventory,
        Err(error) => {
            tracing::error!("Failed to load the inventory of {}: {error}", user.email);
            return error.into_page_response(language);
        }
    };
    let Some(category) = inventory.category(&category_id) else {
        return Error::CategoryNotFound.into_page_response(language);
    };

    let items = query.apply(inventory.items_in(&category_id));
    let filter_options = FilterOptions::from_items(&inventory.items);

    items_view(category, &items, &query, &filter_options, &user, &preferences).into_response()
}

fn item_card(item: &Item, language: Language) -> Markup {
    let item_url = endpoints::format_endpoint(endpoints::ITEM_VIEW, &item.id);
    let subtitle = [item.brand.as_str(), item.colour.as_str()]
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(" · ");

    html! {
        li class=(CARD_STYLE)
        {
            a href=(item_url) class="item-link"
            {
                @if let Some(image) = item.image() {
                    img src=(image) alt=(item.title) class="item-thumbnail" loading="lazy";
                } @else {
                    div class="item-thumbnail item-thumbnail-empty" { (language.translate("no_image")) }
                }

                h2 { (item.title) }

                @if !subtitle.is_empty() {
                    p class="item-subtitle" { (subtitle) }
                }
            }
        }
    }
}

fn checkbox_group(legend: &str, name: &str, options: &[String], selected: &[String]) -> Markup {
    html! {
        @if !options.is_empty() {
            fieldset class="filter-group"
            {
                legend { (legend) }

                @for option in options {
                    label class="checkbox-label"
                    {
                        input
                            type="checkbox"
                            name=(name)
                            value=(option)
                            checked[selected.contains(option)];
                        " " (option)
                    }
                }
            }
        }
    }
}

fn filter_form(
    items_url: &str,
    query: &ItemQuery,
    filter_options: &FilterOptions,
    language: Language,
) -> Markup {
    let t = |key: &'static str| language.translate(key);

    html! {
        form method="get" action=(items_url) class="item-filters"
        {
            input
                type="search"
                name="search"
                value=(query.search)
                placeholder=(t("search"))
                aria-label=(t("search"))
                class=(FORM_TEXT_INPUT_STYLE);

            select name="sort" aria-label=(t("sort")) class=(FORM_TEXT_INPUT_STYLE)
            {
                @for sort in SortOrder::ALL {
                    option value=(sort.as_str()) selected[sort == query.sort]
                    {
                        (t(sort.label_key()))
                    }
                }
            }

            details class="filters" open[query.has_filters()]
            {
                summary { (t("filter")) }
                (checkbox_group(t("filter_by_brand"), "brand", &filter_options.brands, &query.brands))
                (checkbox_group(t("filter_by_color"), "colour", &filter_options.colours, &query.colours))
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { (t("apply")) }
        }
    }
}

fn items_view(
    category: &Category,
    items: &[&Item],
    query: &ItemQuery,
    filter_options: &FilterOptions,
    user: &User,
    preferences: &Preferences,
) -> Markup {
    let language = preferences.language;
    let items_url = endpoints::format_endpoint(endpoints::CATEGORY_ITEMS_VIEW, &category.id);
    let new_item_url = endpoints::format_endpoint(endpoints::NEW_ITEM_VIEW, &category.id);
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW, language, user.is_admin()).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            a href=(endpoints::CATEGORIES_VIEW) class=(LINK_STYLE)
            {
                "← " (language.translate("inventory"))
            }

            header class="page-header"
            {
                h1 { (category.name) }

                a href=(new_item_url) class=(BUTTON_PRIMARY_STYLE)
                {
                    "+ " (language.translate("add_item"))
                }
            }

            (filter_form(&items_url, query, filter_options, language))

            @if items.is_empty() {
                p class="empty-state" { (language.translate("no_items")) }
            } @else {
                ul class="item-grid"
                {
                    @for item in items {
                        (item_card(item, language))
                    }
                }
            }
        }
    };

    base(category.name.as_ref(), preferences, &content)
}

#[cfg(test)]
mod items_page_tests {
    use axum::{
        Extension,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Query;
    use scraper::Selector;

    use crate::{
        AppState,
        auth::User,
        category::{Category, CategoryName},
        i18n::Language,
        item::{ItemQuery, ItemState, SortOrder, get_items_page},
        persistence::contract::draft,
        preferences::Preferences,
        test_utils::{
            assert_valid_html, create_user, demo_state, parse_html_document, select_texts,
        },
    };

    fn english() -> Preferences {
        Preferences {
            language: Language::En,
            ..Default::default()
        }
    }

    fn lipsticks(state: &AppState, user: &User) -> Category {
        let category = state
            .inventory
            .save_category(user, None, CategoryName::new_unchecked("Lipsticks"))
            .unwrap();

        for (title, brand, colour) in [
            ("Ruby Red", "BrandX", "red"),
            ("nude rose", "BrandY", "nude"),
            ("Berry", "BrandX", "purple"),
        ] {
            let mut draft = draft(title, brand, "");
            draft.colour = colour.to_owned();
            state
                .inventory
                .save_item(user, None, &category.id, draft)
                .unwrap();
        }

        category
    }

    async fn item_titles(state: &AppState, user: &User, category: &Category, query: &str) -> Vec<String> {
        let query: ItemQuery = serde_html_form::from_str(query).unwrap();

        let response = get_items_page(
            Path(category.id.clone()),
            State(ItemState::from_ref(state)),
            Extension(user.clone()),
            Extension(english()),
            Query(query),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        select_texts(&html, ".item-link h2")
    }

    #[test]
    fn query_string_with_repeated_filters_is_parsed() {
        let query: ItemQuery =
            serde_html_form::from_str("search=red&sort=title-asc&brand=BrandX&brand=BrandY&colour=red")
                .unwrap();

        assert_eq!(
            query,
            ItemQuery {
                search: "red".to_owned(),
                sort: SortOrder::TitleAscending,
                brands: vec!["BrandX".to_owned(), "BrandY".to_owned()],
                colours: vec!["red".to_owned()],
            }
        );
    }

    #[tokio::test]
    async fn sorts_and_filters_items() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");
        let category = lipsticks(&state, &user);

        assert_eq!(
            item_titles(&state, &user, &category, "sort=title-asc").await,
            vec!["Berry", "nude rose", "Ruby Red"]
        );
        assert_eq!(
            item_titles(&state, &user, &category, "sort=title-desc&brand=BrandX").await,
            vec!["Ruby Red", "Berry"]
        );
        assert_eq!(
            item_titles(&state, &user, &category, "search=RED").await,
            vec!["Ruby Red"]
        );
        assert!(
            item_titles(&state, &user, &category, "colour=green")
                .await
                .is_empty()
        );
    }

    #[tokio::test]
    async fn offers_brand_and_colour_filters() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");
        let category = lipsticks(&state, &user);

        let response = get_items_page(
            Path(category.id.clone()),
            State(ItemState::from_ref(&state)),
            Extension(user),
            Extension(english()),
            Query(ItemQuery {
                brands: vec!["BrandY".to_owned()],
                ..Default::default()
            }),
        )
        .await;

        let html = parse_html_document(response).await;
        let brand_values = html
            .select(&Selector::parse("input[name=brand]").unwrap())
            .map(|input| input.value().attr("value").unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        let checked = html
            .select(&Selector::parse("input[name=brand][checked]").unwrap())
            .map(|input| input.value().attr("value").unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(brand_values, vec!["BrandX", "BrandY"]);
        assert_eq!(checked, vec!["BrandY"]);
        assert_eq!(
            select_texts(&html, ".empty-state"),
            Vec::<String>::new()
        );
    }

    #[tokio::test]
    async fn shows_empty_state() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");
        let category = state
            .inventory
            .save_category(&user, None, CategoryName::new_unchecked("Blushes"))
            .unwrap();

        let response = get_items_page(
            Path(category.id.clone()),
            State(ItemState::from_ref(&state)),
            Extension(user),
            Extension(english()),
            Query(ItemQuery::default()),
        )
        .await;

        let html = parse_html_document(response).await;
        assert_eq!(select_texts(&html, ".empty-state"), vec!["No items found."]);
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let (_dir, state) = demo_state();
        let user = create_user(&state, "ana@example.com");

        let response = get_items_page(
            Path("missing".to_owned()),
            State(ItemState::from_ref(&state)),
            Extension(user),
            Extension(english()),
            Query(ItemQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
