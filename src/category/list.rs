//! Categories listing page, the home page of a signed in user.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    auth::User,
    category::{Category, CategoryState},
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base,
        delete_button,
    },
    i18n::Language,
    navigation::NavBar,
    persistence::PersistenceMode,
    preferences::Preferences,
};

/// A category with the number of items in it.
struct CategoryRow<'a> {
    category: &'a Category,
    item_count: usize,
}

/// Render the categories of the signed in user with their item counts.
pub async fn get_categories_page(
    State(state): State<CategoryState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    let inventory = match state.inventory.load(&user) {
        Ok(inventory) => inventory,
        Err(error) => {
            tracing::error!("Failed to load the inventory of {}: {error}", user.email);
            return error.into_page_response(preferences.language);
        }
    };

    let rows = inventory
        .categories
        .iter()
        .map(|category| CategoryRow {
            category,
            item_count: inventory.items_in(&category.id).count(),
        })
        .collect::<Vec<_>>();

    categories_view(&rows, &user, &preferences, state.mode).into_response()
}

fn category_card(row: &CategoryRow, language: Language) -> Markup {
    let category = row.category;
    let items_url = endpoints::format_endpoint(endpoints::CATEGORY_ITEMS_VIEW, &category.id);
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, &category.id);
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_CATEGORY, &category.id);
    let confirm_message =
        language.translate_with("delete_cat_msg", &[("name", category.name.as_ref())]);
    let item_count = language.translate_with("items_count", &[("count", &row.item_count.to_string())]);

    html! {
        li class=(CARD_STYLE)
        {
            a href=(items_url) class="category-link"
            {
                h2 { (category.name) }
                span class=(BADGE_STYLE) { (item_count) }
            }

            div class="card-actions"
            {
                a href=(edit_url) class=(LINK_STYLE) { (language.translate("edit")) }
                (delete_button(&delete_url, &confirm_message, language.translate("delete")))
            }
        }
    }
}

fn categories_view(
    rows: &[CategoryRow],
    user: &User,
    preferences: &Preferences,
    mode: PersistenceMode,
) -> Markup {
    let language = preferences.language;
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW, language, user.is_admin()).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            header class="page-header"
            {
                h1 { (language.translate("inventory")) }

                a href=(endpoints::NEW_CATEGORY_VIEW) class=(BUTTON_PRIMARY_STYLE)
                {
                    "+ " (language.translate("new_category"))
                }
            }

            @if mode == PersistenceMode::Demo {
                p class="demo-note" { (language.translate("demo_mode")) }
            }

            @if rows.is_empty() {
                p class="empty-state"
                {
                    (language.translate("no_categories")) " "
                    a href=(endpoints::NEW_CATEGORY_VIEW) class=(LINK_STYLE)
                    {
                        (language.translate("new_category"))
                    }
                }
            } @else {
                ul class="category-grid"
                {
                    @for row in rows {
                        (category_card(row, language))
                    }
                }
            }
        }
    };

    base(language.translate("inventory"), preferences, &content)
}
