//! Page layout, shared styles and small reusable HTML fragments.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{i18n::Language, preferences::Preferences};

pub const LINK_STYLE: &str = "link";

pub const BUTTON_PRIMARY_STYLE: &str = "button button-primary";

pub const BUTTON_SECONDARY_STYLE: &str = "button button-secondary";

pub const BUTTON_DELETE_STYLE: &str = "button button-delete";

pub const FORM_CONTAINER_STYLE: &str = "form-container";
pub const FORM_LABEL_STYLE: &str = "form-label";
pub const FORM_TEXT_INPUT_STYLE: &str = "form-input";
pub const FORM_ERROR_STYLE: &str = "form-error";

pub const CARD_STYLE: &str = "card";
pub const BADGE_STYLE: &str = "badge";

pub const PAGE_CONTAINER_STYLE: &str = "page";

/// The theme colours and font as CSS custom properties.
fn theme_style(preferences: &Preferences) -> PreEscaped<String> {
    let palette = preferences.theme.palette();

    PreEscaped(format!(
        ":root {{ --primary: {}; --shadow-dark: {}; --shadow-light: {}; \
        --accent: {}; --text: {}; --font: '{}', sans-serif; }}",
        palette.primary,
        palette.shadow_dark,
        palette.shadow_light,
        palette.accent,
        palette.text,
        preferences.font.family(),
    ))
}

/// The HTML document around `content`, styled with the user's theme and font.
pub fn base(title: &str, preferences: &Preferences, content: &Markup) -> Markup {
    let app_name = preferences.language.translate("app_name");

    html! {
        (DOCTYPE)
        html lang=(preferences.language.code())
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - " (app_name) }
                link rel="preconnect" href="https://fonts.googleapis.com";
                link href=(preferences.font.stylesheet_url()) rel="stylesheet";
                link href="/static/main.css" rel="stylesheet";

                script src="https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js" {}
                script src="https://unpkg.com/htmx-ext-response-targets@2.0.4/dist/response-targets.js" {}

                style { (theme_style(preferences)) }
            }

            body hx-ext="response-targets"
            {
                (content)

                // Alert container for error swaps
                div id="alert-container" class="alert-container" {}
            }
        }
    }
}

/// A full page for an HTTP error, e.g. `header` "404".
pub fn error_view(language: Language, title: &str, header: &str, description: &str) -> Markup {
    let preferences = Preferences {
        language,
        ..Default::default()
    };
    let content = html!(
        main class="error-page"
        {
            h1 class="error-code" { (header) }
            p class="error-title" { (title) }
            p class="error-description" { (description) }

            a href="/" class=(BUTTON_PRIMARY_STYLE)
            {
                (language.translate("back"))
            }
        }
    );

    base(title, &preferences, &content)
}

/// The card shared by the log-in and registration pages.
pub fn log_in_register(language: Language, form_title: &str, form: &Markup) -> Markup {
    html! {
        main class="auth-page"
        {
            div class="auth-logo"
            {
                span class="auth-logo-icon" { "💄" }
                h1 { (language.translate("app_name")) }
            }

            div class=(CARD_STYLE)
            {
                h2 class="auth-title" { (form_title) }
                (form)
            }
        }
    }
}

pub fn password_input(
    name: &str,
    label: &str,
    min_length: u8,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type="password"
                name=(name)
                id=(name)
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length);

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

/// A labelled text input. Only the `title`-like fields are `required`.
pub fn text_input(name: &str, label: &str, value: &str, required: bool) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type="text"
                name=(name)
                id=(name)
                value=(value)
                class=(FORM_TEXT_INPUT_STYLE)
                required[required];
        }
    }
}

pub fn loading_spinner() -> Markup {
    html! {
        span class="spinner htmx-indicator" aria-hidden="true" {}
    }
}

/// A button that deletes the resource at `delete_url` after the user confirms.
pub fn delete_button(delete_url: &str, confirm_message: &str, label: &str) -> Markup {
    html! {
        button
            type="button"
            hx-delete=(delete_url)
            hx-confirm=(confirm_message)
            hx-target-error="#alert-container"
            class=(BUTTON_DELETE_STYLE)
        {
            (label)
        }
    }
}

#[cfg(test)]
mod tests {
    use maud::html;
    use scraper::{Html, Selector};

    use crate::{
        i18n::Language,
        preferences::{Font, Preferences, Theme},
        test_utils::assert_valid_html,
    };

    use super::base;

    #[test]
    fn base_applies_theme_font_and_language() {
        let preferences = Preferences {
            theme: Theme::Mint,
            font: Font::Roboto,
            language: Language::Es,
        };

        let page = base("Inicio", &preferences, &html!(p { "hola" })).into_string();
        let document = Html::parse_document(&page);

        assert_valid_html(&document);
        let root = document
            .select(&Selector::parse("html").unwrap())
            .next()
            .unwrap();
        assert_eq!(root.value().attr("lang"), Some("es"));
        let style = document
            .select(&Selector::parse("head style").unwrap())
            .next()
            .unwrap()
            .inner_html();
        assert!(style.contains("--accent: #80cbc4"), "got style {style}");
        assert!(style.contains("'Roboto'"), "got style {style}");
        assert!(page.contains("family=Roboto"));
    }

    #[test]
    fn base_has_alert_container() {
        let page = base("Home", &Preferences::default(), &html!()).into_string();
        let document = Html::parse_document(&page);

        assert!(
            document
                .select(&Selector::parse("#alert-container").unwrap())
                .next()
                .is_some()
        );
    }
}
