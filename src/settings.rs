//! The appearance page where users pick their theme, font and language.

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    AppState,
    auth::User,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    i18n::Language,
    navigation::NavBar,
    preferences::{Font, PreferenceStore, Preferences, Theme},
};

/// The state needed for saving preferences.
#[derive(Clone)]
pub struct SettingsState {
    /// The theme, font and language of each user.
    pub preferences: PreferenceStore,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            preferences: state.preferences.clone(),
        }
    }
}

/// Render the appearance settings of the signed in user.
pub async fn get_settings_page(
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    let language = preferences.language;
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW, language, user.is_admin()).into_html();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 { (language.translate("appearance")) }
            (settings_form(&preferences))
        }
    };

    base(language.translate("appearance"), &preferences, &content).into_response()
}

/// Store the submitted preferences and reload the settings page so the new
/// theme, font and language take effect.
pub async fn update_settings_endpoint(
    State(state): State<SettingsState>,
    Extension(user): Extension<User>,
    Form(new_preferences): Form<Preferences>,
) -> Response {
    match state.preferences.save(&user.email, &new_preferences) {
        Ok(()) => {
            tracing::debug!("{} changed their preferences to {new_preferences:?}", user.email);
            (
                HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not save the preferences of {}: {error}", user.email);
            error.into_alert_response(new_preferences.language)
        }
    }
}

fn settings_form(preferences: &Preferences) -> Markup {
    let language = preferences.language;
    let t = |key: &'static str| language.translate(key);

    html! {
        form
            hx-post=(endpoints::PUT_SETTINGS)
            hx-target-error="#alert-container"
            class="stack"
        {
            fieldset class="theme-picker"
            {
                legend class=(FORM_LABEL_STYLE) { (t("theme_color")) }

                @for theme in Theme::ALL {
                    label class="theme-option"
                    {
                        input
                            type="radio"
                            name="theme"
                            value=(theme.as_str())
                            checked[theme == preferences.theme];
                        span
                            class="theme-swatch"
                            style={ "background: " (theme.palette().accent) }
                        {}
                        " " (t(theme.label_key()))
                    }
                }
            }

            div
            {
                label for="font" class=(FORM_LABEL_STYLE) { (t("font_style")) }
                select id="font" name="font" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for font in Font::ALL {
                        option
                            value=(font.family())
                            style={ "font-family: '" (font.family()) "'" }
                            selected[font == preferences.font]
                        {
                            (font.family())
                        }
                    }
                }
            }

            div
            {
                label for="language" class=(FORM_LABEL_STYLE) { (t("language")) }
                select id="language" name="language" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for option in Language::ALL {
                        option value=(option.code()) selected[option == language]
                        {
                            (option.label())
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (t("done")) }
        }
    }
}
