//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The session manager handles the lower level credential and approval checks.

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;
use time::Duration;

use crate::{
    auth::{
        AuthError, AuthState, SessionManager, invalidate_auth_cookie, normalize_redirect_url,
        set_auth_cookie,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, base, loading_spinner, log_in_register, password_input,
    },
    i18n::Language,
    preferences::Preferences,
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
pub const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

pub(super) fn language_links(language: Language, page: &str) -> Markup {
    html! {
        nav class="language-links" aria-label=(language.translate("language"))
        {
            @for option in Language::ALL {
                @if option == language {
                    span class="language-current" { (option.label()) }
                } @else {
                    a href=(format!("{page}?lang={}", option.code())) class=(LINK_STYLE)
                    {
                        (option.label())
                    }
                }
            }
        }
    }
}

struct LogInForm<'a> {
    language: Language,
    email: &'a str,
    error_message: Option<&'a str>,
    redirect_url: Option<&'a str>,
    is_demo: bool,
}

impl LogInForm<'_> {
    fn into_html(self) -> Markup {
        let t = |key: &'static str| self.language.translate(key);
        let register_url = format!("{}?lang={}", endpoints::REGISTER_VIEW, self.language.code());

        html! {
            form
                hx-post=(endpoints::LOG_IN_API)
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                hx-disabled-elt="find button"
                class="auth-form"
            {
                input type="hidden" name="lang" value=(self.language.code());

                @if let Some(redirect_url) = self.redirect_url {
                    input type="hidden" name="redirect_url" value=(redirect_url);
                }

                div
                {
                    label for="email" class=(FORM_LABEL_STYLE) { (t("email")) }
                    input
                        type="email"
                        name="email"
                        id="email"
                        value=(self.email)
                        autocomplete="email"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required
                        autofocus;
                }

                (password_input("password", t("password"), 0, None))

                div class="checkbox-row"
                {
                    input type="checkbox" name="remember_me" id="remember_me";
                    label for="remember_me" { (t("remember_me")) }
                }

                @if let Some(error_message) = self.error_message {
                    p class=(FORM_ERROR_STYLE) { (error_message) }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE)
                {
                    (loading_spinner())
                    (t("login"))
                }

                p class="auth-switch"
                {
                    (t("no_account")) " "
                    a href=(register_url) class=(LINK_STYLE) { (t("create_account")) }
                }

                @if self.is_demo {
                    p class="demo-note" { (t("demo_mode")) }
                }
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let redirect_url = raw_url.and_then(normalize_redirect_url);

    if let (None, Some(raw_url)) = (&redirect_url, raw_url) {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

/// The query string of the log-in page.
#[derive(Debug, Default, Deserialize)]
pub struct LogInPageQuery {
    /// Where to go after logging in.
    pub redirect_url: Option<String>,
    /// The language of the page.
    #[serde(default)]
    pub lang: Language,
}

/// Display the log-in page.
pub async fn get_log_in_page(
    State(state): State<AuthState>,
    Query(query): Query<LogInPageQuery>,
) -> Response {
    let language = query.lang;
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let form = LogInForm {
        language,
        email: "",
        error_message: None,
        redirect_url: redirect_url.as_deref(),
        is_demo: !state.auth.requires_approval(),
    }
    .into_html();
    let content = html! {
        (log_in_register(language, language.translate("welcome"), &html! {
            p class="auth-subtitle" { (language.translate("login_subtitle")) }
            (form)
        }))
        (language_links(language, endpoints::LOG_IN_VIEW))
    };
    let preferences = Preferences {
        language,
        ..Default::default()
    };

    base(language.translate("login"), &preferences, &content).into_response()
}

/// The data entered by the user in the log-in form.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// The e-mail of the account.
    pub email: String,

    /// The password, checked against the stored hash.
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,

    /// The language the form was displayed in.
    #[serde(default)]
    pub lang: Language,
}

/// Handler for log-in requests via the POST method.
///
/// On success the auth cookie is set, items left behind by deleted categories
/// are cleaned up, and the client is redirected to the categories page (or the
/// page they were trying to reach). Otherwise, the form is returned with an
/// error message explaining the problem.
pub async fn post_log_in(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let language = user_data.lang;
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let form_with_error = |error_key: &'static str| {
        LogInForm {
            language,
            email: &user_data.email,
            error_message: Some(language.translate(error_key)),
            redirect_url: redirect_url.as_deref(),
            is_demo: !state.auth.requires_approval(),
        }
        .into_html()
        .into_response()
    };

    if user_data.email.trim().is_empty() || user_data.password.is_empty() {
        return form_with_error("error_fill_all");
    }

    let mut session = SessionManager::new(state.auth.clone(), state.password_cost);
    let user = match session.login(&user_data.email, &user_data.password) {
        Ok(user) => user.clone(),
        Err(AuthError::InvalidCredentials) => return form_with_error("error_invalid"),
        Err(AuthError::PendingApproval) => return form_with_error("error_pending"),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return form_with_error("generic_error_msg");
        }
    };

    match state.inventory.prune_orphans(&user) {
        Ok(0) => {}
        Ok(count) => tracing::info!("Removed {count} orphaned items of {}", user.email),
        Err(error) => tracing::warn!("Could not remove orphaned items of {}: {error}", user.email),
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };
    let redirect_url = redirect_url.unwrap_or_else(|| endpoints::CATEGORIES_VIEW.to_owned());

    set_auth_cookie(jar.clone(), &user.uid, cookie_duration)
        .map(|updated_jar| (StatusCode::SEE_OTHER, HxRedirect(redirect_url), updated_jar))
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::{
        extract::{FromRef, Query, State},
        http::StatusCode,
    };

    use crate::{
        auth::AuthState,
        endpoints,
        i18n::Language,
        test_utils::{
            assert_form_input, assert_form_input_with_value, assert_form_submit_button,
            assert_hx_endpoint, assert_valid_html, demo_state, must_get_form,
            parse_html_document, remote_state, select_texts,
        },
    };

    use super::{LogInPageQuery, get_log_in_page};

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let (_dir, state) = remote_state();

        let response = get_log_in_page(
            State(AuthState::from_ref(&state)),
            Query(LogInPageQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::LOG_IN_API, "hx-post");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_input_with_value(&form, "lang", "hidden", "pt");
        assert_form_submit_button(&form);
        assert!(select_texts(&document, ".demo-note").is_empty());
    }

    #[tokio::test]
    async fn log_in_page_preserves_redirect_url() {
        let (_dir, state) = remote_state();
        let redirect_url = "/categories/id_1_abc/items?sort=title-asc";

        let response = get_log_in_page(
            State(AuthState::from_ref(&state)),
            Query(LogInPageQuery {
                redirect_url: Some(redirect_url.to_owned()),
                lang: Language::En,
            }),
        )
        .await;

        let document = parse_html_document(response).await;
        let form = must_get_form(&document);
        assert_form_input_with_value(&form, "redirect_url", "hidden", redirect_url);
        assert_eq!(select_texts(&document, "h2"), vec!["Welcome!"]);
    }

    #[tokio::test]
    async fn log_in_page_drops_external_redirect_url() {
        let (_dir, state) = remote_state();

        let response = get_log_in_page(
            State(AuthState::from_ref(&state)),
            Query(LogInPageQuery {
                redirect_url: Some("https://example.com/".to_owned()),
                lang: Language::Pt,
            }),
        )
        .await;

        let document = parse_html_document(response).await;
        let form = must_get_form(&document);
        let has_redirect_input = form
            .select(&scraper::Selector::parse("input[name=redirect_url]").unwrap())
            .next()
            .is_some();
        assert!(!has_redirect_input);
    }

    #[tokio::test]
    async fn demo_mode_is_explained() {
        let (_dir, state) = demo_state();

        let response = get_log_in_page(
            State(AuthState::from_ref(&state)),
            Query(LogInPageQuery {
                redirect_url: None,
                lang: Language::En,
            }),
        )
        .await;

        let document = parse_html_document(response).await;
        assert_eq!(select_texts(&document, ".demo-note").len(), 1);
    }
}
