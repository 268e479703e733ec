//! The registration page and the endpoint that creates accounts.

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

use crate::{
    auth::{
        AuthError, AuthState, Email, SessionManager, ValidatedPassword, log_in::language_links,
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

/// The minimum number of characters the password should have to be considered
/// valid on the client side. The strength check on the server comes on top.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 8;

fn registration_form(language: Language, email: &str, error_message: Option<&str>) -> Markup {
    let t = |key: &'static str| language.translate(key);
    let log_in_url = format!("{}?lang={}", endpoints::LOG_IN_VIEW, language.code());

    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-disabled-elt="find button"
            class="auth-form"
        {
            input type="hidden" name="lang" value=(language.code());

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { (t("email")) }
                input
                    type="email"
                    name="email"
                    id="email"
                    value=(email)
                    autocomplete="email"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus;
            }

            (password_input("password", t("password"), PASSWORD_INPUT_MIN_LENGTH, None))
            (password_input(
                "confirm_password",
                t("confirm_password"),
                PASSWORD_INPUT_MIN_LENGTH,
                None
            ))

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                (loading_spinner())
                (t("create_account"))
            }

            p class="auth-switch"
            {
                (t("have_account")) " "
                a href=(log_in_url) class=(LINK_STYLE) { (t("login")) }
            }
        }
    }
}

/// The query string of the registration page.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterPageQuery {
    /// The language of the page.
    #[serde(default)]
    pub lang: Language,
}

/// Display the registration page.
pub async fn get_register_page(Query(query): Query<RegisterPageQuery>) -> Response {
    let language = query.lang;
    let content = html! {
        (log_in_register(
            language,
            language.translate("register_title"),
            &registration_form(language, "", None)
        ))
        (language_links(language, endpoints::REGISTER_VIEW))
    };
    let preferences = Preferences {
        language,
        ..Default::default()
    };

    base(language.translate("create_account"), &preferences, &content).into_response()
}

/// The data entered by the user in the registration form.
#[derive(Deserialize)]
pub struct RegisterForm {
    /// The e-mail of the new account.
    pub email: String,
    /// The new password.
    pub password: String,
    /// The new password again, to catch typos.
    pub confirm_password: String,
    /// The language the form was displayed in.
    #[serde(default)]
    pub lang: Language,
}

/// Create an account.
///
/// When the account may sign in straight away the client is signed in and
/// sent to the categories page. When it needs an admin's approval the form is
/// returned with a message saying so, and no session is created.
pub async fn register_user(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let language = user_data.lang;
    let form_with_error = |error_key: &'static str| {
        registration_form(
            language,
            &user_data.email,
            Some(language.translate(error_key)),
        )
        .into_response()
    };

    if user_data.email.trim().is_empty()
        || user_data.password.is_empty()
        || user_data.confirm_password.is_empty()
    {
        return form_with_error("error_fill_all");
    }

    let Ok(email) = Email::new(&user_data.email) else {
        return form_with_error("error_invalid_email");
    };

    if user_data.password != user_data.confirm_password {
        return form_with_error("error_password_mismatch");
    }

    let password = match ValidatedPassword::new(&user_data.password, &[email.as_ref()]) {
        Ok(password) => password,
        Err(error) => {
            tracing::debug!("Rejected password for {email}: {error}");
            return form_with_error("error_weak_password");
        }
    };

    let mut session = SessionManager::new(state.auth.clone(), state.password_cost);
    let user = match session.register(email, password) {
        Ok(user) => user.clone(),
        Err(AuthError::EmailInUse) => return form_with_error("error_in_use"),
        Err(AuthError::PendingApproval) => return form_with_error("error_pending"),
        Err(error) => {
            tracing::error!("An unhandled error occurred while creating an account: {error}");
            return form_with_error("generic_error_msg");
        }
    };

    match set_auth_cookie(jar, &user.uid, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            (
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
                .into_response()
        }
    }
}


#[cfg(test)]
mod register_user_tests {
    use axum::{
        Form,
        extract::{FromRef, State},
        http::{StatusCode, header::SET_COOKIE},
        response::Response,
    };
    use axum_extra::extract::PrivateCookieJar;
    use time::Duration;

    use crate::{
        AppState,
        auth::{AuthState, Email, Role},
        endpoints,
        i18n::Language,
        test_utils::{
            TEST_PASSWORD, assert_form_error_message, assert_hx_redirect, assert_valid_html,
            create_user, demo_state, must_get_form, parse_html_fragment, remote_state,
        },
    };

    use super::{RegisterForm, register_user};

    fn form(email: &str, password: &str, confirm_password: &str) -> RegisterForm {
        RegisterForm {
            email: email.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
            lang: Language::En,
        }
    }

    async fn register(state: &AppState, data: RegisterForm) -> Response {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        register_user(State(AuthState::from_ref(state)), jar, Form(data)).await
    }

    async fn assert_error_message(response: Response, want: &str) {
        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_form_error_message(&must_get_form(&html), want);
    }

    fn has_session_cookie(response: &Response) -> bool {
        response.headers().get(SET_COOKIE).is_some()
    }

    #[tokio::test]
    async fn cookie_failure_redirects_to_error_page() {
        let (_dir, mut state) = demo_state();
        state.cookie_duration = Duration::MAX;

        let response = register(
            &state,
            form("ana@example.com", TEST_PASSWORD, TEST_PASSWORD),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_hx_redirect(&response, endpoints::INTERNAL_ERROR_VIEW);
        assert!(!has_session_cookie(&response));
    }

    #[tokio::test]
    async fn demo_registration_signs_in() {
        let (_dir, state) = demo_state();

        let response = register(
            &state,
            form("Ana@Example.com", TEST_PASSWORD, TEST_PASSWORD),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        assert!(has_session_cookie(&response));
        let (user, _) = state
            .auth
            .find_by_email(&Email::new_unchecked("ana@example.com"))
            .unwrap()
            .expect("account was not created");
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn remote_registration_waits_for_approval() {
        let (_dir, state) = remote_state();
        create_user(&state, "admin@example.com");

        let response = register(
            &state,
            form("ana@example.com", TEST_PASSWORD, TEST_PASSWORD),
        )
        .await;

        assert!(!has_session_cookie(&response));
        assert_error_message(response, "Account pending administrator approval.").await;
        let (user, _) = state
            .auth
            .find_by_email(&Email::new_unchecked("ana@example.com"))
            .unwrap()
            .expect("account was not created");
        assert!(!user.is_approved);
    }

    #[tokio::test]
    async fn taken_email_is_rejected() {
        let (_dir, state) = demo_state();
        create_user(&state, "ana@example.com");

        let response = register(
            &state,
            form("ana@example.com", TEST_PASSWORD, TEST_PASSWORD),
        )
        .await;

        assert_error_message(response, "This email is already in use.").await;
    }

    #[tokio::test]
    async fn mismatched_passwords_are_rejected() {
        let (_dir, state) = demo_state();

        let response = register(
            &state,
            form("ana@example.com", TEST_PASSWORD, "rose petal lipgloss"),
        )
        .await;

        assert_error_message(response, "Passwords do not match.").await;
    }

    #[tokio::test]
    async fn weak_password_is_rejected() {
        let (_dir, state) = demo_state();

        let response = register(&state, form("ana@example.com", "password", "password")).await;

        assert_error_message(response, "Password is too weak.").await;
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let (_dir, state) = demo_state();

        let response = register(&state, form("not an email", TEST_PASSWORD, TEST_PASSWORD)).await;

        assert_error_message(response, "Enter a valid email address.").await;
    }
}
