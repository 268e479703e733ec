//! The admin directory: list, approve and delete user accounts.
//!
//! Only users with the [Role::Admin] role may use these pages and endpoints.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{AuthBackend, Role, User, UserId},
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE,
        base,
    },
    i18n::Language,
    navigation::NavBar,
    preferences::Preferences,
};

/// The state needed by the admin directory.
#[derive(Clone)]
pub struct AdminState {
    /// User accounts and credentials.
    pub auth: Arc<dyn AuthBackend>,
}

impl FromRef<AppState> for AdminState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth: state.auth.clone(),
        }
    }
}

/// Render the users waiting for approval and the active users.
pub async fn get_users_page(
    State(state): State<AdminState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    let language = preferences.language;

    if !user.is_admin() {
        tracing::warn!("{} tried to open the admin directory", user.email);
        return Error::Forbidden.into_page_response(language);
    }

    let users = match state.auth.list_users() {
        Ok(users) => users,
        Err(error) => {
            tracing::error!("Could not list users: {error}");
            return error.into_page_response(language);
        }
    };

    users_view(&users, &user, &preferences).into_response()
}

/// Approve a pending account so its owner can sign in.
pub async fn approve_user_endpoint(
    Path(user_id): Path<String>,
    State(state): State<AdminState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    let language = preferences.language;

    if !user.is_admin() {
        return Error::Forbidden.into_alert_response(language);
    }

    match state.auth.approve(&UserId::new(&user_id)) {
        Ok(approved) => {
            tracing::info!("{} approved {}", user.email, approved.email);
            (
                HxRedirect(endpoints::USERS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not approve user {user_id}: {error}");
            error.into_alert_response(language)
        }
    }
}

/// Delete an account with all of its data.
///
/// The response replaces the user's row with a confirmation. Admins cannot
/// delete their own account.
pub async fn delete_user_endpoint(
    Path(user_id): Path<String>,
    State(state): State<AdminState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    let language = preferences.language;

    if !user.is_admin() {
        return Error::Forbidden.into_alert_response(language);
    }

    if user.uid.as_str() == user_id {
        return (
            StatusCode::BAD_REQUEST,
            Alert::Error {
                message: language.translate("cannot_delete_self").to_owned(),
                details: String::new(),
            },
        )
            .into_response();
    }

    match state.auth.delete_user(&UserId::new(&user_id)) {
        Ok(()) => {
            tracing::info!("{} deleted user {user_id}", user.email);
            Alert::Success {
                message: language.translate("user_deleted").to_owned(),
                details: String::new(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete user {user_id}: {error}");
            error.into_alert_response(language)
        }
    }
}

fn user_row(user: &User, current_user: &User, language: Language) -> Markup {
    let t = |key: &'static str| language.translate(key);
    let approve_url = endpoints::format_endpoint(endpoints::APPROVE_USER, user.uid.as_str());
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_USER, user.uid.as_str());
    let confirm_message =
        language.translate_with("delete_user_msg", &[("name", user.email.as_ref())]);

    html! {
        li class={(CARD_STYLE) " user-row"}
        {
            span class="user-email" { (user.email) }

            @if user.role == Role::Admin {
                span class=(BADGE_STYLE) { (t("admin")) }
            }

            div class="card-actions"
            {
                @if !user.is_approved {
                    button
                        type="button"
                        hx-post=(approve_url)
                        hx-target-error="#alert-container"
                        class=(BUTTON_PRIMARY_STYLE)
                    {
                        (t("approve"))
                    }
                }

                @if user.uid != current_user.uid {
                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-confirm=(confirm_message)
                        hx-target="closest li"
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        (t("delete"))
                    }
                }
            }
        }
    }
}

fn user_list(users: &[&User], current_user: &User, language: Language) -> Markup {
    html! {
        @if users.is_empty() {
            p class="empty-state" { (language.translate("no_users")) }
        } @else {
            ul class="user-list"
            {
                @for user in users {
                    (user_row(user, current_user, language))
                }
            }
        }
    }
}

fn users_view(users: &[User], current_user: &User, preferences: &Preferences) -> Markup {
    let language = preferences.language;
    let nav_bar = NavBar::new(endpoints::USERS_VIEW, language, true).into_html();
    let (pending, active): (Vec<&User>, Vec<&User>) =
        users.iter().partition(|user| !user.is_approved);

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 { (language.translate("users_title")) }

            section id="pending-users"
            {
                h2 { (language.translate("pending_approval")) }
                (user_list(&pending, current_user, language))
            }

            section id="active-users"
            {
                h2 { (language.translate("active_users")) }
                (user_list(&active, current_user, language))
            }
        }
    };

    base(language.translate("users_title"), preferences, &content)
}
