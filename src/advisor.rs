//! The beauty advisor: questions about the inventory answered by an optional
//! AI text service.
//!
//! The service receives `{"prompt": ..., "inventory": ...}` and replies with
//! `{"text": ...}`. When no service is configured, or the request fails for
//! any reason, the user gets an apology in their language instead.

use std::{sync::Arc, time::Duration};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    auth::User,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
        loading_spinner,
    },
    i18n::Language,
    navigation::NavBar,
    persistence::{Inventory, InventoryStore},
    preferences::Preferences,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends questions to the AI text service.
#[derive(Debug, Clone)]
pub struct AdviceClient {
    http: reqwest::Client,
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct AdviceRequest<'a> {
    prompt: &'a str,
    inventory: &'a str,
}

#[derive(Debug, Deserialize)]
struct AdviceResponse {
    text: String,
}

impl AdviceClient {
    /// A client that posts questions to `url`.
    pub fn new(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: Some(url),
        }
    }

    /// A client that always answers with the "unavailable" message.
    pub fn disabled() -> Self {
        Self {
            http: reqwest::Client::new(),
            url: None,
        }
    }

    /// Ask the service about `prompt` given the `inventory` summary.
    ///
    /// Never fails: errors are logged and replaced with a translated apology.
    pub async fn advise(&self, prompt: &str, inventory: &str, language: Language) -> String {
        let Some(url) = &self.url else {
            return language.translate("advisor_unavailable").to_owned();
        };

        match self.request(url, prompt, inventory).await {
            Ok(text) => text,
            Err(error) => {
                tracing::error!("The advisor service could not answer: {error}");
                language.translate("advisor_unavailable").to_owned()
            }
        }
    }

    async fn request(
        &self,
        url: &str,
        prompt: &str,
        inventory: &str,
    ) -> Result<String, reqwest::Error> {
        let response = self
            .http
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .json(&AdviceRequest { prompt, inventory })
            .send()
            .await?
            .error_for_status()?
            .json::<AdviceResponse>()
            .await?;

        Ok(response.text)
    }
}

/// Describe an inventory in one line for the advisor, e.g.
/// `"Lipsticks: Ruby Red (BrandX, red); Blushes: Peach"`.
///
/// Items whose category no longer exists are left out.
pub fn summarize_inventory(inventory: &Inventory) -> String {
    inventory
        .items
        .iter()
        .filter_map(|item| {
            let category = inventory.category(&item.category_id)?;
            let details = [item.brand.as_str(), item.colour.as_str()]
                .into_iter()
                .filter(|value| !value.is_empty())
                .collect::<Vec<_>>();

            Some(if details.is_empty() {
                format!("{}: {}", category.name, item.title)
            } else {
                format!("{}: {} ({})", category.name, item.title, details.join(", "))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// The state needed by the advisor.
#[derive(Clone)]
pub struct AdvisorState {
    /// The categories and items of each user.
    pub inventory: Arc<dyn InventoryStore>,
    /// The client for the AI text service.
    pub advisor: AdviceClient,
}

impl FromRef<AppState> for AdvisorState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            inventory: state.inventory.clone(),
            advisor: state.advisor.clone(),
        }
    }
}

/// The question typed by the user.
#[derive(Debug, Deserialize)]
pub struct AdviceForm {
    /// Free text.
    pub prompt: String,
}

/// Render the advisor page.
pub async fn get_advisor_page(
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
) -> Response {
    let language = preferences.language;
    let nav_bar = NavBar::new(endpoints::ADVISOR_VIEW, language, user.is_admin()).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 { (language.translate("advisor")) }
            p class="page-subtitle" { (language.translate("advisor_subtitle")) }

            (advice_form(language))

            div id="advice" aria-live="polite" {}
        }
    };

    base(language.translate("advisor"), &preferences, &content).into_response()
}

/// Answer a question about the user's inventory.
///
/// Responds with a fragment that is swapped into the `#advice` element.
pub async fn post_advice(
    State(state): State<AdvisorState>,
    Extension(user): Extension<User>,
    Extension(preferences): Extension<Preferences>,
    Form(form): Form<AdviceForm>,
) -> Response {
    let language = preferences.language;
    let prompt = form.prompt.trim();

    if prompt.is_empty() {
        return html! {
            p class=(FORM_ERROR_STYLE) { (language.translate("error_fill_all")) }
        }
        .into_response();
    }

    let inventory = match state.inventory.load(&user) {
        Ok(inventory) => inventory,
        Err(error) => {
            tracing::error!("Failed to load the inventory of {}: {error}", user.email);
            return error.into_alert_response(language);
        }
    };

    let answer = state
        .advisor
        .advise(prompt, &summarize_inventory(&inventory), language)
        .await;

    html! {
        blockquote class="advice-prompt" { (prompt) }
        p class="advice-text" { (answer) }
    }
    .into_response()
}

fn advice_form(language: Language) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_ADVICE)
            hx-target="#advice"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="find button"
            class="stack"
        {
            textarea
                name="prompt"
                rows="3"
                required
                placeholder=(language.translate("advisor_prompt"))
                aria-label=(language.translate("advisor_prompt"))
                class=(FORM_TEXT_INPUT_STYLE)
            {}

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="htmx-indicator" { (loading_spinner()) }
                (language.translate("ask"))
            }
        }
    }
}
