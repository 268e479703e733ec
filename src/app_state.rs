//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    advisor::AdviceClient,
    auth::{AuthBackend, DEFAULT_COOKIE_DURATION, PasswordHash},
    image_ingest::ImageIngestor,
    persistence::{Backends, InventoryStore, PersistenceMode},
    preferences::PreferenceStore,
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The bcrypt cost used when hashing the passwords of new accounts.
    pub password_cost: u32,

    /// Whether the data is kept locally or in the document database.
    pub mode: PersistenceMode,

    /// The categories and items of each user.
    pub inventory: Arc<dyn InventoryStore>,

    /// User accounts and credentials.
    pub auth: Arc<dyn AuthBackend>,

    /// The theme, font and language of each user.
    pub preferences: PreferenceStore,

    /// Settings for downsizing uploaded photos.
    pub image_ingestor: ImageIngestor,

    /// The client for the optional beauty advisor service.
    pub advisor: AdviceClient,
}

impl AppState {
    /// Create a new [AppState] from the stores selected at startup.
    pub fn new(
        backends: Backends,
        cookie_secret: &str,
        image_ingestor: ImageIngestor,
        advisor: AdviceClient,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            password_cost: PasswordHash::DEFAULT_COST,
            mode: backends.mode,
            inventory: backends.inventory,
            auth: backends.auth,
            preferences: PreferenceStore::new(backends.key_values),
            image_ingestor,
            advisor,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
