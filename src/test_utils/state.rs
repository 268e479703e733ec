use std::sync::Arc;

use rusqlite::Connection;
use tempfile::{TempDir, tempdir};

use crate::{
    AppState,
    advisor::AdviceClient,
    auth::{Email, PasswordHash, User, ValidatedPassword},
    image_ingest::ImageIngestor,
    persistence::Backends,
    storage::{FileKeyValueStore, KeyValueStore},
};

pub(crate) const TEST_PASSWORD: &str = "rose petal lipstick";

const TEST_PASSWORD_COST: u32 = 4;

fn key_values(dir: &TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(FileKeyValueStore::open(dir.path()).expect("Could not open key-value store"))
}

fn app_state(backends: Backends) -> AppState {
    let mut state = AppState::new(
        backends,
        "a very secret test secret",
        ImageIngestor::default(),
        AdviceClient::disabled(),
    );
    state.password_cost = TEST_PASSWORD_COST;

    state
}

/// State that keeps everything in a temporary data directory.
///
/// The directory is deleted when the returned [TempDir] is dropped.
pub(crate) fn demo_state() -> (TempDir, AppState) {
    let dir = tempdir().expect("Could not create temporary directory");
    let state = app_state(Backends::demo(key_values(&dir)));

    (dir, state)
}

/// State backed by an in-memory document database.
pub(crate) fn remote_state() -> (TempDir, AppState) {
    let dir = tempdir().expect("Could not create temporary directory");
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    let backends =
        Backends::remote(connection, key_values(&dir)).expect("Could not create database tables");

    (dir, app_state(backends))
}

/// Create an account with [TEST_PASSWORD].
///
/// The first account of a store is an approved admin.
#[track_caller]
pub(crate) fn create_user(state: &AppState, email: &str) -> User {
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        TEST_PASSWORD_COST,
    )
    .expect("Could not hash password");

    state
        .auth
        .create_account(&Email::new_unchecked(email), password_hash)
        .expect("Could not create account")
}
