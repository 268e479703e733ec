//! Identifiers and timestamps for inventory records.

use time::OffsetDateTime;
use uuid::Uuid;

const ID_SUFFIX_LENGTH: usize = 9;

/// Generate an ID of the form `id_<unix millis>_<9 lowercase alphanumerics>`.
pub fn generate_id() -> String {
    let suffix = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(ID_SUFFIX_LENGTH)
        .collect::<String>();

    format!("id_{}_{}", now_millis(), suffix)
}

/// The current time as milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
