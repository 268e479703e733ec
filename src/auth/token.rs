//! The token stored in the auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::UserId;

mod expiry_format {
    //! Writes the expiry with a fixed width hour.
    //!
    //! `OffsetDateTime`'s default serialization prints midnight as
    //! "0:00:00.0", which its own parser then rejects.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// e.g. "2025-12-21 00:00:00.0 +00:00:00".
    const FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S: Serializer>(
        expires_at: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let text = expires_at
            .format(FORMAT)
            .map_err(serde::ser::Error::custom)?;

        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;

        OffsetDateTime::parse(&text, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Identifies the signed in user until `expires_at`.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    /// The signed in user.
    pub user_id: UserId,

    /// When the session ends unless it is extended.
    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}
