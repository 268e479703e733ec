//! User identity, e-mail addresses and roles.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::{Error, entity_id::generate_id};

/// A newtype wrapper for user IDs.
///
/// The ID is the same in the credentials table, the profile document and the
/// `users/{uid}/...` document paths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an existing user ID.
    pub fn new(id: &str) -> Self {
        Self(id.to_owned())
    }

    /// Create a fresh, unique user ID.
    pub fn generate() -> Self {
        Self(generate_id())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A syntactically valid e-mail address in lower case.
///
/// E-mail addresses are compared case-insensitively, so they are lower cased
/// on the way in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse and normalise an e-mail address.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidEmail] if `email` is not a valid address.
    pub fn new(email: &str) -> Result<Self, Error> {
        let email = email.trim().to_lowercase();

        if EmailAddress::is_valid(&email) {
            Ok(Self(email))
        } else {
            Err(Error::InvalidEmail(email))
        }
    }

    /// Wrap an e-mail address without validation.
    ///
    /// The caller should ensure the address is valid and lower case.
    pub fn new_unchecked(email: &str) -> Self {
        Self(email.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Email {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Email::new(s)
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What a user is allowed to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular user who manages their own inventory.
    #[default]
    Member,
    /// A user who can also approve and delete other users.
    Admin,
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// The user's ID.
    pub uid: UserId,
    /// The address the user logs in with.
    pub email: Email,
    /// Whether an admin has approved the account.
    pub is_approved: bool,
    /// The user's role.
    pub role: Role,
}

impl User {
    /// Whether the user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the user may sign in to a backend that requires approval.
    ///
    /// Admins are never locked out.
    pub fn can_sign_in(&self) -> bool {
        self.is_approved || self.is_admin()
    }
}
