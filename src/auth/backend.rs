//! The account storage the session manager talks to.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{AuthError, Email, PasswordHash, Role, User, UserId},
};

/// Stores user accounts and their credentials.
pub trait AuthBackend: Send + Sync {
    /// Whether new accounts must be approved by an admin before they can sign in.
    fn requires_approval(&self) -> bool;

    /// Find a user and their password hash by e-mail address.
    fn find_by_email(&self, email: &Email) -> Result<Option<(User, PasswordHash)>, Error>;

    /// Find a user by ID.
    fn find_by_id(&self, uid: &UserId) -> Result<Option<User>, Error>;

    /// Create an account.
    ///
    /// The first account becomes an approved admin. Later accounts are
    /// approved only when the backend does not require approval.
    ///
    /// # Errors
    ///
    /// Returns [AuthError::EmailInUse] if an account with `email` exists.
    fn create_account(&self, email: &Email, password_hash: PasswordHash)
    -> Result<User, AuthError>;

    /// Every user in the order they registered.
    fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Mark a user as approved.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the user does not exist.
    fn approve(&self, uid: &UserId) -> Result<User, Error>;

    /// Delete a user's account, profile and inventory.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the user does not exist.
    fn delete_user(&self, uid: &UserId) -> Result<(), Error>;
}

/// The public part of an account, stored as `users/{uid}` in remote mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// The address the user logs in with.
    pub email: Email,
    /// The user's ID.
    pub uid: UserId,
    /// Whether an admin has approved the account.
    #[serde(default)]
    pub is_approved: bool,
    /// When the account was created, in milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: i64,
    /// The user's role.
    #[serde(default)]
    pub role: Role,
}

impl UserProfile {
    /// The profile of a new account.
    ///
    /// `is_first` marks the first account of the installation, which becomes
    /// an approved admin.
    pub fn new(email: Email, is_first: bool, requires_approval: bool, created_at: i64) -> Self {
        Self {
            email,
            uid: UserId::generate(),
            is_approved: is_first || !requires_approval,
            created_at,
            role: if is_first { Role::Admin } else { Role::Member },
        }
    }
}

impl From<UserProfile> for User {
    fn from(profile: UserProfile) -> Self {
        User {
            uid: profile.uid,
            email: profile.email,
            is_approved: profile.is_approved,
            role: profile.role,
        }
    }
}
