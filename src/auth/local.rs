//! Demo mode accounts kept in one JSON array under `makeup_users_db`.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{AuthBackend, AuthError, Email, PasswordHash, User, UserId, backend::UserProfile},
    entity_id::now_millis,
    persistence::inventory_key,
    preferences::preference_keys,
    storage::KeyValueStore,
};

/// The key of the users blob.
pub const USERS_KEY: &str = "makeup_users_db";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAccount {
    #[serde(flatten)]
    profile: UserProfile,
    password_hash: PasswordHash,
}

/// An [AuthBackend] for demo mode. Accounts never need approval.
pub struct LocalAuth {
    key_values: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl LocalAuth {
    /// Create a backend on top of `key_values`.
    pub fn new(key_values: Arc<dyn KeyValueStore>) -> Self {
        Self {
            key_values,
            write_lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<Vec<StoredAccount>, Error> {
        let Some(text) = self.key_values.get(USERS_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&text) {
            Ok(accounts) => Ok(accounts),
            Err(error) => {
                tracing::warn!("could not parse stored users, starting empty: {error}");
                Ok(Vec::new())
            }
        }
    }

    fn mutate<R>(
        &self,
        change: impl FnOnce(&mut Vec<StoredAccount>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let _guard = self
            .write_lock
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire users lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let mut accounts = self.read()?;
        let result = change(&mut accounts)?;
        self.key_values
            .set(USERS_KEY, &serde_json::to_string(&accounts)?)?;

        Ok(result)
    }
}

impl AuthBackend for LocalAuth {
    fn requires_approval(&self) -> bool {
        false
    }

    fn find_by_email(&self, email: &Email) -> Result<Option<(User, PasswordHash)>, Error> {
        Ok(self
            .read()?
            .into_iter()
            .find(|account| &account.profile.email == email)
            .map(|account| (account.profile.into(), account.password_hash)))
    }

    fn find_by_id(&self, uid: &UserId) -> Result<Option<User>, Error> {
        Ok(self
            .read()?
            .into_iter()
            .find(|account| &account.profile.uid == uid)
            .map(|account| account.profile.into()))
    }

    fn create_account(
        &self,
        email: &Email,
        password_hash: PasswordHash,
    ) -> Result<User, AuthError> {
        let created = self.mutate(|accounts| {
            if accounts.iter().any(|account| &account.profile.email == email) {
                return Ok(None);
            }

            let profile = UserProfile::new(email.clone(), accounts.is_empty(), false, now_millis());
            accounts.push(StoredAccount {
                profile: profile.clone(),
                password_hash,
            });

            Ok(Some(profile.into()))
        })?;

        created.ok_or(AuthError::EmailInUse)
    }

    fn list_users(&self) -> Result<Vec<User>, Error> {
        Ok(self
            .read()?
            .into_iter()
            .map(|account| account.profile.into())
            .collect())
    }

    fn approve(&self, uid: &UserId) -> Result<User, Error> {
        self.mutate(|accounts| {
            let account = accounts
                .iter_mut()
                .find(|account| &account.profile.uid == uid)
                .ok_or(Error::NotFound)?;
            account.profile.is_approved = true;

            Ok(account.profile.clone().into())
        })
    }

    fn delete_user(&self, uid: &UserId) -> Result<(), Error> {
        let email = self.mutate(|accounts| {
            let index = accounts
                .iter()
                .position(|account| &account.profile.uid == uid)
                .ok_or(Error::NotFound)?;

            Ok(accounts.remove(index).profile.email)
        })?;

        self.key_values.remove(&inventory_key(&email))?;
        for key in preference_keys(&email) {
            self.key_values.remove(&key)?;
        }

        Ok(())
    }
}
