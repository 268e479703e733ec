//! Remote mode accounts: credentials in the `account` table, profiles as
//! `users/{uid}` documents.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension};
use serde_json::{Map, Value};

use crate::{
    Error,
    auth::{AuthBackend, AuthError, Email, PasswordHash, User, UserId, backend::UserProfile},
    entity_id::now_millis,
    persistence::{categories_collection, items_collection},
    storage::{DocumentStore, WriteBatch},
};

/// The collection that holds user profiles.
pub const USERS_COLLECTION: &str = "users";

/// Create the table that holds account credentials.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
                uid TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at INTEGER NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// An [AuthBackend] where new accounts wait for an admin's approval.
pub struct RemoteAuth {
    connection: Arc<Mutex<Connection>>,
    documents: Arc<dyn DocumentStore>,
}

impl RemoteAuth {
    /// Create a backend on a database with the account table.
    ///
    /// `documents` must not hold the lock on `connection` between calls.
    pub fn new(connection: Arc<Mutex<Connection>>, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            connection,
            documents,
        }
    }

    fn with_connection<R>(
        &self,
        f: impl FnOnce(&Connection) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let connection = self
            .connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        f(&connection)
    }

    fn profile(&self, uid: &UserId) -> Result<Option<UserProfile>, Error> {
        self.documents
            .get(USERS_COLLECTION, uid.as_str())?
            .map(|data| serde_json::from_value(data).map_err(Error::from))
            .transpose()
    }
}

impl AuthBackend for RemoteAuth {
    fn requires_approval(&self) -> bool {
        true
    }

    fn find_by_email(&self, email: &Email) -> Result<Option<(User, PasswordHash)>, Error> {
        let account: Option<(String, String, i64)> = self.with_connection(|connection| {
            Ok(connection
                .query_row(
                    "SELECT uid, password, created_at FROM account WHERE email = ?1",
                    (email.as_ref(),),
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?)
        })?;

        let Some((uid, password, created_at)) = account else {
            return Ok(None);
        };
        let uid = UserId::new(&uid);

        let profile = match self.profile(&uid)? {
            Some(profile) => profile,
            None => {
                tracing::warn!("account {uid} has no profile, treating it as unapproved");
                UserProfile {
                    email: email.clone(),
                    uid,
                    is_approved: false,
                    created_at,
                    role: Default::default(),
                }
            }
        };

        Ok(Some((profile.into(), PasswordHash::new_unchecked(&password))))
    }

    fn find_by_id(&self, uid: &UserId) -> Result<Option<User>, Error> {
        Ok(self.profile(uid)?.map(User::from))
    }

    fn create_account(
        &self,
        email: &Email,
        password_hash: PasswordHash,
    ) -> Result<User, AuthError> {
        let profile = self.with_connection(|connection| {
            let transaction = connection.unchecked_transaction()?;

            let taken: Option<String> = transaction
                .query_row(
                    "SELECT uid FROM account WHERE email = ?1",
                    (email.as_ref(),),
                    |row| row.get(0),
                )
                .optional()?;
            if taken.is_some() {
                return Ok(None);
            }

            let account_count: i64 =
                transaction.query_row("SELECT COUNT(*) FROM account", (), |row| row.get(0))?;
            let profile = UserProfile::new(email.clone(), account_count == 0, true, now_millis());

            transaction.execute(
                "INSERT INTO account (uid, email, password, created_at) VALUES (?1, ?2, ?3, ?4)",
                (
                    profile.uid.as_str(),
                    email.as_ref(),
                    password_hash.as_ref(),
                    profile.created_at,
                ),
            )?;
            transaction.commit()?;

            Ok(Some(profile))
        })?;

        let profile = profile.ok_or(AuthError::EmailInUse)?;
        self.documents.set(
            USERS_COLLECTION,
            profile.uid.as_str(),
            &serde_json::to_value(&profile).map_err(Error::from)?,
        )?;

        Ok(profile.into())
    }

    fn list_users(&self) -> Result<Vec<User>, Error> {
        let mut profiles = self
            .documents
            .list(USERS_COLLECTION)?
            .into_iter()
            .filter_map(|document| {
                serde_json::from_value::<UserProfile>(document.data)
                    .inspect_err(|error| {
                        tracing::warn!("skipping malformed profile {}: {error}", document.id)
                    })
                    .ok()
            })
            .collect::<Vec<_>>();
        profiles.sort_by_key(|profile| profile.created_at);

        Ok(profiles.into_iter().map(User::from).collect())
    }

    fn approve(&self, uid: &UserId) -> Result<User, Error> {
        let mut fields = Map::new();
        fields.insert("isApproved".to_owned(), Value::Bool(true));
        self.documents
            .merge(USERS_COLLECTION, uid.as_str(), &fields)?;

        self.find_by_id(uid)?.ok_or(Error::NotFound)
    }

    fn delete_user(&self, uid: &UserId) -> Result<(), Error> {
        let rows_affected = self.with_connection(|connection| {
            Ok(connection.execute("DELETE FROM account WHERE uid = ?1", (uid.as_str(),))?)
        })?;
        let has_profile = self.profile(uid)?.is_some();

        if rows_affected == 0 && !has_profile {
            return Err(Error::NotFound);
        }

        let mut batch = WriteBatch::new();
        batch.delete(USERS_COLLECTION, uid.as_str());
        for collection in [categories_collection(uid), items_collection(uid)] {
            for document in self.documents.list(&collection)? {
                batch.delete(&collection, &document.id);
            }
        }

        self.documents.commit(batch)
    }
}
