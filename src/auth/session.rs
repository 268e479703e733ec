//! The session state machine: who is signed in and whether they may be.

use std::sync::Arc;

use crate::{
    Error,
    auth::{AuthBackend, Email, PasswordHash, User, UserId, ValidatedPassword},
};

/// Why a log-in or registration did not produce a signed in session.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthError {
    /// The e-mail is unknown or the password does not match.
    #[error("invalid e-mail or password")]
    InvalidCredentials,

    /// Registration used an e-mail that already has an account.
    #[error("an account with this e-mail already exists")]
    EmailInUse,

    /// The account exists but an admin has not approved it yet.
    #[error("the account is waiting for approval")]
    PendingApproval,

    /// Storage or hashing failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<Error> for AuthError {
    fn from(error: Error) -> Self {
        AuthError::Internal(error.to_string())
    }
}

/// Where a session is in its life cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// The session has not been restored yet.
    #[default]
    Loading,
    /// Nobody is signed in.
    Anonymous,
    /// The credentials were correct but the account still needs approval.
    /// The user is not signed in.
    PendingApproval(User),
    /// The user is signed in.
    Approved(User),
}

/// Drives log-in, registration and log-out against an [AuthBackend].
pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    state: SessionState,
    password_cost: u32,
}

impl SessionManager {
    /// Create a manager in the [SessionState::Loading] state.
    ///
    /// `password_cost` is the bcrypt cost for new accounts.
    pub fn new(backend: Arc<dyn AuthBackend>, password_cost: u32) -> Self {
        Self {
            backend,
            state: SessionState::Loading,
            password_cost,
        }
    }

    /// The current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The signed in user, if there is one.
    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Approved(user) => Some(user),
            _ => None,
        }
    }

    fn admit(&mut self, user: User) -> Result<&User, AuthError> {
        if self.backend.requires_approval() && !user.can_sign_in() {
            self.state = SessionState::PendingApproval(user);
            return Err(AuthError::PendingApproval);
        }

        self.state = SessionState::Approved(user);

        self.user()
            .ok_or_else(|| AuthError::Internal("session was not approved".to_owned()))
    }

    /// Re-derive the session from the user ID stored in the session cookie.
    ///
    /// A missing or unknown user leaves the session anonymous. An account that
    /// lost its approval ends up in [SessionState::PendingApproval].
    pub fn restore(&mut self, user_id: Option<&UserId>) -> Result<&SessionState, Error> {
        let user = match user_id {
            Some(user_id) => self.backend.find_by_id(user_id)?,
            None => None,
        };

        match user {
            Some(user) => {
                let _ = self.admit(user);
            }
            None => self.state = SessionState::Anonymous,
        }

        Ok(&self.state)
    }

    /// Sign in with an e-mail and password.
    ///
    /// # Errors
    ///
    /// - [AuthError::InvalidCredentials] if the e-mail is unknown or the
    ///   password is wrong. The session becomes anonymous.
    /// - [AuthError::PendingApproval] if the account needs approval. The
    ///   session becomes [SessionState::PendingApproval].
    pub fn login(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        self.state = SessionState::Anonymous;

        let Ok(email) = Email::new(email) else {
            return Err(AuthError::InvalidCredentials);
        };
        let Some((user, password_hash)) = self.backend.find_by_email(&email)? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !password_hash.verify(password)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.admit(user)
    }

    /// Create an account and sign in to it if the backend allows it.
    ///
    /// # Errors
    ///
    /// - [AuthError::EmailInUse] if the e-mail already has an account.
    /// - [AuthError::PendingApproval] if the new account needs approval.
    pub fn register(
        &mut self,
        email: Email,
        password: ValidatedPassword,
    ) -> Result<&User, AuthError> {
        self.state = SessionState::Anonymous;

        let password_hash = PasswordHash::new(password, self.password_cost)?;
        let user = self.backend.create_account(&email, password_hash)?;
        tracing::info!("created account {} for {}", user.uid, user.email);

        self.admit(user)
    }

    /// Sign out.
    pub fn logout(&mut self) {
        self.state = SessionState::Anonymous;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use tempfile::{TempDir, tempdir};

    use crate::{
        auth::{
            AuthBackend, Email, LocalAuth, RemoteAuth, Role, UserId, ValidatedPassword,
        },
        db::initialize,
        storage::{FileKeyValueStore, SqliteDocumentStore},
    };

    use super::{AuthError, SessionManager, SessionState};

    const PASSWORD: &str = "rose petal lipstick";
    const TEST_COST: u32 = 4;

    fn remote_backend() -> Arc<dyn AuthBackend> {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));
        let documents = Arc::new(SqliteDocumentStore::new(connection.clone()));

        Arc::new(RemoteAuth::new(connection, documents))
    }

    fn local_backend() -> (TempDir, Arc<dyn AuthBackend>) {
        let dir = tempdir().unwrap();
        let key_values = Arc::new(FileKeyValueStore::open(dir.path()).unwrap());

        (dir, Arc::new(LocalAuth::new(key_values)))
    }

    fn register(backend: &Arc<dyn AuthBackend>, email: &str) -> Result<SessionState, AuthError> {
        let mut session = SessionManager::new(backend.clone(), TEST_COST);
        let result = session
            .register(
                Email::new_unchecked(email),
                ValidatedPassword::new_unchecked(PASSWORD),
            )
            .map(|_| ());

        result.map(|_| session.state().clone())
    }

    #[test]
    fn starts_loading() {
        let (_dir, backend) = local_backend();

        let session = SessionManager::new(backend, TEST_COST);

        assert_eq!(session.state(), &SessionState::Loading);
        assert_eq!(session.user(), None);
    }

    #[test]
    fn demo_registration_signs_in() {
        let (_dir, backend) = local_backend();
        register(&backend, "admin@example.com").unwrap();

        let state = register(&backend, "ana@example.com").unwrap();

        assert!(matches!(state, SessionState::Approved(user) if user.role == Role::Member));
    }

    #[test]
    fn remote_registration_waits_for_approval() {
        let backend = remote_backend();
        register(&backend, "admin@example.com").unwrap();
        let mut session = SessionManager::new(backend, TEST_COST);

        let result = session.register(
            Email::new_unchecked("ana@example.com"),
            ValidatedPassword::new_unchecked(PASSWORD),
        );

        assert_eq!(result, Err(AuthError::PendingApproval));
        assert!(matches!(session.state(), SessionState::PendingApproval(_)));
        assert_eq!(session.user(), None);
    }

    #[test]
    fn first_remote_account_is_signed_in_admin() {
        let backend = remote_backend();

        let state = register(&backend, "admin@example.com").unwrap();

        assert!(matches!(state, SessionState::Approved(user) if user.is_admin()));
    }

    #[test]
    fn registration_with_taken_email_fails() {
        let (_dir, backend) = local_backend();
        register(&backend, "ana@example.com").unwrap();

        assert_eq!(
            register(&backend, "ana@example.com"),
            Err(AuthError::EmailInUse)
        );
    }

    #[test]
    fn login_with_unapproved_remote_account_is_pending() {
        let backend = remote_backend();
        register(&backend, "admin@example.com").unwrap();
        let _ = register(&backend, "ana@example.com");
        let mut session = SessionManager::new(backend, TEST_COST);

        let result = session.login("ana@example.com", PASSWORD).map(|_| ());

        assert_eq!(result, Err(AuthError::PendingApproval));
        assert!(matches!(session.state(), SessionState::PendingApproval(_)));
        assert_eq!(session.user(), None);
    }

    #[test]
    fn login_after_approval_succeeds() {
        let backend = remote_backend();
        register(&backend, "admin@example.com").unwrap();
        let _ = register(&backend, "ana@example.com");
        let (user, _) = backend
            .find_by_email(&Email::new_unchecked("ana@example.com"))
            .unwrap()
            .unwrap();
        backend.approve(&user.uid).unwrap();
        let mut session = SessionManager::new(backend, TEST_COST);

        let signed_in = session.login("Ana@Example.com", PASSWORD).unwrap().clone();

        assert_eq!(signed_in.uid, user.uid);
        assert_eq!(session.user(), Some(&signed_in));
    }

    #[test]
    fn login_with_wrong_password_or_unknown_email_fails() {
        let (_dir, backend) = local_backend();
        register(&backend, "ana@example.com").unwrap();
        let mut session = SessionManager::new(backend, TEST_COST);

        assert_eq!(
            session.login("ana@example.com", "wrong").map(|_| ()),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            session.login("bia@example.com", PASSWORD).map(|_| ()),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            session.login("not an email", PASSWORD).map(|_| ()),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(session.state(), &SessionState::Anonymous);
    }

    #[test]
    fn restore_follows_stored_user() {
        let backend = remote_backend();
        register(&backend, "admin@example.com").unwrap();
        let _ = register(&backend, "ana@example.com");
        let admin = backend
            .find_by_email(&Email::new_unchecked("admin@example.com"))
            .unwrap()
            .unwrap()
            .0;
        let member = backend
            .find_by_email(&Email::new_unchecked("ana@example.com"))
            .unwrap()
            .unwrap()
            .0;
        let mut session = SessionManager::new(backend, TEST_COST);

        assert_eq!(session.restore(None).unwrap(), &SessionState::Anonymous);
        assert_eq!(
            session.restore(Some(&UserId::new("gone"))).unwrap(),
            &SessionState::Anonymous
        );
        assert_eq!(
            session.restore(Some(&member.uid)).unwrap(),
            &SessionState::PendingApproval(member)
        );
        assert_eq!(
            session.restore(Some(&admin.uid)).unwrap(),
            &SessionState::Approved(admin)
        );
    }

    #[test]
    fn logout_signs_out() {
        let (_dir, backend) = local_backend();
        let mut session = SessionManager::new(backend.clone(), TEST_COST);
        session
            .register(
                Email::new_unchecked("ana@example.com"),
                ValidatedPassword::new_unchecked(PASSWORD),
            )
            .unwrap();

        session.logout();

        assert_eq!(session.state(), &SessionState::Anonymous);
    }
}
