//! Accounts, sessions and the pages for logging in, registering and logging out.
//!
//! Accounts live in an [AuthBackend]: [LocalAuth] keeps them in the local
//! key-value store and signs new users in straight away, [RemoteAuth] keeps
//! them in the database and holds new users back until an admin approves them.

mod backend;
mod cookie;
mod local;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register;
mod remote;
mod session;
mod token;
mod user;

pub use backend::{AuthBackend, UserProfile};
pub use cookie::{
    COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie,
};
pub use local::{LocalAuth, USERS_KEY};
pub use log_in::{REMEMBER_ME_COOKIE_DURATION, get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use redirect::{build_log_in_redirect_url, normalize_redirect_url};
pub use register::{get_register_page, register_user};
pub use remote::{RemoteAuth, USERS_COLLECTION, create_account_table};
pub use session::{AuthError, SessionManager, SessionState};
pub use user::{Email, Role, User, UserId};
