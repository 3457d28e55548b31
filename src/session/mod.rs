//! Sealed-cookie session management.
//!
//! Session state lives entirely in the client's cookie: an AES-GCM-sealed
//! blob holding the access token, the single-use refresh token, and the
//! user record. The guard middleware unseals it per request, verifies the
//! access token against the provider's key set, and refreshes expired
//! tokens transparently.

mod cookie;
mod extractors;
mod guard;
mod seal;
mod types;

pub use cookie::{SESSION_COOKIE_NAME, clear_session_cookie, get_cookie, session_cookie};
pub use extractors::CurrentUser;
pub use guard::{
    Action, LOGIN_PATH, PROTECTED_PREFIX, SessionState, classify, decide, session_guard,
};
pub use seal::{MIN_COOKIE_PASSWORD_LENGTH, SealError, Sealer};
pub use types::{Impersonator, Session, User};
