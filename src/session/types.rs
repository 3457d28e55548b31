//! Session record types.

use serde::{Deserialize, Serialize};

/// The WorkOS user fields we carry in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// WorkOS user ID (e.g. "user_01H...")
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

/// Administrative actor acting on behalf of the session's user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impersonator {
    pub email: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Decrypted session state. Lives only in server memory for the duration of
/// a request; the client stores it as a sealed cookie blob.
///
/// The refresh token must never leave this struct except inside a sealed
/// blob or an outbound exchange call to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
    #[serde(default)]
    pub impersonator: Option<Impersonator>,
}
