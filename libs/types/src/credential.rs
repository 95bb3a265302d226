//! Credential records
//!
//! A `UserCredential` is one logged-in user as written by the token
//! acquisition step and consumed by every batch job and the swarm. A
//! `SeedUser` is one row of the initial seed file fed into login.

use serde::{Deserialize, Serialize};

/// Column order of the credential file (`user_email:user_id:access_token:refresh_token`)
pub const CREDENTIAL_COLUMNS: [&str; 4] = ["user_email", "user_id", "access_token", "refresh_token"];

/// Column order of the seed file (`name:email:password`)
pub const SEED_COLUMNS: [&str; 3] = ["name", "email", "password"];

/// One authenticated user. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredential {
    pub user_email: String,
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl UserCredential {
    /// Build a credential from raw column values.
    ///
    /// Values are trimmed. Returns `None` unless id, email and access token are
    /// all non-empty; the refresh token may be empty.
    pub fn from_fields(
        user_id: Option<&str>,
        user_email: Option<&str>,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Option<Self> {
        let user_id = user_id.unwrap_or("").trim();
        let user_email = user_email.unwrap_or("").trim();
        let access_token = access_token.unwrap_or("").trim();
        let refresh_token = refresh_token.unwrap_or("").trim();

        if user_id.is_empty() || user_email.is_empty() || access_token.is_empty() {
            return None;
        }

        Some(Self {
            user_email: user_email.to_string(),
            user_id: user_id.to_string(),
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
        })
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// One row of the seed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    /// Stored password column (base64 SHA-512 digest for direct DB import)
    pub password: String,
}
