use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Lowercase hex of the password digest; never the plaintext.
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Candidate record handed to `UserStore::store`. The store assigns the id
/// and timestamps; callers leave `id` unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub id: Option<String>,
    pub username: String,
    pub email: String,
    pub password_digest: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "repeatPassword")]
    pub repeat_password: String,
}

/// Issued session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenOutput {
    pub token: String,
}
