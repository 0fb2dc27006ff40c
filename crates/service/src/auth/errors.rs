use std::fmt;

use thiserror::Error;

use crate::context::Cancelled;

/// Business errors for auth workflows.
///
/// Every lower-level failure is folded into one of these kinds before it
/// leaves `AuthService`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown email and wrong password share this variant on purpose.
    #[error("email and the password don't match")]
    InvalidCredentials,
    #[error("email is already taken")]
    EmailTaken,
    #[error("username is already taken")]
    UsernameTaken,
    #[error("passwords don't match")]
    PasswordMismatch,
    #[error("operation timed out or was cancelled")]
    Timeout,
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials => 1004,
            AuthError::EmailTaken => 1002,
            AuthError::UsernameTaken => 1003,
            AuthError::PasswordMismatch => 1001,
            AuthError::Timeout => 1300,
            AuthError::Internal(_) => 1200,
        }
    }

    /// Validation-style failures the caller may correct and resubmit.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::EmailTaken
                | AuthError::UsernameTaken
                | AuthError::PasswordMismatch
        )
    }
}

/// Field that collided on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Username => f.write_str("username"),
            UniqueField::Email => f.write_str("email"),
        }
    }
}

/// Errors raised at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{field} is not unique, it already exists")]
    UniquenessViolation { field: UniqueField },
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors raised while minting a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("error while signing the token: {0}")]
    Signing(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniquenessViolation { field: UniqueField::Email } => AuthError::EmailTaken,
            StoreError::UniquenessViolation { field: UniqueField::Username } => AuthError::UsernameTaken,
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        AuthError::Internal(e.to_string())
    }
}

impl From<Cancelled> for AuthError {
    fn from(_: Cancelled) -> Self {
        AuthError::Timeout
    }
}
