//! Signed session tokens (HS256 JWT).

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::errors::TokenError;

/// 31 days.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(744 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Mints tokens with a process-wide signing key supplied at construction.
#[derive(Clone)]
pub struct TokenIssuer {
    sign_key: Vec<u8>,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer").field("sign_key", &"<redacted>").finish()
    }
}

impl TokenIssuer {
    pub fn new(sign_key: impl Into<Vec<u8>>) -> Self {
        Self { sign_key: sign_key.into() }
    }

    /// Issue a token for `subject_id` expiring `expires_after` from now.
    pub fn issue(&self, subject_id: &str, expires_after: Duration) -> Result<String, TokenError> {
        if self.sign_key.is_empty() {
            return Err(TokenError::Signing("signing key is empty".into()));
        }
        let lifetime = chrono::Duration::from_std(expires_after)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        let now = Utc::now();
        let exp = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| TokenError::Signing("expiry out of range".into()))?;

        let claims = Claims {
            sub: subject_id.to_string(),
            jti: subject_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(&self.sign_key))
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}
