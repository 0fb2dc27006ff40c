//! One-way password digests and constant-time verification.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Digest algorithm used for stored passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashMethod {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashMethod {
    /// Output length in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            HashMethod::Sha256 => 32,
            HashMethod::Sha384 => 48,
            HashMethod::Sha512 => 64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashMethod::Sha256 => "sha256",
            HashMethod::Sha384 => "sha384",
            HashMethod::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown hash method: {0}")]
pub struct UnknownHashMethod(pub String);

impl FromStr for HashMethod {
    type Err = UnknownHashMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(HashMethod::Sha256),
            "sha384" => Ok(HashMethod::Sha384),
            "sha512" => Ok(HashMethod::Sha512),
            _ => Err(UnknownHashMethod(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialHasher {
    method: HashMethod,
}

impl CredentialHasher {
    pub fn new(method: HashMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> HashMethod {
        self.method
    }

    pub fn hash(&self, secret: &[u8]) -> Vec<u8> {
        match self.method {
            HashMethod::Sha256 => Sha256::digest(secret).to_vec(),
            HashMethod::Sha384 => Sha384::digest(secret).to_vec(),
            HashMethod::Sha512 => Sha512::digest(secret).to_vec(),
        }
    }

    /// Lowercase hex form, as kept in `User::password_digest`.
    pub fn hash_hex(&self, secret: &[u8]) -> String {
        hex::encode(self.hash(secret))
    }

    /// Hash `secret` and compare with `expected` in constant time.
    pub fn verify(&self, secret: &[u8], expected: &[u8]) -> bool {
        constant_time_eq(&self.hash(secret), expected)
    }
}

/// Equality whose running time does not depend on where the inputs differ.
/// Slices of different length compare unequal.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
