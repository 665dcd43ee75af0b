//! Credential hashing for seeded accounts.
//!
//! Seeding hashes each password tier once per run and shares the digest
//! across every account of that tier, so the cost parameters here only
//! matter a handful of times per run.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::prelude::*;
use rand::RngCore;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    InvalidParams(String),
    HashingFailed(String),
}

impl Display for HashError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParams(details) => write!(f, "invalid hashing parameters: {details}"),
            Self::HashingFailed(details) => write!(f, "hashing failed: {details}"),
        }
    }
}

impl Error for HashError {}

/// Turns a plaintext password into an opaque digest string.
pub trait CredentialHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError>;
}

/// Argon2id hasher producing `$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
    pub hash_length: usize,
    pub salt_length: usize,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            memory_cost: 15360,
            time_cost: 3,
            parallelism: 2,
            hash_length: 32,
            salt_length: 16,
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let params = Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(self.hash_length),
        )
        .map_err(|err| HashError::InvalidParams(err.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut salt = vec![0u8; self.salt_length];
        rand::thread_rng().fill_bytes(&mut salt);

        let mut output = vec![0u8; self.hash_length];
        argon2
            .hash_password_into(plaintext.as_bytes(), &salt, &mut output)
            .map_err(|err| HashError::HashingFailed(err.to_string()))?;

        Ok(format!(
            "$argon2id$v=19$m={},t={},p={}${}${}",
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            BASE64_STANDARD.encode(&salt),
            BASE64_STANDARD.encode(&output)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{Argon2Hasher, CredentialHasher, HashError};

    fn cheap_hasher() -> Argon2Hasher {
        Argon2Hasher {
            memory_cost: 64,
            time_cost: 1,
            parallelism: 1,
            ..Argon2Hasher::default()
        }
    }

    #[test]
    fn digest_is_phc_formatted_and_salted() {
        let hasher = cheap_hasher();
        let first = hasher.hash("admin123").unwrap();
        let second = hasher.hash("admin123").unwrap();

        assert!(first.starts_with("$argon2id$v=19$m=64,t=1,p=1$"));
        assert_eq!(first.split('$').count(), 6);
        assert_ne!(first, second, "salt must differ between calls");
    }

    #[test]
    fn invalid_params_are_reported() {
        let hasher = Argon2Hasher {
            time_cost: 0,
            ..cheap_hasher()
        };
        assert!(matches!(
            hasher.hash("user123"),
            Err(HashError::InvalidParams(_))
        ));
    }
}
