//! Password hashing with transparent algorithm migration.
//!
//! The configured method is a single string `"<algorithm>:<memory_kib>:<iterations>:<parallelism>"`.
//! Stored hashes are PHC strings, so a hash is current exactly when its
//! algorithm and parameter prefix matches the one the configured method
//! produces.

use anyhow::{Context, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use std::fmt;
use std::str::FromStr;

use crate::domain::{Password, PasswordHash};

pub const DEFAULT_HASH_METHOD: &str = "argon2id:8192:3:1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Argon2id,
    Argon2i,
    Argon2d,
}

impl HashAlgorithm {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Argon2id => "argon2id",
            Self::Argon2i => "argon2i",
            Self::Argon2d => "argon2d",
        }
    }

    const fn to_argon2(self) -> Algorithm {
        match self {
            Self::Argon2id => Algorithm::Argon2id,
            Self::Argon2i => Algorithm::Argon2i,
            Self::Argon2d => Algorithm::Argon2d,
        }
    }
}

/// Parsed hashing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashMethod {
    pub algorithm: HashAlgorithm,
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl HashMethod {
    fn params(&self) -> Result<Params> {
        Params::new(self.memory_cost_kib, self.time_cost, self.parallelism, None)
            .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))
    }

    /// Leading part of every PHC string this method produces, up to and
    /// including the separator before the salt.
    #[must_use]
    pub fn phc_prefix(&self) -> String {
        format!(
            "${}$v={}$m={},t={},p={}$",
            self.algorithm.as_str(),
            Version::V0x13 as u32,
            self.memory_cost_kib,
            self.time_cost,
            self.parallelism
        )
    }
}

impl Default for HashMethod {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Argon2id,
            memory_cost_kib: 8192,
            time_cost: 3,
            parallelism: 1,
        }
    }
}

impl FromStr for HashMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let [algorithm, memory, time, parallelism] = parts.as_slice() else {
            anyhow::bail!(
                "Invalid password hash method '{s}', expected <algorithm>:<memory_kib>:<iterations>:<parallelism>"
            );
        };

        let algorithm = match algorithm.to_ascii_lowercase().as_str() {
            "argon2id" => HashAlgorithm::Argon2id,
            "argon2i" => HashAlgorithm::Argon2i,
            "argon2d" => HashAlgorithm::Argon2d,
            other => anyhow::bail!("Unsupported password hash algorithm: {other}"),
        };

        let method = Self {
            algorithm,
            memory_cost_kib: memory
                .parse()
                .with_context(|| format!("Invalid memory cost in '{s}'"))?,
            time_cost: time
                .parse()
                .with_context(|| format!("Invalid time cost in '{s}'"))?,
            parallelism: parallelism
                .parse()
                .with_context(|| format!("Invalid parallelism in '{s}'"))?,
        };

        // Reject combinations Argon2 itself would refuse.
        method.params()?;

        Ok(method)
    }
}

impl fmt::Display for HashMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.algorithm.as_str(),
            self.memory_cost_kib,
            self.time_cost,
            self.parallelism
        )
    }
}

/// Creates, checks and classifies password hashes for one configured method.
///
/// All operations are CPU-bound and blocking. Async callers should run them
/// through `tokio::task::spawn_blocking`.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    method: HashMethod,
}

impl PasswordHasher {
    #[must_use]
    pub const fn new(method: HashMethod) -> Self {
        Self { method }
    }

    #[must_use]
    pub const fn method(&self) -> HashMethod {
        self.method
    }

    pub fn create_password_hash(&self, password: &Password) -> Result<PasswordHash> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(
            self.method.algorithm.to_argon2(),
            Version::V0x13,
            self.method.params()?,
        );

        let hash = argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

        Ok(PasswordHash::new(hash.to_string()))
    }

    /// Returns false for a missing hash and for hashes this hasher cannot parse.
    #[must_use]
    pub fn check_password_hash(&self, hash: Option<&PasswordHash>, password: &Password) -> bool {
        let Some(hash) = hash else {
            return false;
        };

        let Ok(parsed) = PhcString::new(hash.expose()) else {
            return false;
        };

        // Parameters come from the stored hash, not from the configured method.
        Argon2::default()
            .verify_password(password.expose().as_bytes(), &parsed)
            .is_ok()
    }

    /// True if the hash is an Argon2 PHC string this hasher can verify.
    #[must_use]
    pub fn is_recognized(&self, hash: &PasswordHash) -> bool {
        PhcString::new(hash.expose()).is_ok_and(|phc| {
            matches!(phc.algorithm.as_str(), "argon2id" | "argon2i" | "argon2d")
        })
    }

    #[must_use]
    pub fn is_password_hash_current(&self, hash: &PasswordHash) -> bool {
        hash.expose().starts_with(&self.method.phc_prefix())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(HashMethod::default())
    }
}
