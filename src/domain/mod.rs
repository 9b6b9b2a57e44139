//! Domain types for authentication with strong typing.
//!
//! This module provides type-safe wrappers and domain primitives for the
//! authentication subsystem. It follows the Newtype pattern to prevent ID mixing
//! and keeps plaintext secrets behind an explicit reveal.

pub mod events;
pub mod log;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a user account.
///
/// # Examples
///
/// ```rust
/// use byceps_authn::domain::UserId;
/// use uuid::Uuid;
///
/// let raw = Uuid::new_v4();
/// let id = UserId::new(raw);
/// assert_eq!(id.value(), raw);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a fresh random ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn value(&self) -> Uuid {
        self.0
    }

    /// The all-zero ID reserved for anonymous users.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<UserId> for Uuid {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Unique identifier for an identity tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(Uuid);

impl TagId {
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TagId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Identifier of a brand (the organisation a site belongs to).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandId(String);

impl BrandId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BrandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(String);

impl SiteId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A site users log in to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub id: SiteId,
    pub title: String,
    pub brand_id: BrandId,
}

/// A user account as seen by the authentication core.
///
/// Only identity and state flags are read here; everything else belongs to
/// user management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub created_at: DateTime<Utc>,
    pub screen_name: String,
    pub email_address: Option<String>,
    pub initialized: bool,
    pub suspended: bool,
    pub deleted: bool,
    pub locale: Option<String>,
}

impl User {
    /// Returns true if the account may authenticate at all.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.initialized && !self.suspended && !self.deleted
    }
}

/// A plaintext password.
///
/// The value cannot be printed; `Debug` output is redacted and there is no
/// `Display`. Only the hasher reveals it.
#[derive(Debug)]
pub struct Password(SecretString);

impl Password {
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(SecretString::from(password.into()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Copies the secret into a new wrapper so it can be moved to a blocking task.
    pub(crate) fn duplicate(&self) -> Self {
        Self::new(self.0.expose_secret())
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self::new(password)
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self::new(password)
    }
}

/// A stored password hash in PHC string format.
///
/// Treated as a secret too: it is never logged.
#[derive(Debug)]
pub struct PasswordHash(SecretString);

impl PasswordHash {
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(SecretString::from(hash.into()))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for PasswordHash {
    fn clone(&self) -> Self {
        Self::new(self.0.expose_secret())
    }
}

/// The user associated with the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub screen_name: Option<String>,
    pub initialized: bool,
    pub suspended: bool,
    pub deleted: bool,
    pub locale: Option<String>,
    pub authenticated: bool,
    pub permissions: BTreeSet<String>,
}

impl CurrentUser {
    /// Returns an anonymous current user.
    #[must_use]
    pub const fn anonymous(locale: Option<String>) -> Self {
        Self {
            id: UserId::anonymous(),
            screen_name: None,
            initialized: true,
            suspended: false,
            deleted: false,
            locale,
            authenticated: false,
            permissions: BTreeSet::new(),
        }
    }

    /// Returns an authenticated current user.
    ///
    /// An authenticated user is always initialized, never suspended and never
    /// deleted, regardless of what the passed record says.
    #[must_use]
    pub fn authenticated(user: &User, locale: Option<String>, permissions: BTreeSet<String>) -> Self {
        Self {
            id: user.id,
            screen_name: Some(user.screen_name.clone()),
            initialized: true,
            suspended: false,
            deleted: false,
            locale,
            authenticated: true,
            permissions,
        }
    }

    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::generate(),
            created_at: Utc::now(),
            screen_name: "Alice".to_string(),
            email_address: Some("alice@example.com".to_string()),
            initialized: true,
            suspended: false,
            deleted: false,
            locale: None,
        }
    }

    #[test]
    fn password_debug_is_redacted() {
        let password = Password::new("hunter2");
        let rendered = format!("{password:?}");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn password_hash_debug_is_redacted() {
        let hash = PasswordHash::new("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA");
        let rendered = format!("{hash:?}");
        assert!(!rendered.contains("argon2id"));
    }

    #[test]
    fn anonymous_user_id_is_nil() {
        let current = CurrentUser::anonymous(Some("de".to_string()));
        assert!(current.id.is_anonymous());
        assert!(!current.authenticated);
        assert!(current.permissions.is_empty());
    }

    #[test]
    fn authenticated_user_is_never_suspended() {
        let mut user = sample_user();
        user.suspended = true;

        let current = CurrentUser::authenticated(
            &user,
            None,
            BTreeSet::from(["admin.access".to_string()]),
        );

        assert!(current.authenticated);
        assert!(!current.suspended);
        assert!(current.has_permission("admin.access"));
        assert_eq!(current.screen_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn user_activity_depends_on_all_flags() {
        let mut user = sample_user();
        assert!(user.is_active());

        user.initialized = false;
        assert!(!user.is_active());

        user.initialized = true;
        user.deleted = true;
        assert!(!user.is_active());
    }
}
