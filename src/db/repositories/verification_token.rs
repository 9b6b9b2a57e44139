use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::UserId;
use crate::entities::{prelude::*, verification_tokens};

/// How long a password reset token stays usable.
pub const PASSWORD_RESET_TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Consent,
    PasswordReset,
}

impl Purpose {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Consent => "consent",
            Self::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consent" => Ok(Self::Consent),
            "password_reset" => Ok(Self::PasswordReset),
            other => anyhow::bail!("Unknown verification token purpose: {other}"),
        }
    }
}

/// A single-use token sent to a user to confirm an action out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationToken {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
    pub purpose: Purpose,
    pub data: Option<serde_json::Value>,
}

impl VerificationToken {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.purpose {
            Purpose::Consent => false,
            Purpose::PasswordReset => {
                now >= self.created_at + Duration::hours(PASSWORD_RESET_TOKEN_LIFETIME_HOURS)
            }
        }
    }
}

impl TryFrom<verification_tokens::Model> for VerificationToken {
    type Error = anyhow::Error;

    fn try_from(model: verification_tokens::Model) -> Result<Self> {
        Ok(Self {
            purpose: model.purpose.parse()?,
            token: model.token,
            created_at: model.created_at,
            user_id: UserId::new(model.user_id),
            data: model.data,
        })
    }
}

pub struct VerificationTokenRepository {
    conn: DatabaseConnection,
}

impl VerificationTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user_id: UserId, purpose: Purpose) -> Result<VerificationToken> {
        let token = VerificationToken {
            token: generate_secret_token(),
            created_at: Utc::now(),
            user_id,
            purpose,
            data: None,
        };

        let active_model = verification_tokens::ActiveModel {
            token: Set(token.token.clone()),
            created_at: Set(token.created_at),
            user_id: Set(user_id.value()),
            purpose: Set(purpose.as_str().to_string()),
            data: Set(None),
        };

        VerificationTokens::insert(active_model)
            .exec_without_returning(&self.conn)
            .await
            .with_context(|| format!("Failed to create {purpose} verification token"))?;

        Ok(token)
    }

    pub async fn find(&self, token: &str, purpose: Purpose) -> Result<Option<VerificationToken>> {
        let model = VerificationTokens::find_by_id(token.to_string())
            .filter(verification_tokens::Column::Purpose.eq(purpose.as_str()))
            .one(&self.conn)
            .await
            .context("Failed to query verification token")?;

        model.map(VerificationToken::try_from).transpose()
    }

    pub async fn delete(&self, token: &str) -> Result<bool> {
        let result = VerificationTokens::delete_by_id(token.to_string())
            .exec(&self.conn)
            .await
            .context("Failed to delete verification token")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_for_user(&self, user_id: UserId) -> Result<u64> {
        let result = VerificationTokens::delete_many()
            .filter(verification_tokens::Column::UserId.eq(user_id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to delete verification tokens for user")?;

        Ok(result.rows_affected)
    }
}

/// Generate a random token (64 character hex string)
#[must_use]
pub fn generate_secret_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(purpose: Purpose, created_at: DateTime<Utc>) -> VerificationToken {
        VerificationToken {
            token: generate_secret_token(),
            created_at,
            user_id: UserId::generate(),
            purpose,
            data: None,
        }
    }

    #[test]
    fn secret_tokens_are_hex_and_distinct() {
        let a = generate_secret_token();
        let b = generate_secret_token();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn password_reset_tokens_expire_after_a_day() {
        let now = Utc::now();

        assert!(!token(Purpose::PasswordReset, now - Duration::hours(23)).is_expired(now));
        assert!(token(Purpose::PasswordReset, now - Duration::hours(24)).is_expired(now));
    }

    #[test]
    fn consent_tokens_never_expire() {
        let now = Utc::now();
        assert!(!token(Purpose::Consent, now - Duration::days(365)).is_expired(now));
    }

    #[test]
    fn purpose_parses_its_own_rendering() {
        for purpose in [Purpose::Consent, Purpose::PasswordReset] {
            assert_eq!(purpose.as_str().parse::<Purpose>().ok(), Some(purpose));
        }
        assert!("bogus".parse::<Purpose>().is_err());
    }
}
