/// Single-use security tokens: password reset and email verification.
///
/// The opaque token handed to the user is random; only its SHA-256 digest is
/// stored, so a database leak does not leak usable tokens. Tokens expire and
/// are consumed exactly once (`used_at`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE security_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id),
///     kind TEXT NOT NULL, -- 'password_reset' | 'email_verification'
///     token_digest CHAR(64) NOT NULL,
///     expires_at TIMESTAMPTZ NOT NULL,
///     used_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a security token is good for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SecurityTokenKind {
    PasswordReset,
    EmailVerification,
}

impl SecurityTokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityTokenKind::PasswordReset => "password_reset",
            SecurityTokenKind::EmailVerification => "email_verification",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SecurityToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: SecurityTokenKind,

    /// Hex-encoded SHA-256 of the opaque token; the plaintext is never stored
    pub token_digest: String,

    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SecurityToken {
    /// A token is redeemable while unexpired and unused.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && self.expires_at > now
    }
}

/// Generates a fresh opaque token: the plaintext handed to the user and the
/// digest that gets stored.
pub fn generate_opaque_token() -> (String, String) {
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let plaintext = hex::encode(bytes);
    let digest = digest_token(&plaintext);
    (plaintext, digest)
}

/// SHA-256 hex digest of an opaque token, as stored in `token_digest`.
pub fn digest_token(token: &str) -> String {
    use sha2::{Digest, Sha256};

    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_in: Duration, used: bool) -> SecurityToken {
        let now = Utc::now();
        SecurityToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: SecurityTokenKind::PasswordReset,
            token_digest: "0".repeat(64),
            expires_at: now + expires_in,
            used_at: used.then_some(now),
            created_at: now,
        }
    }

    #[test]
    fn test_redeemable() {
        let now = Utc::now();
        assert!(token(Duration::hours(1), false).is_redeemable(now));
        assert!(!token(Duration::hours(-1), false).is_redeemable(now));
        assert!(!token(Duration::hours(1), true).is_redeemable(now));
    }

    #[test]
    fn test_opaque_token_digest_round_trip() {
        let (plaintext, digest) = generate_opaque_token();
        assert_eq!(plaintext.len(), 64);
        assert_eq!(digest.len(), 64);
        assert_ne!(plaintext, digest);
        assert_eq!(digest_token(&plaintext), digest);
    }

    #[test]
    fn test_opaque_tokens_are_unique() {
        let (a, _) = generate_opaque_token();
        let (b, _) = generate_opaque_token();
        assert_ne!(a, b);
    }
}
