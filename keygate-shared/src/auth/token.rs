/// Session token issuance and verification
///
/// Self-contained signed tokens (HS256) carrying the caller's identity and a
/// snapshot of their permission names. Embedding permissions avoids a
/// database round-trip per request at the cost of staleness; the pipeline
/// re-issues the token on every authenticated response, so permission
/// changes propagate on the caller's next request, not mid-request.
///
/// # Claims
///
/// - `sub`: user ID (the authenticated identity)
/// - `iss`: always "keygate"
/// - `iat` / `nbf` / `exp`: issuance, not-before, expiry (Unix timestamps)
/// - `permissions`: snapshot of granted permission names (may be empty)
///
/// Default time-to-live is 12 hours, overridable via `jwt.valid_timespan`
/// configuration.
///
/// # Example
///
/// ```
/// use keygate_shared::auth::token::{issue_token, verify_token, Claims};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let claims = Claims::new(Uuid::new_v4(), vec!["ViewUsers".into()], Duration::hours(12));
/// let token = issue_token(&claims, secret)?;
///
/// let verified = verify_token(&token, secret)?;
/// assert_eq!(verified.sub, claims.sub);
/// assert_eq!(verified.permissions, vec!["ViewUsers".to_string()]);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token issuer claim value.
const ISSUER: &str = "keygate";

/// Default session lifetime when configuration does not override it.
pub const DEFAULT_VALID_TIMESPAN_HOURS: i64 = 12;

/// Error type for token operations.
///
/// Verification fails closed: any structural, signature or expiry problem is
/// an authentication failure; there is no partial trust.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign/encode a token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature, structure, issuer or nbf problem
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Decoded session token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user's ID
    pub sub: Uuid,

    /// Issuer, always "keygate"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Snapshot of the caller's granted permission names at issuance time.
    ///
    /// Optional on the wire; absent means no permissions.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Claims {
    /// Creates claims expiring `valid_for` from now.
    pub fn new(user_id: Uuid, permissions: Vec<String>, valid_for: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + valid_for).timestamp(),
            permissions,
        }
    }

    /// Fresh claims for the same identity with an updated permission
    /// snapshot and a renewed expiry (sliding expiration).
    pub fn refreshed(&self, permissions: Vec<String>, valid_for: Duration) -> Self {
        Self::new(self.sub, permissions, valid_for)
    }

    /// Checks whether the embedded permission snapshot contains `name`.
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p == name)
    }
}

/// Signs claims into a compact token string (HS256).
///
/// # Errors
///
/// Returns `TokenError::CreateError` if encoding fails.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies a token's signature, expiry, not-before and issuer, returning
/// the decoded claims.
///
/// # Errors
///
/// - `TokenError::Expired` past `exp`
/// - `TokenError::Invalid` for every other problem (bad signature, wrong
///   issuer, malformed structure, premature use)
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_issue_and_verify() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(
            user_id,
            vec!["ViewUsers".to_string(), "ViewRoles".to_string()],
            Duration::hours(12),
        );

        let token = issue_token(&claims, SECRET).expect("Should issue token");
        let verified = verify_token(&token, SECRET).expect("Should verify token");

        assert_eq!(verified.sub, user_id);
        assert_eq!(verified.iss, "keygate");
        assert_eq!(
            verified.permissions,
            vec!["ViewUsers".to_string(), "ViewRoles".to_string()]
        );
    }

    #[test]
    fn test_verify_with_wrong_secret_fails() {
        let claims = Claims::new(Uuid::new_v4(), vec![], Duration::hours(1));
        let token = issue_token(&claims, SECRET).unwrap();

        assert!(verify_token(&token, "some-other-secret-of-decent-size").is_err());
    }

    #[test]
    fn test_verify_expired_token_fails() {
        let claims = Claims::new(Uuid::new_v4(), vec![], Duration::seconds(-3600));
        let token = issue_token(&claims, SECRET).unwrap();

        let result = verify_token(&token, SECRET);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_verify_garbage_fails_closed() {
        assert!(verify_token("", SECRET).is_err());
        assert!(verify_token("not.a.token", SECRET).is_err());
        assert!(verify_token("eyJhbGciOiJIUzI1NiJ9.e30.sig", SECRET).is_err());
    }

    #[test]
    fn test_missing_permissions_claim_defaults_empty() {
        // A token minted elsewhere without the permissions claim must decode
        // to an empty snapshot, not an error.
        #[derive(Serialize)]
        struct Bare {
            sub: Uuid,
            iss: String,
            iat: i64,
            nbf: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let bare = Bare {
            sub: Uuid::new_v4(),
            iss: "keygate".to_string(),
            iat: now,
            nbf: now,
            exp: now + 3600,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &bare,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let claims = verify_token(&token, SECRET).expect("Should verify");
        assert!(claims.permissions.is_empty());
    }

    #[test]
    fn test_refreshed_keeps_identity_and_renews_expiry() {
        let claims = Claims::new(Uuid::new_v4(), vec!["A".to_string()], Duration::hours(1));
        let refreshed = claims.refreshed(vec!["A".to_string(), "B".to_string()], Duration::hours(12));

        assert_eq!(refreshed.sub, claims.sub);
        assert!(refreshed.exp > claims.exp);
        assert!(refreshed.has_permission("B"));
    }

    #[test]
    fn test_has_permission() {
        let claims = Claims::new(Uuid::new_v4(), vec!["ViewRoles".to_string()], Duration::hours(1));
        assert!(claims.has_permission("ViewRoles"));
        assert!(!claims.has_permission("ViewUsers"));
    }
}
