/// Axum building blocks for the request pipeline
///
/// The API server composes its pipeline out of these pieces:
///
/// 1. An authentication layer (in the API crate, where config and pool
///    live) verifies the bearer token and inserts an [`AuthContext`] into
///    request extensions.
/// 2. The permission gate built here ([`require_permissions`]) evaluates the
///    route's policy against the context and short-circuits before the
///    handler when the caller's (token-embedded) permission set does not
///    satisfy it.
///
/// Both authentication and authorization failures map to 401; the observable
/// status deliberately does not distinguish "not authenticated" from
/// "authenticated but lacking permission"; only the server-side log does.

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{permissions, policy::RequiredPermissions, token::Claims};

/// Request-scoped identity and permission context.
///
/// Built once per request from the verified token claims and passed to every
/// downstream collaborator via request extensions: an explicit context
/// object, not ambient mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Permission snapshot from the token (not re-queried per request)
    pub permissions: Vec<String>,
}

impl AuthContext {
    /// Creates the context from verified claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            permissions: claims.permissions.clone(),
        }
    }
}

/// Error type for the authentication/authorization pipeline.
#[derive(Debug)]
pub enum AuthError {
    /// No Authorization header present
    MissingCredentials,

    /// Header present but not `Bearer <token>` shaped
    InvalidFormat(String),

    /// Token failed verification (signature, expiry, structure, issuer)
    InvalidToken(String),

    /// Authenticated, but the granted set does not satisfy the route policy
    PermissionDenied { missing: Vec<String> },
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Not authorized".to_string())
            }
            AuthError::InvalidFormat(msg) => {
                tracing::debug!(reason = %msg, "Malformed Authorization header");
                (StatusCode::UNAUTHORIZED, "Not authorized".to_string())
            }
            AuthError::InvalidToken(_) => {
                (StatusCode::UNAUTHORIZED, "Not authorized".to_string())
            }
            AuthError::PermissionDenied { missing } => {
                tracing::debug!(missing = ?missing, "Permission gate rejected request");
                (StatusCode::UNAUTHORIZED, "Not authorized".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "errors": [],
        }));

        (status, body).into_response()
    }
}

/// Extracts the bearer token from the Authorization header.
///
/// # Errors
///
/// - `AuthError::MissingCredentials` when the header is absent
/// - `AuthError::InvalidFormat` when it is not `Bearer <token>` shaped
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Builds the permission-gate middleware for one route group.
///
/// The gate expects an [`AuthContext`] in request extensions (inserted by
/// the authentication layer), evaluates `policy` against the request, and
/// rejects with `PermissionDenied`, without ever invoking the handler,
/// when the context's permission set does not satisfy it.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use keygate_shared::auth::{middleware::require_permissions, policy::RequiredPermissions};
///
/// let users: Router<()> = Router::new()
///     .route("/", get(|| async { "users" }))
///     .route_layer(middleware::from_fn(require_permissions(
///         RequiredPermissions::of(&["ViewUsers"]),
///     )));
/// ```
pub fn require_permissions(
    policy: RequiredPermissions,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>,
> + Clone {
    move |req, next| {
        let policy = policy.clone();
        Box::pin(async move {
            let ctx = req
                .extensions()
                .get::<AuthContext>()
                .cloned()
                .ok_or(AuthError::MissingCredentials)?;

            let required = policy.evaluate(&req, &ctx);

            if !permissions::authorize(&ctx.permissions, &required) {
                let missing = required
                    .into_iter()
                    .filter(|r| !ctx.permissions.iter().any(|g| g == r))
                    .collect();
                return Err(AuthError::PermissionDenied { missing });
            }

            Ok(next.run(req).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_auth_context_from_claims() {
        let claims = Claims::new(
            Uuid::new_v4(),
            vec!["ViewUsers".to_string()],
            Duration::hours(12),
        );

        let ctx = AuthContext::from_claims(&claims);
        assert_eq!(ctx.user_id, claims.sub);
        assert_eq!(ctx.permissions, vec!["ViewUsers".to_string()]);
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredentials)
        ));

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::InvalidFormat(_))
        ));

        headers.insert(header::AUTHORIZATION, "Bearer the-token".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "the-token");
    }

    #[test]
    fn test_auth_error_status_codes() {
        // Every credential and permission failure is indistinguishable from
        // outside: all 401.
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidToken("expired".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::PermissionDenied {
            missing: vec!["ViewUsers".to_string()],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
