/// Authentication middleware with response-side token reissue
///
/// Inbound: extracts and verifies the bearer token, then inserts an
/// [`AuthContext`] into request extensions for the permission gate and the
/// handlers.
///
/// Outbound: every authenticated response carries a fresh token in its
/// `Authorization` header, re-signed with the caller's permissions as
/// currently stored. An active client therefore never sees its session
/// expire, and permission changes propagate within one request round-trip
/// instead of waiting out the token lifetime.
///
/// The reissue never fails the response: if re-resolving permissions from
/// the database fails, the snapshot from the verified inbound token is
/// reused and a warning is logged.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use keygate_shared::auth::{
    middleware::{bearer_token, AuthContext},
    permissions,
    token::verify_token,
};
use keygate_shared::db::unit_of_work::UnitOfWork;
use tracing::warn;
use uuid::Uuid;

use crate::{app::AppState, error::ApiError};

/// Verifies the bearer token and reissues a fresh one on the way out.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;
    let claims = verify_token(token, state.jwt_secret())?;

    let ctx = AuthContext::from_claims(&claims);
    req.extensions_mut().insert(ctx.clone());

    let mut response = next.run(req).await;

    let permissions = match current_permissions(&state, ctx.user_id).await {
        Ok(permissions) => permissions,
        Err(err) => {
            warn!(
                user_id = %ctx.user_id,
                error = %err,
                "Permission re-resolution failed; reissuing token from inbound snapshot"
            );
            ctx.permissions
        }
    };

    let fresh = claims.refreshed(permissions, state.config.token_lifetime());
    match keygate_shared::auth::token::issue_token(&fresh, state.jwt_secret()) {
        Ok(reissued) => {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", reissued)) {
                response.headers_mut().insert(header::AUTHORIZATION, value);
            }
        }
        Err(err) => {
            warn!(user_id = %ctx.user_id, error = %err, "Token reissue failed");
        }
    }

    Ok(response)
}

/// Resolves the user's effective permission set from current role state.
async fn current_permissions(state: &AppState, user_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
    let mut uow = UnitOfWork::new(state.db.clone());
    let roles = uow.roles().loaded_roles_for_user(user_id).await?;
    Ok(permissions::resolve(&roles).into_iter().collect())
}
