/// Public authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/signup` - Create user + personal organization + admin role
/// - `POST /v1/auth/login` - Credential check, returns a fresh token
/// - `POST /v1/auth/forgot-password` - Issue a password-reset token
/// - `POST /v1/auth/reset-password` - Redeem a reset token, set new password
/// - `POST /v1/auth/verify-email` - Redeem an email-verification token

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use keygate_shared::{
    auth::{password, permissions, token},
    db::unit_of_work::UnitOfWork,
    models::{
        organization::{Address, CreateOrganization},
        role::CreateRole,
        security_token::{self, SecurityTokenKind},
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};

/// Name of the role granted to the creator of an organization.
const ORGANIZATION_ADMIN_ROLE: &str = "Organization Admin";

/// Lifetime of a password-reset token.
const RESET_TOKEN_LIFETIME_HOURS: i64 = 1;

/// Lifetime of an email-verification token.
const VERIFICATION_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 255, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional organization name; a personal organization is created when
    /// omitted
    #[validate(length(max = 255, message = "Organization name too long"))]
    pub organization_name: Option<String>,

    /// Optional phone numbers stored as contacts
    #[serde(default)]
    pub phone_numbers: Vec<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Response for signup and login: the authenticated user plus their token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: User,
    pub permissions: Vec<String>,
}

/// Forgot-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Reset-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Verify-email request
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// `POST /v1/auth/signup`
///
/// Composite transactional operation: creates the user, their organization
/// (personal when no name is given), an "Organization Admin" role granting
/// `UpdateOrganization`, the membership, and any phone contacts. Either all
/// of it commits or none of it does.
///
/// The email conflict pre-check runs inside the transaction; losing the
/// remaining race surfaces as a conflict through the unique index.
///
/// # Errors
///
/// - `409 Conflict`: email already registered
/// - `422 Unprocessable Entity`: validation failed
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;
    password::validate_password_strength(&req.password).map_err(|message| {
        ApiError::Validation(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })?;

    // Hash outside the transaction; Argon2 is deliberately slow.
    let password_hash = password::hash_password(&req.password)?;

    let mut uow = UnitOfWork::new(state.db.clone());
    uow.begin().await?;

    if uow.users().find_by_email(&req.email).await?.is_some() {
        uow.rollback().await?;
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let user = uow
        .users()
        .create(&CreateUser {
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
            email: req.email.clone(),
            password_hash: Some(password_hash),
        })
        .await?;

    let organization = uow
        .organizations()
        .create(&match req.organization_name {
            Some(name) => CreateOrganization {
                name,
                personal: false,
                address: Address::default(),
            },
            None => CreateOrganization::personal(&req.first_name),
        })
        .await?;

    let admin_role = uow
        .roles()
        .create(&CreateRole {
            name: ORGANIZATION_ADMIN_ROLE.to_string(),
            organization_id: organization.id,
            application_id: None,
        })
        .await?;

    uow.roles()
        .replace_permissions(
            admin_role.id,
            &[permissions::names::UPDATE_ORGANIZATION.to_string()],
        )
        .await?;

    uow.roles().assign_to_user(user.id, admin_role.id).await?;

    for phone in &req.phone_numbers {
        uow.contacts().add_phone(user.id, phone, None).await?;
    }

    // Email verification token; delivery is out of scope, the link material
    // is logged for the operator.
    let (verification_token, digest) = security_token::generate_opaque_token();
    uow.security_tokens()
        .create(
            user.id,
            SecurityTokenKind::EmailVerification,
            &digest,
            Utc::now() + Duration::hours(VERIFICATION_TOKEN_LIFETIME_HOURS),
        )
        .await?;

    uow.commit().await?;

    tracing::info!(
        user_id = %user.id,
        token = %verification_token,
        "Email verification token issued"
    );

    let granted = vec![permissions::names::UPDATE_ORGANIZATION.to_string()];
    let claims = token::Claims::new(user.id, granted.clone(), state.config.token_lifetime());
    let signed = token::issue_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        token: signed,
        user,
        permissions: granted,
    }))
}

/// `POST /v1/auth/login`
///
/// Verifies credentials, resolves the caller's permission set from their
/// current roles, and returns a fresh token embedding it.
///
/// All credential failures return the same 401: unknown email, deleted or
/// disabled user, missing local credential, and wrong password are
/// indistinguishable from outside.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let mut uow = UnitOfWork::new(state.db.clone());

    let user = uow
        .users()
        .find_by_email(&req.email)
        .await?
        .ok_or_else(invalid)?;

    if !user.can_login() {
        return Err(invalid());
    }

    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
    if !password::verify_password(&req.password, hash)? {
        return Err(invalid());
    }

    uow.users().record_login(user.id, Utc::now()).await?;

    let roles = uow.roles().loaded_roles_for_user(user.id).await?;
    let granted: Vec<String> = permissions::resolve(&roles).into_iter().collect();

    let claims = token::Claims::new(user.id, granted.clone(), state.config.token_lifetime());
    let signed = token::issue_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        token: signed,
        user,
        permissions: granted,
    }))
}

/// `POST /v1/auth/forgot-password`
///
/// Issues a single-use password-reset token. The response is the same
/// whether or not the email is registered, so the endpoint cannot be used
/// to probe for accounts. Outstanding reset tokens are invalidated; only
/// the newest link works.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate()?;

    let mut uow = UnitOfWork::new(state.db.clone());

    if let Some(user) = uow.users().find_by_email(&req.email).await? {
        let now = Utc::now();

        uow.begin().await?;
        uow.security_tokens()
            .invalidate_outstanding(user.id, SecurityTokenKind::PasswordReset, now)
            .await?;

        let (reset_token, digest) = security_token::generate_opaque_token();
        uow.security_tokens()
            .create(
                user.id,
                SecurityTokenKind::PasswordReset,
                &digest,
                now + Duration::hours(RESET_TOKEN_LIFETIME_HOURS),
            )
            .await?;
        uow.commit().await?;

        tracing::info!(
            user_id = %user.id,
            token = %reset_token,
            "Password reset token issued"
        );
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "If the address is registered, a reset link has been sent",
    })))
}

/// `POST /v1/auth/reset-password`
///
/// Redeems a reset token and replaces the credential. Unknown, expired and
/// already-used tokens all produce the same error.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate()?;
    password::validate_password_strength(&req.new_password).map_err(|message| {
        ApiError::Validation(vec![ValidationErrorDetail {
            field: "new_password".to_string(),
            message,
        }])
    })?;

    let invalid = || ApiError::BadRequest("Invalid or expired token".to_string());
    let now = Utc::now();
    let digest = security_token::digest_token(&req.token);
    let password_hash = password::hash_password(&req.new_password)?;

    let mut uow = UnitOfWork::new(state.db.clone());
    uow.begin().await?;

    let stored = uow
        .security_tokens()
        .find_by_digest(SecurityTokenKind::PasswordReset, &digest)
        .await?
        .filter(|t| t.is_redeemable(now));

    let Some(stored) = stored else {
        uow.rollback().await?;
        return Err(invalid());
    };

    // Guarded update: a concurrent redemption of the same token loses here.
    if !uow.security_tokens().mark_used(stored.id, now).await? {
        uow.rollback().await?;
        return Err(invalid());
    }

    if !uow
        .users()
        .set_password_hash(stored.user_id, &password_hash)
        .await?
    {
        uow.rollback().await?;
        return Err(invalid());
    }

    uow.commit().await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Password updated",
    })))
}

/// `POST /v1/auth/verify-email`
///
/// Redeems an email-verification token.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let invalid = || ApiError::BadRequest("Invalid or expired token".to_string());
    let now = Utc::now();
    let digest = security_token::digest_token(&req.token);

    let mut uow = UnitOfWork::new(state.db.clone());
    uow.begin().await?;

    let stored = uow
        .security_tokens()
        .find_by_digest(SecurityTokenKind::EmailVerification, &digest)
        .await?
        .filter(|t| t.is_redeemable(now));

    let Some(stored) = stored else {
        uow.rollback().await?;
        return Err(invalid());
    };

    if !uow.security_tokens().mark_used(stored.id, now).await? {
        uow.rollback().await?;
        return Err(invalid());
    }

    if !uow.users().mark_email_verified(stored.user_id).await? {
        uow.rollback().await?;
        return Err(invalid());
    }

    uow.commit().await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Email verified",
    })))
}
