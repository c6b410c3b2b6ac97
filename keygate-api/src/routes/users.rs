/// User endpoints
///
/// # Endpoints
///
/// - `GET /v1/users` - List users [ViewUsers]
/// - `GET /v1/users/:id` - User detail with contacts [self or ViewUsers]
/// - `DELETE /v1/users/:id` - Soft-delete a user [UpdateUsers]

use axum::{
    extract::{Path, State},
    Json,
};
use keygate_shared::{
    db::unit_of_work::UnitOfWork,
    models::{
        account::Account,
        contact::{UserEmail, UserPhone},
        user::User,
    },
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// User detail: the user row plus its owned contact rows and provider links.
#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub user: User,
    pub emails: Vec<UserEmail>,
    pub phones: Vec<UserPhone>,
    pub accounts: Vec<Account>,
}

/// `GET /v1/users`
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let mut uow = UnitOfWork::new(state.db.clone());
    let users = uow.users().list().await?;
    Ok(Json(users))
}

/// `GET /v1/users/:id`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserDetailResponse>> {
    let mut uow = UnitOfWork::new(state.db.clone());

    let user = uow
        .users()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let emails = uow.contacts().list_emails(id).await?;
    let phones = uow.contacts().list_phones(id).await?;
    let accounts = uow.accounts().list_for_user(id).await?;

    Ok(Json(UserDetailResponse {
        user,
        emails,
        phones,
        accounts,
    }))
}

/// `DELETE /v1/users/:id`
///
/// Soft delete: the row stays for audit and its email is freed for re-use
/// by the partial unique index.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut uow = UnitOfWork::new(state.db.clone());

    if !uow.users().soft_delete(id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "User deleted",
    })))
}
