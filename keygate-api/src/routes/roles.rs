/// Role endpoints
///
/// # Endpoints
///
/// - `GET /v1/roles?organization_id=...` - Roles of an organization [ViewRoles]
/// - `POST /v1/roles` - Create a role with its grants [UpdateRoles]
/// - `PUT /v1/roles/:id` - Rename and full-replace grants [UpdateRoles]
/// - `DELETE /v1/roles/:id` - Soft-delete [UpdateRoles]
/// - `POST /v1/roles/:id/assign` - Grant membership to a user [UpdateRoles]

use axum::{
    extract::{Path, Query, State},
    Json,
};
use keygate_shared::{
    db::unit_of_work::UnitOfWork,
    models::role::{CreateRole, Role},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Query parameters for role listing
#[derive(Debug, Deserialize)]
pub struct ListRolesQuery {
    pub organization_id: Uuid,
}

/// Create role request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    pub organization_id: Uuid,

    pub application_id: Option<Uuid>,

    /// Permission names this role grants
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Update role request: the permission list is a full replacement, not a
/// diff.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    pub permissions: Vec<String>,
}

/// Assign role request
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub user_id: Uuid,
}

/// Role with its granted permission names
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<String>,
}

/// `GET /v1/roles?organization_id=...`
pub async fn list_roles(
    State(state): State<AppState>,
    Query(query): Query<ListRolesQuery>,
) -> ApiResult<Json<Vec<Role>>> {
    let mut uow = UnitOfWork::new(state.db.clone());
    let roles = uow
        .roles()
        .list_for_organization(query.organization_id)
        .await?;
    Ok(Json(roles))
}

/// `POST /v1/roles`
///
/// Creates the role and writes its grants in one transaction. Every named
/// permission must exist and be non-deleted.
pub async fn create_role(
    State(state): State<AppState>,
    Json(req): Json<CreateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    req.validate()?;

    let mut uow = UnitOfWork::new(state.db.clone());
    uow.begin().await?;

    if uow
        .organizations()
        .find_by_id(req.organization_id)
        .await?
        .is_none()
    {
        uow.rollback().await?;
        return Err(ApiError::NotFound("Organization not found".to_string()));
    }

    check_permissions_exist(&mut uow, &req.permissions).await?;

    let role = uow
        .roles()
        .create(&CreateRole {
            name: req.name,
            organization_id: req.organization_id,
            application_id: req.application_id,
        })
        .await?;

    uow.roles()
        .replace_permissions(role.id, &req.permissions)
        .await?;

    uow.commit().await?;

    Ok(Json(RoleResponse {
        role,
        permissions: req.permissions,
    }))
}

/// `PUT /v1/roles/:id`
///
/// Renames the role and replaces its grant set wholesale inside one
/// transaction; concurrent readers see either the old set or the new one,
/// never the cleared intermediate state.
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    req.validate()?;

    let mut uow = UnitOfWork::new(state.db.clone());
    uow.begin().await?;

    check_permissions_exist(&mut uow, &req.permissions).await?;

    let Some(role) = uow.roles().rename(id, &req.name).await? else {
        uow.rollback().await?;
        return Err(ApiError::NotFound("Role not found".to_string()));
    };

    uow.roles()
        .replace_permissions(role.id, &req.permissions)
        .await?;

    uow.commit().await?;

    Ok(Json(RoleResponse {
        role,
        permissions: req.permissions,
    }))
}

/// `DELETE /v1/roles/:id`
///
/// Soft delete; members keep the membership row but the role stops
/// contributing to permission resolution immediately.
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut uow = UnitOfWork::new(state.db.clone());

    if !uow.roles().soft_delete(id).await? {
        return Err(ApiError::NotFound("Role not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Role deleted",
    })))
}

/// `POST /v1/roles/:id/assign`
///
/// Grants role membership to a user. The user's next authenticated
/// response carries a token with the widened permission set.
pub async fn assign_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRoleRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut uow = UnitOfWork::new(state.db.clone());

    if uow.roles().find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound("Role not found".to_string()));
    }
    if uow.users().find_by_id(req.user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    uow.roles().assign_to_user(req.user_id, id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Role assigned",
    })))
}

/// Rejects grant lists naming unknown or deleted permissions.
async fn check_permissions_exist(
    uow: &mut UnitOfWork,
    names: &[String],
) -> Result<(), ApiError> {
    for name in names {
        if uow.permissions().find_by_name(name).await?.is_none() {
            uow.rollback().await?;
            return Err(ApiError::BadRequest(format!(
                "Unknown permission: {}",
                name
            )));
        }
    }
    Ok(())
}
