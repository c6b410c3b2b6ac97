/// Organization endpoints
///
/// # Endpoints
///
/// - `GET /v1/organizations` - Organizations the caller belongs to
/// - `POST /v1/organizations` - Create an organization (any authenticated user)
/// - `PUT /v1/organizations/:id` - Update name/address [UpdateOrganization]
/// - `DELETE /v1/organizations/:id` - Soft-delete [UpdateOrganization]

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use keygate_shared::{
    auth::{middleware::AuthContext, permissions},
    db::unit_of_work::UnitOfWork,
    models::{
        organization::{Address, CreateOrganization, Organization},
        role::CreateRole,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Create/update organization request
#[derive(Debug, Deserialize, Validate)]
pub struct OrganizationRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    pub address: Address,
}

/// `GET /v1/organizations`
///
/// Lists the organizations the caller is a member of through their roles.
pub async fn list_organizations(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Organization>>> {
    let mut uow = UnitOfWork::new(state.db.clone());
    let organizations = uow.organizations().list_for_user(ctx.user_id).await?;
    Ok(Json(organizations))
}

/// `POST /v1/organizations`
///
/// Transactional composite like signup: pre-checks the name+address pair,
/// creates the organization plus an admin role, and grants it to the
/// creator. The new permission reaches the caller's token with the next
/// authenticated response.
///
/// # Errors
///
/// - `409 Conflict`: an organization with the same name and address exists
pub async fn create_organization(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<OrganizationRequest>,
) -> ApiResult<Json<Organization>> {
    req.validate()?;

    let mut uow = UnitOfWork::new(state.db.clone());
    uow.begin().await?;

    if uow
        .organizations()
        .find_by_name_and_address(&req.name, &req.address)
        .await?
        .is_some()
    {
        uow.rollback().await?;
        return Err(ApiError::Conflict(
            "Organization with this name and address already exists".to_string(),
        ));
    }

    let organization = uow
        .organizations()
        .create(&CreateOrganization {
            name: req.name,
            personal: false,
            address: req.address,
        })
        .await?;

    let admin_role = uow
        .roles()
        .create(&CreateRole {
            name: "Organization Admin".to_string(),
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

    uow.roles().assign_to_user(ctx.user_id, admin_role.id).await?;

    uow.commit().await?;

    Ok(Json(organization))
}

/// `PUT /v1/organizations/:id`
pub async fn update_organization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<OrganizationRequest>,
) -> ApiResult<Json<Organization>> {
    req.validate()?;

    let mut uow = UnitOfWork::new(state.db.clone());

    let organization = uow
        .organizations()
        .update(id, &req.name, &req.address)
        .await?
        .ok_or_else(|| ApiError::NotFound("Organization not found".to_string()))?;

    Ok(Json(organization))
}

/// `DELETE /v1/organizations/:id`
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut uow = UnitOfWork::new(state.db.clone());

    if !uow.organizations().soft_delete(id).await? {
        return Err(ApiError::NotFound("Organization not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Organization deleted",
    })))
}
