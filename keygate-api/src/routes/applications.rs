/// Application endpoints
///
/// # Endpoints
///
/// All gated on ManageApplications:
///
/// - `GET /v1/applications` - List registered applications
/// - `POST /v1/applications` - Register an application with its permissions
/// - `POST /v1/applications/:id/enable` - Enable for an organization
/// - `POST /v1/applications/:id/disable` - Deactivate for an organization

use axum::{
    extract::{Path, State},
    Json,
};
use keygate_shared::{
    db::unit_of_work::UnitOfWork,
    models::{
        application::{Application, CreateApplication},
        permission::CreatePermission,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Register application request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateApplicationRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(url(message = "Invalid API URL"))]
    pub api_url: String,

    #[validate(url(message = "Invalid client URL"))]
    pub client_url: String,

    #[validate(length(min = 32, message = "Secret key must be at least 32 characters"))]
    pub secret_key: String,

    /// Permissions the application defines, registered into the catalog
    #[serde(default)]
    pub permissions: Vec<ApplicationPermission>,
}

/// A permission an application registers alongside itself.
#[derive(Debug, Deserialize, Validate)]
pub struct ApplicationPermission {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Display name is required"))]
    pub display_name: String,

    #[serde(default)]
    pub description: String,
}

/// Enable/disable request
#[derive(Debug, Deserialize)]
pub struct EnablementRequest {
    pub organization_id: Uuid,
}

/// `GET /v1/applications`
pub async fn list_applications(State(state): State<AppState>) -> ApiResult<Json<Vec<Application>>> {
    let mut uow = UnitOfWork::new(state.db.clone());
    let applications = uow.applications().list().await?;
    Ok(Json(applications))
}

/// `POST /v1/applications`
///
/// Registers the application and its permission names in one transaction,
/// after a name conflict pre-check. Already-cataloged permission names are
/// skipped, so re-registering a newer application version is additive.
pub async fn create_application(
    State(state): State<AppState>,
    Json(req): Json<CreateApplicationRequest>,
) -> ApiResult<Json<Application>> {
    req.validate()?;
    for permission in &req.permissions {
        permission.validate()?;
    }

    let mut uow = UnitOfWork::new(state.db.clone());
    uow.begin().await?;

    if uow.applications().find_by_name(&req.name).await?.is_some() {
        uow.rollback().await?;
        return Err(ApiError::Conflict(
            "Application with this name already exists".to_string(),
        ));
    }

    let application = uow
        .applications()
        .create(&CreateApplication {
            name: req.name,
            api_url: req.api_url,
            client_url: req.client_url,
            secret_key: req.secret_key,
        })
        .await?;

    for permission in &req.permissions {
        if uow
            .permissions()
            .find_by_name(&permission.name)
            .await?
            .is_none()
        {
            uow.permissions()
                .create(&CreatePermission {
                    name: permission.name.clone(),
                    display_name: permission.display_name.clone(),
                    description: permission.description.clone(),
                    is_system_admin: false,
                })
                .await?;
        }
    }

    uow.commit().await?;

    Ok(Json(application))
}

/// `POST /v1/applications/:id/enable`
pub async fn enable_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EnablementRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut uow = UnitOfWork::new(state.db.clone());

    if uow.applications().find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound("Application not found".to_string()));
    }
    if uow
        .organizations()
        .find_by_id(req.organization_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Organization not found".to_string()));
    }

    uow.applications()
        .enable_for_organization(req.organization_id, id)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Application enabled",
    })))
}

/// `POST /v1/applications/:id/disable`
pub async fn disable_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EnablementRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut uow = UnitOfWork::new(state.db.clone());

    if !uow
        .applications()
        .disable_for_organization(req.organization_id, id)
        .await?
    {
        return Err(ApiError::NotFound(
            "Application is not enabled for this organization".to_string(),
        ));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Application disabled",
    })))
}
