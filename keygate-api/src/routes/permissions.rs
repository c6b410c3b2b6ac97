/// Permission catalog endpoint
///
/// `GET /v1/permissions` [ViewRoles] - the full catalog, for building role
/// editors. Registration happens through application management, not here.

use axum::{extract::State, Json};
use keygate_shared::{db::unit_of_work::UnitOfWork, models::permission::Permission};

use crate::{app::AppState, error::ApiResult};

/// `GET /v1/permissions`
pub async fn list_permissions(State(state): State<AppState>) -> ApiResult<Json<Vec<Permission>>> {
    let mut uow = UnitOfWork::new(state.db.clone());
    let permissions = uow.permissions().list().await?;
    Ok(Json(permissions))
}
