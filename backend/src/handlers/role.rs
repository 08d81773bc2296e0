//! HTTP handlers for role and permission endpoints

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::role::{permission_catalog, RoleInfo, RoleService};
use crate::AppState;

/// List roles for the business
pub async fn list_roles(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<RoleInfo>>> {
    let service = RoleService::new(state.db);
    let roles = service.list_roles(current_user.0.business_id).await?;
    Ok(Json(roles))
}

/// List the full permission catalog
pub async fn list_permissions(_current_user: CurrentUser) -> Json<Vec<String>> {
    Json(permission_catalog())
}
