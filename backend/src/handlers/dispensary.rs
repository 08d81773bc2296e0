//! HTTP handlers for dispensary endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{check_permission, CurrentUser};
use crate::services::dispensary::{
    CreateDispensaryInput, DispensaryService, UpdateDispensaryInput,
};
use crate::AppState;
use shared::models::Dispensary;

/// List dispensaries
pub async fn list_dispensaries(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Dispensary>>> {
    let service = DispensaryService::new(state.db);
    let dispensaries = service
        .list_dispensaries(current_user.0.business_id)
        .await?;
    Ok(Json(dispensaries))
}

/// Create a dispensary record
pub async fn create_dispensary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateDispensaryInput>,
) -> AppResult<Json<Dispensary>> {
    check_permission(&current_user.0, "dispensary", "create")?;
    let service = DispensaryService::new(state.db);
    let dispensary = service
        .create_dispensary(current_user.0.business_id, input)
        .await?;
    Ok(Json(dispensary))
}

/// Get a dispensary
pub async fn get_dispensary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(dispensary_id): Path<Uuid>,
) -> AppResult<Json<Dispensary>> {
    let service = DispensaryService::new(state.db);
    let dispensary = service
        .get_dispensary(current_user.0.business_id, dispensary_id)
        .await?;
    Ok(Json(dispensary))
}

/// Update a dispensary record
pub async fn update_dispensary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(dispensary_id): Path<Uuid>,
    Json(input): Json<UpdateDispensaryInput>,
) -> AppResult<Json<Dispensary>> {
    check_permission(&current_user.0, "dispensary", "edit")?;
    let service = DispensaryService::new(state.db);
    let dispensary = service
        .update_dispensary(current_user.0.business_id, dispensary_id, input)
        .await?;
    Ok(Json(dispensary))
}

/// Delete a dispensary with no order history
pub async fn delete_dispensary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(dispensary_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    check_permission(&current_user.0, "dispensary", "delete")?;
    let service = DispensaryService::new(state.db);
    service
        .delete_dispensary(current_user.0.business_id, dispensary_id)
        .await?;
    Ok(Json(()))
}
