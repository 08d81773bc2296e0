//! HTTP handlers for product template and batch endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{check_permission, CurrentUser};
use crate::services::catalog::{
    CatalogService, CreateBatchInput, CreateTemplateInput, TemplateWithRollup,
    UpdateBatchInput, UpdateTemplateInput,
};
use crate::AppState;
use shared::catalog::CatalogRollup;
use shared::models::{ProductBatch, ProductTemplate};

/// List product templates
pub async fn list_templates(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ProductTemplate>>> {
    let service = CatalogService::new(state.db);
    let templates = service.list_templates(current_user.0.business_id).await?;
    Ok(Json(templates))
}

/// Create a product template
pub async fn create_template(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateTemplateInput>,
) -> AppResult<Json<ProductTemplate>> {
    check_permission(&current_user.0, "product", "create")?;
    let service = CatalogService::new(state.db);
    let template = service
        .create_template(current_user.0.business_id, input)
        .await?;
    Ok(Json(template))
}

/// Get a product template
pub async fn get_template(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(template_id): Path<Uuid>,
) -> AppResult<Json<ProductTemplate>> {
    let service = CatalogService::new(state.db);
    let template = service
        .get_template(current_user.0.business_id, template_id)
        .await?;
    Ok(Json(template))
}

/// Update a product template
pub async fn update_template(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(template_id): Path<Uuid>,
    Json(input): Json<UpdateTemplateInput>,
) -> AppResult<Json<ProductTemplate>> {
    check_permission(&current_user.0, "product", "edit")?;
    let service = CatalogService::new(state.db);
    let template = service
        .update_template(current_user.0.business_id, template_id, input)
        .await?;
    Ok(Json(template))
}

/// Delete a product template with no batches
pub async fn delete_template(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(template_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    check_permission(&current_user.0, "product", "delete")?;
    let service = CatalogService::new(state.db);
    service
        .delete_template(current_user.0.business_id, template_id)
        .await?;
    Ok(Json(()))
}

/// Rollup for one template
pub async fn get_template_rollup(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(template_id): Path<Uuid>,
) -> AppResult<Json<CatalogRollup>> {
    let service = CatalogService::new(state.db);
    let rollup = service
        .template_rollup(current_user.0.business_id, template_id)
        .await?;
    Ok(Json(rollup))
}

/// Every template with its rollup, for the product table view
pub async fn list_templates_with_rollups(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<TemplateWithRollup>>> {
    let service = CatalogService::new(state.db);
    let rollups = service
        .templates_with_rollups(current_user.0.business_id)
        .await?;
    Ok(Json(rollups))
}

/// List batches for a template
pub async fn list_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(template_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProductBatch>>> {
    let service = CatalogService::new(state.db);
    let batches = service
        .list_batches(current_user.0.business_id, template_id)
        .await?;
    Ok(Json(batches))
}

/// Create a batch under a template
pub async fn create_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(template_id): Path<Uuid>,
    Json(input): Json<CreateBatchInput>,
) -> AppResult<Json<ProductBatch>> {
    check_permission(&current_user.0, "batch", "create")?;
    let service = CatalogService::new(state.db);
    let batch = service
        .create_batch(current_user.0.business_id, template_id, input)
        .await?;
    Ok(Json(batch))
}

/// Get a batch
pub async fn get_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<ProductBatch>> {
    let service = CatalogService::new(state.db);
    let batch = service
        .get_batch(current_user.0.business_id, batch_id)
        .await?;
    Ok(Json(batch))
}

/// Edit a batch: potency, price, stock, dates, active flag
pub async fn update_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<UpdateBatchInput>,
) -> AppResult<Json<ProductBatch>> {
    check_permission(&current_user.0, "batch", "edit")?;
    let service = CatalogService::new(state.db);
    let batch = service
        .update_batch(current_user.0.business_id, batch_id, input)
        .await?;
    Ok(Json(batch))
}
