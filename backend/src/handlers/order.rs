//! HTTP handlers for wholesale order endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{check_permission, CurrentUser};
use crate::services::order::{CreateOrderInput, OrderService, UpdatePaymentStatusInput};
use crate::AppState;
use shared::models::WholesaleOrder;
use shared::types::{PaginatedResponse, Pagination};

/// List orders, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<WholesaleOrder>>> {
    let service = OrderService::new(state.db);
    let orders = service
        .list_orders_paginated(current_user.0.business_id, &pagination)
        .await?;
    Ok(Json(orders))
}

/// Validate, price, and commit a wholesale order
pub async fn create_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<WholesaleOrder>> {
    check_permission(&current_user.0, "order", "create")?;
    let service = OrderService::new(state.db);
    let order = service
        .create_order(
            current_user.0.business_id,
            current_user.0.user_id,
            &current_user.0.name,
            input,
        )
        .await?;
    Ok(Json(order))
}

/// Get an order
pub async fn get_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<WholesaleOrder>> {
    let service = OrderService::new(state.db);
    let order = service
        .get_order(current_user.0.business_id, order_id)
        .await?;
    Ok(Json(order))
}

/// Transition an order's payment status
pub async fn update_payment_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdatePaymentStatusInput>,
) -> AppResult<Json<WholesaleOrder>> {
    check_permission(&current_user.0, "order", "edit")?;
    let service = OrderService::new(state.db);
    let order = service
        .update_payment_status(current_user.0.business_id, order_id, input)
        .await?;
    Ok(Json(order))
}
