//! HTTP handlers for reporting endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::middleware::{check_permission, CurrentUser};
use crate::services::reporting::{
    CategorySales, DashboardMetrics, MonthlySalesPoint, ReportFilter, ReportingService,
    TopDispensary,
};
use crate::AppState;

const TOP_DISPENSARY_LIMIT: i64 = 10;

/// Metric tiles for the dashboard page
pub async fn get_dashboard_metrics(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<DashboardMetrics>> {
    check_permission(&current_user.0, "report", "view")?;
    let service = ReportingService::new(state.db);
    let metrics = service
        .dashboard_metrics(current_user.0.business_id, &filter)
        .await?;
    Ok(Json(metrics))
}

/// Monthly sales data
pub async fn get_sales_by_month(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<MonthlySalesPoint>>> {
    check_permission(&current_user.0, "report", "view")?;
    let service = ReportingService::new(state.db);
    let points = service
        .sales_by_month(current_user.0.business_id, &filter)
        .await?;
    Ok(Json(points))
}

/// Dispensaries ranked by revenue
pub async fn get_top_dispensaries(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<TopDispensary>>> {
    check_permission(&current_user.0, "report", "view")?;
    let service = ReportingService::new(state.db);
    let rows = service
        .top_dispensaries(current_user.0.business_id, &filter, TOP_DISPENSARY_LIMIT)
        .await?;
    Ok(Json(rows))
}

/// Sales by product category
pub async fn get_category_breakdown(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<CategorySales>>> {
    check_permission(&current_user.0, "report", "view")?;
    let service = ReportingService::new(state.db);
    let rows = service
        .category_breakdown(current_user.0.business_id, &filter)
        .await?;
    Ok(Json(rows))
}
