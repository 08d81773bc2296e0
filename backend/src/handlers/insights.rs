//! HTTP handlers for the sales-insights endpoints

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::{check_permission, CurrentUser};
use crate::services::insights::{BusinessAnalysisQuery, InsightsService, SalesInsightsQuery};
use crate::AppState;
use shared::models::{BusinessAnalysis, SalesInsightsAnswer};

/// Mode A: answer a natural-language question over filtered sales data
pub async fn generate_sales_insights(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(query): Json<SalesInsightsQuery>,
) -> AppResult<Json<SalesInsightsAnswer>> {
    check_permission(&current_user.0, "insights", "create")?;
    let service = InsightsService::new(state.db, state.insights_gateway.clone());
    let answer = service
        .sales_insights(current_user.0.business_id, query)
        .await?;
    Ok(Json(answer))
}

/// Mode B: open business analysis over the full snapshot
pub async fn generate_business_analysis(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(query): Json<BusinessAnalysisQuery>,
) -> AppResult<Json<BusinessAnalysis>> {
    check_permission(&current_user.0, "insights", "create")?;
    let service = InsightsService::new(state.db, state.insights_gateway.clone());
    let analysis = service
        .business_analysis(current_user.0.business_id, query)
        .await?;
    Ok(Json(analysis))
}
