//! Sales-insights orchestration service
//!
//! Owns everything that happens before the gateway call: loading the order
//! log, pre-filtering and aggregating it (Mode A), or projecting the full
//! business snapshot (Mode B). An empty Mode A aggregate short-circuits to a
//! canned answer without ever invoking the gateway.

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::external::insights_gateway::{
    BusinessAnalysisRequest, InsightsGatewayClient, SalesAnalysisRequest,
};
use shared::insights::{aggregate_product_sales, no_data_answer};
use shared::models::{
    BatchSnapshot, BusinessAnalysis, DispensarySnapshot, OrderSnapshot, SalesInsightsAnswer,
    SalesInsightsFilters, TemplateSnapshot, WholesaleSnapshot,
};

use super::catalog::CatalogService;
use super::dispensary::DispensaryService;
use super::order::OrderService;

/// Insights service
#[derive(Clone)]
pub struct InsightsService {
    db: PgPool,
    gateway: InsightsGatewayClient,
}

/// Mode A input: a natural-language question plus optional filters
#[derive(Debug, Deserialize)]
pub struct SalesInsightsQuery {
    pub question: String,
    #[serde(default)]
    pub filters: SalesInsightsFilters,
}

/// Mode B input: an optional free-text focus
#[derive(Debug, Deserialize)]
pub struct BusinessAnalysisQuery {
    pub analysis_focus: Option<String>,
}

impl InsightsService {
    pub fn new(db: PgPool, gateway: InsightsGatewayClient) -> Self {
        Self { db, gateway }
    }

    /// Mode A: filtered question answering over the sales aggregate
    pub async fn sales_insights(
        &self,
        business_id: Uuid,
        query: SalesInsightsQuery,
    ) -> AppResult<SalesInsightsAnswer> {
        let orders = OrderService::new(self.db.clone())
            .list_orders(business_id)
            .await?;
        let templates = CatalogService::new(self.db.clone())
            .list_templates(business_id)
            .await?;

        let sales_data =
            aggregate_product_sales(&orders, &templates, &query.filters, Utc::now());

        if sales_data.is_empty() {
            tracing::debug!("Insights query matched no sales data; gateway skipped");
            return Ok(no_data_answer());
        }

        self.gateway
            .analyze_sales(SalesAnalysisRequest {
                natural_language_query: query.question,
                sales_data,
            })
            .await
    }

    /// Mode B: open business analysis over the full snapshot
    pub async fn business_analysis(
        &self,
        business_id: Uuid,
        query: BusinessAnalysisQuery,
    ) -> AppResult<BusinessAnalysis> {
        let catalog = CatalogService::new(self.db.clone());
        let templates = catalog.list_templates(business_id).await?;
        let batches = catalog.list_all_batches(business_id).await?;
        let orders = OrderService::new(self.db.clone())
            .list_orders(business_id)
            .await?;
        let dispensaries = DispensaryService::new(self.db.clone())
            .list_dispensaries(business_id)
            .await?;

        let wholesale_data = WholesaleSnapshot {
            product_templates: templates
                .into_iter()
                .map(|t| TemplateSnapshot {
                    id: t.id,
                    product_name: t.product_name,
                    product_category: t.product_category,
                    strain_type: t.strain_type,
                })
                .collect(),
            product_batches: batches
                .into_iter()
                .map(|b| BatchSnapshot {
                    id: b.id,
                    product_template_id: b.product_template_id,
                    metrc_package_id: b.metrc_package_id,
                    thc_percentage: b.thc_percentage,
                    cbd_percentage: b.cbd_percentage,
                    wholesale_price_per_unit: b.wholesale_price_per_unit,
                    current_stock_quantity: b.current_stock_quantity,
                })
                .collect(),
            wholesale_orders: orders
                .into_iter()
                .map(|o| OrderSnapshot {
                    id: o.id,
                    dispensary_id: o.dispensary_id,
                    products_ordered: o.products_ordered,
                    total_order_amount: o.total_order_amount,
                    order_date: o.order_date,
                    sales_associate_id: o.sales_associate_id,
                    payment_status: o.payment_status,
                    metrc_manifest_id: o.metrc_manifest_id,
                })
                .collect(),
            dispensaries: dispensaries
                .into_iter()
                .map(|d| DispensarySnapshot {
                    id: d.id,
                    dispensary_name: d.dispensary_name,
                    license_number: d.license_number,
                    address: d.address,
                })
                .collect(),
        };

        self.gateway
            .analyze_business(BusinessAnalysisRequest {
                wholesale_data,
                analysis_focus: query.analysis_focus,
            })
            .await
    }
}
