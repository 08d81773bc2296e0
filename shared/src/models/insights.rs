//! Data slices exchanged with the sales-insights gateway
//!
//! Only trimmed projections cross the gateway boundary, never full records:
//! Mode A sends a per-template sales aggregate, Mode B sends a snapshot of
//! the catalog, order log, and dispensary list reduced to the fields the
//! analysis needs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::{OrderLine, PaymentStatus};
use super::product::{ProductCategory, StrainType};

/// Structured filters applied before Mode A analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesInsightsFilters {
    pub date_range: Option<InsightsDateRange>,
    pub product_category: Option<ProductCategory>,
}

/// Optional date window; open ends fall back to the default lookback
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightsDateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Per-template sales aggregate sent to the gateway in Mode A
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSalesSummary {
    pub product_template_id: Uuid,
    pub product_name: String,
    pub strain_type: StrainType,
    pub total_quantity_sold: i64,
}

/// One slice of the top-products chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProductChartItem {
    pub name: String,
    pub value: i64,
}

/// Mode A answer returned by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesInsightsAnswer {
    pub summary: String,
    #[serde(default)]
    pub top_products_chart_data: Vec<TopProductChartItem>,
    #[serde(default)]
    pub detailed_product_list: Vec<ProductSalesSummary>,
}

/// Template projection for the Mode B snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSnapshot {
    pub id: Uuid,
    pub product_name: String,
    pub product_category: ProductCategory,
    pub strain_type: StrainType,
}

/// Batch projection for the Mode B snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSnapshot {
    pub id: Uuid,
    pub product_template_id: Uuid,
    pub metrc_package_id: String,
    pub thc_percentage: Decimal,
    pub cbd_percentage: Decimal,
    pub wholesale_price_per_unit: Decimal,
    pub current_stock_quantity: i64,
}

/// Order projection for the Mode B snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub id: Uuid,
    pub dispensary_id: Uuid,
    pub products_ordered: Vec<OrderLine>,
    pub total_order_amount: Decimal,
    pub order_date: DateTime<Utc>,
    pub sales_associate_id: Uuid,
    pub payment_status: PaymentStatus,
    pub metrc_manifest_id: Option<String>,
}

/// Dispensary projection for the Mode B snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispensarySnapshot {
    pub id: Uuid,
    pub dispensary_name: String,
    pub license_number: String,
    pub address: Option<String>,
}

/// Full business snapshot sent to the gateway in Mode B
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WholesaleSnapshot {
    pub product_templates: Vec<TemplateSnapshot>,
    pub product_batches: Vec<BatchSnapshot>,
    pub wholesale_orders: Vec<OrderSnapshot>,
    pub dispensaries: Vec<DispensarySnapshot>,
}

/// Mode B answer returned by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessAnalysis {
    pub insights: String,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}
