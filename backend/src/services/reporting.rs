//! Reporting service for dashboard metrics and sales analytics

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use shared::types::DateRange;

/// Batches at or below this stock level count as running low
const LOW_STOCK_THRESHOLD: i64 = 10;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Dashboard metric tiles
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_templates: i64,
    pub active_templates: i64,
    pub active_batches: i64,
    pub total_sellable_stock: i64,
    pub low_stock_batches: i64,
    pub total_revenue: Decimal,
    pub order_count: i64,
    pub pending_payment_orders: i64,
}

/// Monthly sales data point
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct MonthlySalesPoint {
    pub period: String,
    pub order_count: i64,
    pub total_revenue: Decimal,
}

/// Revenue ranking entry for a dispensary
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TopDispensary {
    pub dispensary_id: Uuid,
    pub dispensary_name: String,
    pub order_count: i64,
    pub total_revenue: Decimal,
}

/// Sales breakdown by product category
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CategorySales {
    pub product_category: String,
    pub total_quantity: i64,
    pub total_revenue: Decimal,
}

/// Report filter parameters
#[derive(Debug, Default, Deserialize)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportFilter {
    fn window(&self) -> DateRange {
        DateRange {
            start: self
                .start_date
                .unwrap_or(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()),
            end: self
                .end_date
                .unwrap_or(NaiveDate::from_ymd_opt(2100, 12, 31).unwrap()),
        }
    }
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Metric tiles for the dashboard page
    pub async fn dashboard_metrics(
        &self,
        business_id: Uuid,
        filter: &ReportFilter,
    ) -> AppResult<DashboardMetrics> {
        let DateRange { start, end } = filter.window();

        let (total_templates, active_templates) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE active_status)
            FROM product_templates
            WHERE business_id = $1
            "#,
        )
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        let (active_batches, total_sellable_stock, low_stock_batches) =
            sqlx::query_as::<_, (i64, i64, i64)>(
                r#"
                SELECT COUNT(*) FILTER (WHERE active_status),
                       COALESCE(SUM(current_stock_quantity)
                           FILTER (WHERE active_status AND current_stock_quantity > 0), 0)::BIGINT,
                       COUNT(*) FILTER (WHERE active_status AND current_stock_quantity <= $2)
                FROM product_batches
                WHERE business_id = $1
                "#,
            )
            .bind(business_id)
            .bind(LOW_STOCK_THRESHOLD)
            .fetch_one(&self.db)
            .await?;

        let (order_count, total_revenue, pending_payment_orders) =
            sqlx::query_as::<_, (i64, Decimal, i64)>(
                r#"
                SELECT COUNT(*),
                       COALESCE(SUM(total_order_amount), 0),
                       COUNT(*) FILTER (WHERE payment_status IN ('pending', 'partially_paid', 'overdue'))
                FROM wholesale_orders
                WHERE business_id = $1
                  AND payment_status <> 'cancelled'
                  AND order_date::date BETWEEN $2 AND $3
                "#,
            )
            .bind(business_id)
            .bind(start)
            .bind(end)
            .fetch_one(&self.db)
            .await?;

        Ok(DashboardMetrics {
            total_templates,
            active_templates,
            active_batches,
            total_sellable_stock,
            low_stock_batches,
            total_revenue,
            order_count,
            pending_payment_orders,
        })
    }

    /// Sales by month, for the revenue chart
    pub async fn sales_by_month(
        &self,
        business_id: Uuid,
        filter: &ReportFilter,
    ) -> AppResult<Vec<MonthlySalesPoint>> {
        let DateRange { start, end } = filter.window();

        let points = sqlx::query_as::<_, MonthlySalesPoint>(
            r#"
            SELECT TO_CHAR(DATE_TRUNC('month', order_date), 'YYYY-MM') as period,
                   COUNT(*) as order_count,
                   COALESCE(SUM(total_order_amount), 0) as total_revenue
            FROM wholesale_orders
            WHERE business_id = $1
              AND payment_status <> 'cancelled'
              AND order_date::date BETWEEN $2 AND $3
            GROUP BY DATE_TRUNC('month', order_date)
            ORDER BY period ASC
            "#,
        )
        .bind(business_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(points)
    }

    /// Dispensaries ranked by revenue
    pub async fn top_dispensaries(
        &self,
        business_id: Uuid,
        filter: &ReportFilter,
        limit: i64,
    ) -> AppResult<Vec<TopDispensary>> {
        let DateRange { start, end } = filter.window();

        let rows = sqlx::query_as::<_, TopDispensary>(
            r#"
            SELECT dispensary_id,
                   dispensary_name,
                   COUNT(*) as order_count,
                   COALESCE(SUM(total_order_amount), 0) as total_revenue
            FROM wholesale_orders
            WHERE business_id = $1
              AND payment_status <> 'cancelled'
              AND order_date::date BETWEEN $2 AND $3
            GROUP BY dispensary_id, dispensary_name
            ORDER BY total_revenue DESC
            LIMIT $4
            "#,
        )
        .bind(business_id)
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Quantity and revenue by product category, expanded from the order lines
    pub async fn category_breakdown(
        &self,
        business_id: Uuid,
        filter: &ReportFilter,
    ) -> AppResult<Vec<CategorySales>> {
        let DateRange { start, end } = filter.window();

        let rows = sqlx::query_as::<_, CategorySales>(
            r#"
            SELECT t.product_category,
                   COALESCE(SUM((line->>'quantity')::BIGINT), 0)::BIGINT as total_quantity,
                   COALESCE(SUM((line->>'subtotal')::NUMERIC), 0) as total_revenue
            FROM wholesale_orders o
            CROSS JOIN LATERAL jsonb_array_elements(o.products_ordered) AS line
            JOIN product_templates t ON t.id = (line->>'product_template_id')::UUID
            WHERE o.business_id = $1
              AND o.payment_status <> 'cancelled'
              AND o.order_date::date BETWEEN $2 AND $3
            GROUP BY t.product_category
            ORDER BY total_revenue DESC
            "#,
        )
        .bind(business_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
