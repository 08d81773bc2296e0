//! Wholesale order service: validation, pricing, and atomic commit
//!
//! Validation runs against a snapshot of the live catalog via the pure
//! computation core; the commit re-validates every decrement inside one
//! transaction with a conditional UPDATE, so two overlapping submissions can
//! never jointly oversubscribe a batch.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::catalog::InMemoryCatalog;
use shared::models::{
    OrderLine, PaymentMethod, PaymentStatus, PaymentTerms, WholesaleOrder,
};
use shared::ordering::{compute_order, OrderError, OrderLineItem};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};

use super::catalog::CatalogService;
use super::dispensary::DispensaryService;

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Input for creating a wholesale order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub dispensary_id: Uuid,
    pub line_items: Vec<OrderLineItem>,
    pub payment_method: PaymentMethod,
    pub payment_terms: PaymentTerms,
    pub notes: Option<String>,
    pub shipment_date: Option<NaiveDate>,
    pub tracking_number: Option<String>,
    pub metrc_manifest_id: Option<String>,
}

/// Input for a payment-status transition
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusInput {
    pub payment_status: PaymentStatus,
}

/// Order row as stored; lines live in a JSONB column
#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    business_id: Uuid,
    order_date: DateTime<Utc>,
    dispensary_id: Uuid,
    dispensary_name: String,
    products_ordered: Json<Vec<OrderLine>>,
    total_order_amount: Decimal,
    payment_method: String,
    payment_terms: String,
    payment_status: String,
    sales_associate_id: Uuid,
    sales_associate_name: String,
    notes: Option<String>,
    shipment_date: Option<NaiveDate>,
    tracking_number: Option<String>,
    metrc_manifest_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for WholesaleOrder {
    type Error = AppError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(WholesaleOrder {
            id: row.id,
            business_id: row.business_id,
            order_date: row.order_date,
            dispensary_id: row.dispensary_id,
            dispensary_name: row.dispensary_name,
            products_ordered: row.products_ordered.0,
            total_order_amount: row.total_order_amount,
            payment_method: PaymentMethod::try_from(row.payment_method)
                .map_err(AppError::Internal)?,
            payment_terms: PaymentTerms::try_from(row.payment_terms)
                .map_err(AppError::Internal)?,
            payment_status: PaymentStatus::try_from(row.payment_status)
                .map_err(AppError::Internal)?,
            sales_associate_id: row.sales_associate_id,
            sales_associate_name: row.sales_associate_name,
            notes: row.notes,
            shipment_date: row.shipment_date,
            tracking_number: row.tracking_number,
            metrc_manifest_id: row.metrc_manifest_id,
            created_at: row.created_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, business_id, order_date, dispensary_id, dispensary_name, \
     products_ordered, total_order_amount, payment_method, payment_terms, payment_status, \
     sales_associate_id, sales_associate_name, notes, shipment_date, tracking_number, \
     metrc_manifest_id, created_at";

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Validate, price, and atomically commit a wholesale order.
    ///
    /// Any validation failure leaves the catalog completely unmodified; the
    /// caller re-collects input and resubmits.
    pub async fn create_order(
        &self,
        business_id: Uuid,
        sales_associate_id: Uuid,
        sales_associate_name: &str,
        input: CreateOrderInput,
    ) -> AppResult<WholesaleOrder> {
        let dispensary = DispensaryService::new(self.db.clone())
            .get_dispensary(business_id, input.dispensary_id)
            .await?;

        // snapshot the live catalog and run the pure validation/pricing pass
        let catalog_service = CatalogService::new(self.db.clone());
        let templates = catalog_service.list_templates(business_id).await?;
        let batches = catalog_service.list_all_batches(business_id).await?;
        let snapshot = InMemoryCatalog::new(templates, batches);

        let computed = compute_order(&input.line_items, &snapshot)?;

        let mut tx = self.db.begin().await?;

        // re-validate at commit time: the conditional UPDATE refuses to take
        // any batch below zero, and one failure rolls the whole order back
        for (batch_id, quantity) in &computed.stock_decrements {
            let updated = sqlx::query(
                r#"
                UPDATE product_batches
                SET current_stock_quantity = current_stock_quantity - $1, updated_at = NOW()
                WHERE id = $2 AND business_id = $3 AND current_stock_quantity >= $1
                "#,
            )
            .bind(quantity)
            .bind(batch_id)
            .bind(business_id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                let available = sqlx::query_scalar::<_, i64>(
                    "SELECT current_stock_quantity FROM product_batches WHERE id = $1 AND business_id = $2",
                )
                .bind(batch_id)
                .bind(business_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(OrderError::UnknownBatch(*batch_id))?;

                return Err(OrderError::InsufficientStock {
                    batch_id: *batch_id,
                    requested: *quantity,
                    available,
                }
                .into());
            }
        }

        let order_id = Uuid::new_v4();
        let order_date = Utc::now();

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO wholesale_orders (
                id, business_id, order_date, dispensary_id, dispensary_name,
                products_ordered, total_order_amount, payment_method, payment_terms,
                payment_status, sales_associate_id, sales_associate_name, notes,
                shipment_date, tracking_number, metrc_manifest_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .bind(business_id)
        .bind(order_date)
        .bind(dispensary.id)
        .bind(&dispensary.dispensary_name)
        .bind(Json(&computed.lines))
        .bind(computed.total_order_amount)
        .bind(input.payment_method.as_str())
        .bind(input.payment_terms.as_str())
        .bind(PaymentStatus::Pending.as_str())
        .bind(sales_associate_id)
        .bind(sales_associate_name)
        .bind(&input.notes)
        .bind(input.shipment_date)
        .bind(&input.tracking_number)
        .bind(&input.metrc_manifest_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            dispensary = %dispensary.dispensary_name,
            total = %computed.total_order_amount,
            "Wholesale order created"
        );

        row.try_into()
    }

    /// List orders for a business, newest first
    pub async fn list_orders(&self, business_id: Uuid) -> AppResult<Vec<WholesaleOrder>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM wholesale_orders WHERE business_id = $1 ORDER BY order_date DESC",
            ORDER_COLUMNS
        ))
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(WholesaleOrder::try_from).collect()
    }

    /// One page of the order log, newest first
    pub async fn list_orders_paginated(
        &self,
        business_id: Uuid,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<WholesaleOrder>> {
        let page = pagination.page.max(1);
        let per_page = pagination.per_page.clamp(1, 100);
        let offset = (page - 1) as i64 * per_page as i64;

        let total_items = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM wholesale_orders WHERE business_id = $1",
        )
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {} FROM wholesale_orders
            WHERE business_id = $1
            ORDER BY order_date DESC
            LIMIT $2 OFFSET $3
            "#,
            ORDER_COLUMNS
        ))
        .bind(business_id)
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let data = rows
            .into_iter()
            .map(WholesaleOrder::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        let total_pages = ((total_items as u64 + per_page as u64 - 1) / per_page as u64) as u32;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta {
                page,
                per_page,
                total_items: total_items as u64,
                total_pages,
            },
        })
    }

    /// Get an order by id
    pub async fn get_order(&self, business_id: Uuid, order_id: Uuid) -> AppResult<WholesaleOrder> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM wholesale_orders WHERE id = $1 AND business_id = $2",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Wholesale order".to_string()))?;

        row.try_into()
    }

    /// Transition an order's payment status.
    ///
    /// Orders are otherwise immutable after creation.
    pub async fn update_payment_status(
        &self,
        business_id: Uuid,
        order_id: Uuid,
        input: UpdatePaymentStatusInput,
    ) -> AppResult<WholesaleOrder> {
        let order = self.get_order(business_id, order_id).await?;

        if !order.payment_status.can_transition_to(input.payment_status) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move payment status from {} to {}",
                order.payment_status, input.payment_status
            )));
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE wholesale_orders
            SET payment_status = $1
            WHERE id = $2 AND business_id = $3
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(input.payment_status.as_str())
        .bind(order_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }
}
