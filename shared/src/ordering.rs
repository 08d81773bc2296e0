//! Wholesale order computation: validation, pricing, and stock decrements
//!
//! `compute_order` never mutates the catalog; applying the resulting
//! decrement set is a separate, explicit step so validation and commit can be
//! tested independently.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{CatalogError, CatalogStore};
use crate::models::OrderLine;

/// A proposed order line as collected from the order form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_template_id: Uuid,
    pub product_batch_id: Uuid,
    pub quantity: i64,
}

/// Why a proposed order was rejected.
///
/// All variants are expected user-input conditions: the catalog is untouched
/// and the caller re-prompts, there is no retry logic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("order must contain at least one line item")]
    EmptyOrder,

    #[error("unknown product template {0}")]
    UnknownTemplate(Uuid),

    #[error("unknown product batch {0}")]
    UnknownBatch(Uuid),

    #[error("batch {batch_id} does not belong to template {template_id}")]
    BatchTemplateMismatch { batch_id: Uuid, template_id: Uuid },

    #[error("insufficient stock on batch {batch_id}: requested {requested}, available {available}")]
    InsufficientStock {
        batch_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("quantity must be a positive integer")]
    InvalidQuantity,
}

impl From<CatalogError> for OrderError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::BatchNotFound(id) => OrderError::UnknownBatch(id),
            CatalogError::InsufficientStock {
                batch_id,
                requested,
                available,
            } => OrderError::InsufficientStock {
                batch_id,
                requested,
                available,
            },
        }
    }
}

/// A fully validated, priced order plus the stock mutations needed to apply
/// it. The decrement map accumulates when two lines reference the same batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedOrder {
    pub lines: Vec<OrderLine>,
    pub total_order_amount: Decimal,
    pub stock_decrements: BTreeMap<Uuid, i64>,
}

/// Validate a proposed line-item list against the live catalog and price it.
///
/// Validation short-circuits on the first failing check; nothing is priced
/// until every line passes. Unit prices and potency are frozen from the batch
/// at this instant. Subtotals are rounded to the cent before summing, so the
/// order total is exactly the sum of its displayed line subtotals.
pub fn compute_order<C: CatalogStore>(
    line_items: &[OrderLineItem],
    catalog: &C,
) -> Result<ComputedOrder, OrderError> {
    if line_items.is_empty() {
        return Err(OrderError::EmptyOrder);
    }

    for item in line_items {
        validate_line(item, catalog)?;
    }

    let mut lines = Vec::with_capacity(line_items.len());
    let mut total_order_amount = Decimal::ZERO;
    let mut stock_decrements: BTreeMap<Uuid, i64> = BTreeMap::new();

    for item in line_items {
        let template = catalog
            .template(item.product_template_id)
            .ok_or(OrderError::UnknownTemplate(item.product_template_id))?;
        let batch = catalog
            .batch(item.product_batch_id)
            .ok_or(OrderError::UnknownBatch(item.product_batch_id))?;

        let subtotal =
            (Decimal::from(item.quantity) * batch.wholesale_price_per_unit).round_dp(2);
        total_order_amount += subtotal;
        *stock_decrements.entry(batch.id).or_insert(0) += item.quantity;

        lines.push(OrderLine {
            product_template_id: template.id,
            product_batch_id: batch.id,
            product_name: template.product_name.clone(),
            batch_metrc_package_id: batch.metrc_package_id.clone(),
            quantity: item.quantity,
            wholesale_price_per_unit: batch.wholesale_price_per_unit,
            subtotal,
            thc_percentage_at_sale: Some(batch.thc_percentage),
            cbd_percentage_at_sale: Some(batch.cbd_percentage),
        });
    }

    Ok(ComputedOrder {
        lines,
        total_order_amount,
        stock_decrements,
    })
}

fn validate_line<C: CatalogStore>(item: &OrderLineItem, catalog: &C) -> Result<(), OrderError> {
    let template = catalog
        .template(item.product_template_id)
        .ok_or(OrderError::UnknownTemplate(item.product_template_id))?;

    let batch = catalog
        .batch(item.product_batch_id)
        .ok_or(OrderError::UnknownBatch(item.product_batch_id))?;

    if batch.product_template_id != template.id {
        return Err(OrderError::BatchTemplateMismatch {
            batch_id: batch.id,
            template_id: template.id,
        });
    }

    // checked against the live stock value; the commit path re-validates
    // under its transaction
    if item.quantity > batch.current_stock_quantity {
        return Err(OrderError::InsufficientStock {
            batch_id: batch.id,
            requested: item.quantity,
            available: batch.current_stock_quantity,
        });
    }

    if item.quantity < 1 {
        return Err(OrderError::InvalidQuantity);
    }

    Ok(())
}

/// Apply a computed order's decrement set to the store, all-or-nothing.
///
/// Every batch is re-checked before any stock moves, so a failure leaves the
/// store untouched.
pub fn apply_decrements<C: CatalogStore>(
    catalog: &mut C,
    order: &ComputedOrder,
) -> Result<(), OrderError> {
    for (batch_id, quantity) in &order.stock_decrements {
        let batch = catalog
            .batch(*batch_id)
            .ok_or(OrderError::UnknownBatch(*batch_id))?;

        if batch.current_stock_quantity < *quantity {
            return Err(OrderError::InsufficientStock {
                batch_id: *batch_id,
                requested: *quantity,
                available: batch.current_stock_quantity,
            });
        }
    }

    for (batch_id, quantity) in &order.stock_decrements {
        catalog.decrement_stock(*batch_id, *quantity)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::models::{
        ProductBatch, ProductCategory, ProductTemplate, StrainType, UnitOfMeasure,
    };
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn template(name: &str) -> ProductTemplate {
        ProductTemplate {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            product_name: name.to_string(),
            strain_type: StrainType::Indica,
            product_category: ProductCategory::Flower,
            unit_of_measure: UnitOfMeasure::Grams,
            supplier: "Greenhouse West".to_string(),
            description: None,
            image_url: None,
            active_status: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn batch(template_id: Uuid, price: &str, stock: i64) -> ProductBatch {
        ProductBatch {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            product_template_id: template_id,
            metrc_package_id: "1A4000000000022000000123".to_string(),
            thc_percentage: dec("21.5"),
            cbd_percentage: dec("0.3"),
            wholesale_price_per_unit: dec(price),
            current_stock_quantity: stock,
            unit_of_measure: UnitOfMeasure::Grams,
            production_date: None,
            expiration_date: None,
            active_status: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(template_id: Uuid, batch_id: Uuid, quantity: i64) -> OrderLineItem {
        OrderLineItem {
            product_template_id: template_id,
            product_batch_id: batch_id,
            quantity,
        }
    }

    #[test]
    fn test_single_line_pricing() {
        let t = template("Blue Dream");
        let b = batch(t.id, "8.00", 10);
        let (tid, bid) = (t.id, b.id);
        let catalog = InMemoryCatalog::new(vec![t], vec![b]);

        let order = compute_order(&[line(tid, bid, 5)], &catalog).unwrap();
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].subtotal, dec("40.00"));
        assert_eq!(order.total_order_amount, dec("40.00"));
        assert_eq!(order.stock_decrements.get(&bid), Some(&5));
    }

    #[test]
    fn test_empty_order_rejected() {
        let catalog = InMemoryCatalog::default();
        assert_eq!(compute_order(&[], &catalog), Err(OrderError::EmptyOrder));
    }

    #[test]
    fn test_unknown_template_and_batch() {
        let t = template("Blue Dream");
        let b = batch(t.id, "8.00", 10);
        let (tid, bid) = (t.id, b.id);
        let catalog = InMemoryCatalog::new(vec![t], vec![b]);

        let ghost = Uuid::new_v4();
        assert_eq!(
            compute_order(&[line(ghost, bid, 1)], &catalog),
            Err(OrderError::UnknownTemplate(ghost))
        );
        assert_eq!(
            compute_order(&[line(tid, ghost, 1)], &catalog),
            Err(OrderError::UnknownBatch(ghost))
        );
    }

    #[test]
    fn test_batch_template_mismatch() {
        let t1 = template("Blue Dream");
        let t2 = template("Sour Diesel");
        let b2 = batch(t2.id, "8.00", 10);
        let (t1_id, t2_id, b2_id) = (t1.id, t2.id, b2.id);
        let catalog = InMemoryCatalog::new(vec![t1, t2], vec![b2]);

        assert_eq!(
            compute_order(&[line(t1_id, b2_id, 1)], &catalog),
            Err(OrderError::BatchTemplateMismatch {
                batch_id: b2_id,
                template_id: t1_id,
            })
        );
        // correct pairing still works
        assert!(compute_order(&[line(t2_id, b2_id, 1)], &catalog).is_ok());
    }

    #[test]
    fn test_insufficient_stock_reports_requested_and_available() {
        let t = template("Blue Dream");
        let b = batch(t.id, "8.00", 3);
        let (tid, bid) = (t.id, b.id);
        let catalog = InMemoryCatalog::new(vec![t], vec![b]);

        assert_eq!(
            compute_order(&[line(tid, bid, 5)], &catalog),
            Err(OrderError::InsufficientStock {
                batch_id: bid,
                requested: 5,
                available: 3,
            })
        );
    }

    #[test]
    fn test_zero_and_negative_quantities_rejected() {
        let t = template("Blue Dream");
        let b = batch(t.id, "8.00", 10);
        let (tid, bid) = (t.id, b.id);
        let catalog = InMemoryCatalog::new(vec![t], vec![b]);

        assert_eq!(
            compute_order(&[line(tid, bid, 0)], &catalog),
            Err(OrderError::InvalidQuantity)
        );
        assert_eq!(
            compute_order(&[line(tid, bid, -4)], &catalog),
            Err(OrderError::InvalidQuantity)
        );
    }

    #[test]
    fn test_total_is_sum_of_cent_rounded_subtotals() {
        let t = template("Gummies 10mg");
        // a price with sub-cent precision forces per-line rounding
        let b1 = batch(t.id, "0.105", 3);
        let b2 = batch(t.id, "0.105", 3);
        let (tid, b1_id, b2_id) = (t.id, b1.id, b2.id);
        let catalog = InMemoryCatalog::new(vec![t], vec![b1, b2]);

        let order =
            compute_order(&[line(tid, b1_id, 1), line(tid, b2_id, 1)], &catalog).unwrap();
        // 0.105 rounds to 0.10 per line (banker's rounding), summed after
        assert_eq!(order.lines[0].subtotal, dec("0.10"));
        assert_eq!(order.total_order_amount, dec("0.20"));
    }

    #[test]
    fn test_duplicate_batch_lines_accumulate_decrements() {
        let t = template("Blue Dream");
        let b = batch(t.id, "8.00", 10);
        let (tid, bid) = (t.id, b.id);
        let catalog = InMemoryCatalog::new(vec![t], vec![b]);

        let order =
            compute_order(&[line(tid, bid, 4), line(tid, bid, 3)], &catalog).unwrap();
        assert_eq!(order.stock_decrements.get(&bid), Some(&7));
        assert_eq!(order.total_order_amount, dec("56.00"));
    }

    #[test]
    fn test_compute_leaves_catalog_untouched() {
        let t = template("Blue Dream");
        let b = batch(t.id, "8.00", 10);
        let (tid, bid) = (t.id, b.id);
        let catalog = InMemoryCatalog::new(vec![t], vec![b]);

        let _ = compute_order(&[line(tid, bid, 5)], &catalog);
        let _ = compute_order(&[line(tid, bid, 50)], &catalog);
        assert_eq!(
            catalog.batch(bid).map(|b| b.current_stock_quantity),
            Some(10)
        );
    }

    #[test]
    fn test_apply_decrements_is_all_or_nothing() {
        let t = template("Blue Dream");
        let b1 = batch(t.id, "8.00", 10);
        let b2 = batch(t.id, "8.00", 2);
        let (tid, b1_id, b2_id) = (t.id, b1.id, b2.id);
        let mut catalog = InMemoryCatalog::new(vec![t], vec![b1, b2]);

        let order =
            compute_order(&[line(tid, b1_id, 5), line(tid, b2_id, 2)], &catalog).unwrap();

        // drain b2 behind the computed order's back
        catalog.decrement_stock(b2_id, 2).unwrap();

        let err = apply_decrements(&mut catalog, &order).unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { .. }));
        // the passing batch must not have been decremented either
        assert_eq!(
            catalog.batch(b1_id).map(|b| b.current_stock_quantity),
            Some(10)
        );
    }

    #[test]
    fn test_apply_decrements_updates_stock_exactly() {
        let t = template("Blue Dream");
        let b = batch(t.id, "8.00", 10);
        let (tid, bid) = (t.id, b.id);
        let mut catalog = InMemoryCatalog::new(vec![t], vec![b]);

        let order = compute_order(&[line(tid, bid, 5)], &catalog).unwrap();
        apply_decrements(&mut catalog, &order).unwrap();
        assert_eq!(
            catalog.batch(bid).map(|b| b.current_stock_quantity),
            Some(5)
        );
    }
}
