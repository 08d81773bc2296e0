//! Wholesale order computation tests
//!
//! Covers validation ordering, cent-exact totaling, all-or-nothing decrement
//! application, and the overlapping-submission scenario: two orders that each
//! fit the pre-decrement stock must not both commit.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::catalog::{CatalogStore, InMemoryCatalog};
use shared::models::{ProductBatch, ProductCategory, ProductTemplate, StrainType, UnitOfMeasure};
use shared::ordering::{apply_decrements, compute_order, OrderError, OrderLineItem};

// Helper to create Decimal from string
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

fn batch(template_id: Uuid, price: Decimal, stock: i64) -> ProductBatch {
    ProductBatch {
        id: Uuid::new_v4(),
        business_id: Uuid::new_v4(),
        product_template_id: template_id,
        metrc_package_id: format!("1A4-{}", Uuid::new_v4()),
        thc_percentage: dec("21.5"),
        cbd_percentage: dec("0.3"),
        wholesale_price_per_unit: price,
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

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Stock 10 at $8: ordering 5 totals $40 and leaves 5 on hand
    #[test]
    fn test_basic_order_and_commit() {
        let t = template("Blue Dream");
        let b = batch(t.id, dec("8.00"), 10);
        let (tid, bid) = (t.id, b.id);
        let mut catalog = InMemoryCatalog::new(vec![t], vec![b]);

        let order = compute_order(&[line(tid, bid, 5)], &catalog).unwrap();
        assert_eq!(order.lines[0].subtotal, dec("40.00"));
        assert_eq!(order.total_order_amount, dec("40.00"));

        apply_decrements(&mut catalog, &order).unwrap();
        assert_eq!(
            catalog.batch(bid).map(|b| b.current_stock_quantity),
            Some(5)
        );
    }

    /// Ordering 5 from a stock of 3 reports both numbers and changes nothing
    #[test]
    fn test_insufficient_stock() {
        let t = template("Blue Dream");
        let b = batch(t.id, dec("8.00"), 3);
        let (tid, bid) = (t.id, b.id);
        let catalog = InMemoryCatalog::new(vec![t], vec![b]);

        let err = compute_order(&[line(tid, bid, 5)], &catalog).unwrap_err();
        assert_eq!(
            err,
            OrderError::InsufficientStock {
                batch_id: bid,
                requested: 5,
                available: 3,
            }
        );
        assert_eq!(
            catalog.batch(bid).map(|b| b.current_stock_quantity),
            Some(3)
        );
    }

    /// The line potency and price are frozen copies taken at computation time
    #[test]
    fn test_lines_freeze_batch_values() {
        let t = template("Blue Dream");
        let b = batch(t.id, dec("8.00"), 10);
        let (tid, bid) = (t.id, b.id);
        let metrc = b.metrc_package_id.clone();
        let catalog = InMemoryCatalog::new(vec![t], vec![b]);

        let order = compute_order(&[line(tid, bid, 2)], &catalog).unwrap();
        let l = &order.lines[0];
        assert_eq!(l.product_name, "Blue Dream");
        assert_eq!(l.batch_metrc_package_id, metrc);
        assert_eq!(l.wholesale_price_per_unit, dec("8.00"));
        assert_eq!(l.thc_percentage_at_sale, Some(dec("21.5")));
        assert_eq!(l.cbd_percentage_at_sale, Some(dec("0.3")));
    }

    /// An empty cart is rejected before any lookups happen
    #[test]
    fn test_empty_cart() {
        let catalog = InMemoryCatalog::default();
        assert_eq!(compute_order(&[], &catalog), Err(OrderError::EmptyOrder));
    }

    /// A failing line rejects the whole order, leaving valid lines unapplied
    #[test]
    fn test_all_or_nothing_validation() {
        let t = template("Blue Dream");
        let good = batch(t.id, dec("8.00"), 10);
        let short = batch(t.id, dec("8.00"), 1);
        let (tid, good_id, short_id) = (t.id, good.id, short.id);
        let catalog = InMemoryCatalog::new(vec![t], vec![good, short]);

        let result = compute_order(
            &[line(tid, good_id, 5), line(tid, short_id, 2)],
            &catalog,
        );
        assert!(matches!(
            result,
            Err(OrderError::InsufficientStock { .. })
        ));
        assert_eq!(
            catalog.batch(good_id).map(|b| b.current_stock_quantity),
            Some(10)
        );
    }

    /// Two submissions that each fit pre-decrement stock cannot both commit
    #[test]
    fn test_overlapping_orders_cannot_oversubscribe() {
        let t = template("Blue Dream");
        let b = batch(t.id, dec("8.00"), 10);
        let (tid, bid) = (t.id, b.id);
        let mut catalog = InMemoryCatalog::new(vec![t], vec![b]);

        // both validate against the same pre-decrement stock of 10
        let first = compute_order(&[line(tid, bid, 6)], &catalog).unwrap();
        let second = compute_order(&[line(tid, bid, 6)], &catalog).unwrap();

        apply_decrements(&mut catalog, &first).unwrap();
        let err = apply_decrements(&mut catalog, &second).unwrap_err();

        assert_eq!(
            err,
            OrderError::InsufficientStock {
                batch_id: bid,
                requested: 6,
                available: 4,
            }
        );
        // stock reflects exactly one committed order, never negative
        assert_eq!(
            catalog.batch(bid).map(|b| b.current_stock_quantity),
            Some(4)
        );
    }

    /// Sequential orders that jointly fit both commit
    #[test]
    fn test_sequential_orders_within_stock() {
        let t = template("Blue Dream");
        let b = batch(t.id, dec("8.00"), 10);
        let (tid, bid) = (t.id, b.id);
        let mut catalog = InMemoryCatalog::new(vec![t], vec![b]);

        let first = compute_order(&[line(tid, bid, 6)], &catalog).unwrap();
        apply_decrements(&mut catalog, &first).unwrap();

        // re-validation against live stock now caps the second order at 4
        let second = compute_order(&[line(tid, bid, 4)], &catalog).unwrap();
        apply_decrements(&mut catalog, &second).unwrap();

        assert_eq!(
            catalog.batch(bid).map(|b| b.current_stock_quantity),
            Some(0)
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for unit prices: 0.01 to 1000.00
    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for (stock, requested) pairs where the request fits
    fn fitting_order_strategy() -> impl Strategy<Value = (i64, i64)> {
        (1i64..=500).prop_flat_map(|stock| (Just(stock), 1..=stock))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The order total equals the sum of cent-rounded line subtotals
        #[test]
        fn prop_total_is_sum_of_line_subtotals(
            specs in prop::collection::vec((price_strategy(), fitting_order_strategy()), 1..8)
        ) {
            let t = template("Blue Dream");
            let tid = t.id;
            let mut batches = Vec::new();
            let mut items = Vec::new();
            for (price, (stock, requested)) in &specs {
                let b = batch(tid, *price, *stock);
                items.push(line(tid, b.id, *requested));
                batches.push(b);
            }
            let catalog = InMemoryCatalog::new(vec![t], batches);

            let order = compute_order(&items, &catalog).unwrap();

            let expected: Decimal = order.lines.iter().map(|l| l.subtotal).sum();
            prop_assert_eq!(order.total_order_amount, expected);

            for l in &order.lines {
                let exact = (Decimal::from(l.quantity) * l.wholesale_price_per_unit).round_dp(2);
                prop_assert_eq!(l.subtotal, exact);
            }
        }

        /// Applying a computed order decrements each batch by exactly the
        /// ordered quantity and never goes below zero
        #[test]
        fn prop_decrement_exactness(
            specs in prop::collection::vec((price_strategy(), fitting_order_strategy()), 1..8)
        ) {
            let t = template("Blue Dream");
            let tid = t.id;
            let mut batches = Vec::new();
            let mut items = Vec::new();
            for (price, (stock, requested)) in &specs {
                let b = batch(tid, *price, *stock);
                items.push(line(tid, b.id, *requested));
                batches.push(b);
            }
            let before: Vec<(Uuid, i64)> = batches
                .iter()
                .map(|b| (b.id, b.current_stock_quantity))
                .collect();
            let mut catalog = InMemoryCatalog::new(vec![t], batches);

            let order = compute_order(&items, &catalog).unwrap();
            apply_decrements(&mut catalog, &order).unwrap();

            for (batch_id, stock_before) in before {
                let decrement = order.stock_decrements.get(&batch_id).copied().unwrap_or(0);
                let stock_after = catalog
                    .batch(batch_id)
                    .map(|b| b.current_stock_quantity)
                    .unwrap();
                prop_assert_eq!(stock_after, stock_before - decrement);
                prop_assert!(stock_after >= 0);
            }
        }

        /// A rejected order never changes any stock level
        #[test]
        fn prop_failed_validation_mutates_nothing(
            stock in 0i64..=20,
            requested in 21i64..=100
        ) {
            let t = template("Blue Dream");
            let b = batch(t.id, dec("8.00"), stock);
            let (tid, bid) = (t.id, b.id);
            let catalog = InMemoryCatalog::new(vec![t], vec![b]);

            let result = compute_order(&[line(tid, bid, requested)], &catalog);
            prop_assert!(result.is_err());
            prop_assert_eq!(
                catalog.batch(bid).map(|b| b.current_stock_quantity),
                Some(stock)
            );
        }
    }
}
