//! Sales-insights pre-filtering tests
//!
//! The gateway boundary only ever sees the per-template aggregate: these
//! tests pin the date-window defaults, the category filter, the no-data
//! short-circuit, and the payload-size bound.

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::insights::{aggregate_product_sales, no_data_answer, DEFAULT_LOOKBACK_DAYS};
use shared::models::{
    InsightsDateRange, OrderLine, PaymentMethod, PaymentStatus, PaymentTerms, ProductCategory,
    ProductTemplate, SalesInsightsFilters, StrainType, UnitOfMeasure, WholesaleOrder,
};

fn template(name: &str, category: ProductCategory) -> ProductTemplate {
    ProductTemplate {
        id: Uuid::new_v4(),
        business_id: Uuid::new_v4(),
        product_name: name.to_string(),
        strain_type: StrainType::Sativa,
        product_category: category,
        unit_of_measure: UnitOfMeasure::Grams,
        supplier: "Greenhouse West".to_string(),
        description: None,
        image_url: None,
        active_status: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn order_for(
    lines: Vec<(Uuid, i64)>,
    order_date: DateTime<Utc>,
) -> WholesaleOrder {
    let products_ordered: Vec<OrderLine> = lines
        .into_iter()
        .map(|(template_id, quantity)| OrderLine {
            product_template_id: template_id,
            product_batch_id: Uuid::new_v4(),
            product_name: "line".to_string(),
            batch_metrc_package_id: format!("1A4-{}", Uuid::new_v4()),
            quantity,
            wholesale_price_per_unit: Decimal::from(8),
            subtotal: Decimal::from(8 * quantity),
            thc_percentage_at_sale: None,
            cbd_percentage_at_sale: None,
        })
        .collect();

    let total: Decimal = products_ordered.iter().map(|l| l.subtotal).sum();

    WholesaleOrder {
        id: Uuid::new_v4(),
        business_id: Uuid::new_v4(),
        order_date,
        dispensary_id: Uuid::new_v4(),
        dispensary_name: "Harborview Wellness".to_string(),
        products_ordered,
        total_order_amount: total,
        payment_method: PaymentMethod::Ach,
        payment_terms: PaymentTerms::Net30,
        payment_status: PaymentStatus::Pending,
        sales_associate_id: Uuid::new_v4(),
        sales_associate_name: "Jordan Lee".to_string(),
        notes: None,
        shipment_date: None,
        tracking_number: None,
        metrc_manifest_id: None,
        created_at: order_date,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// With no explicit range, only the last sixty days of orders count
    #[test]
    fn test_default_lookback_window() {
        let now = Utc::now();
        let t = template("Sour Diesel", ProductCategory::Flower);
        let orders = vec![
            order_for(vec![(t.id, 10)], now - Duration::days(DEFAULT_LOOKBACK_DAYS + 5)),
            order_for(vec![(t.id, 3)], now - Duration::days(2)),
        ];

        let summaries =
            aggregate_product_sales(&orders, &[t], &SalesInsightsFilters::default(), now);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_quantity_sold, 3);
    }

    /// A category filter keeps an order only if some line matches, and only
    /// matching lines contribute quantities
    #[test]
    fn test_category_filter_on_mixed_order() {
        let now = Utc::now();
        let flower = template("Sour Diesel", ProductCategory::Flower);
        let vape = template("Citrus Cart", ProductCategory::Vapes);
        let orders = vec![order_for(
            vec![(flower.id, 10), (vape.id, 4)],
            now - Duration::days(1),
        )];

        let filters = SalesInsightsFilters {
            date_range: None,
            product_category: Some(ProductCategory::Vapes),
        };

        let summaries =
            aggregate_product_sales(&orders, &[flower, vape], &filters, now);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].product_name, "Citrus Cart");
        assert_eq!(summaries[0].total_quantity_sold, 4);
    }

    /// An explicit window reaches orders the default would drop
    #[test]
    fn test_explicit_window() {
        let now = Utc::now();
        let t = template("Sour Diesel", ProductCategory::Flower);
        let orders = vec![order_for(vec![(t.id, 7)], now - Duration::days(90))];

        let filters = SalesInsightsFilters {
            date_range: Some(InsightsDateRange {
                from: Some(now - Duration::days(100)),
                to: Some(now - Duration::days(80)),
            }),
            product_category: None,
        };

        let summaries = aggregate_product_sales(&orders, &[t], &filters, now);
        assert_eq!(summaries[0].total_quantity_sold, 7);
    }

    /// Zero matches means the canned answer with empty chart and list
    #[test]
    fn test_no_data_short_circuit() {
        let now = Utc::now();
        let t = template("Sour Diesel", ProductCategory::Flower);
        let filters = SalesInsightsFilters {
            date_range: None,
            product_category: Some(ProductCategory::Topicals),
        };
        let orders = vec![order_for(vec![(t.id, 10)], now - Duration::days(1))];

        let summaries = aggregate_product_sales(&orders, &[t], &filters, now);
        assert!(summaries.is_empty());

        let answer = no_data_answer();
        assert!(!answer.summary.is_empty());
        assert!(answer.top_products_chart_data.is_empty());
        assert!(answer.detailed_product_list.is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// The aggregate never exceeds the distinct template count, no matter
        /// how many orders match
        #[test]
        fn prop_payload_bounded_by_template_count(
            template_count in 1usize..6,
            order_count in 0usize..30,
            quantity in 1i64..50
        ) {
            let now = Utc::now();
            let templates: Vec<ProductTemplate> = (0..template_count)
                .map(|i| template(&format!("Product {}", i), ProductCategory::Flower))
                .collect();

            let orders: Vec<WholesaleOrder> = (0..order_count)
                .map(|i| {
                    let t = &templates[i % template_count];
                    order_for(vec![(t.id, quantity)], now - Duration::days(1))
                })
                .collect();

            let summaries = aggregate_product_sales(
                &orders,
                &templates,
                &SalesInsightsFilters::default(),
                now,
            );
            prop_assert!(summaries.len() <= template_count);
        }

        /// Total quantity in the aggregate equals the sum over matching lines
        #[test]
        fn prop_aggregate_preserves_total_quantity(
            quantities in prop::collection::vec(1i64..100, 0..20)
        ) {
            let now = Utc::now();
            let t = template("Sour Diesel", ProductCategory::Flower);
            let orders: Vec<WholesaleOrder> = quantities
                .iter()
                .map(|q| order_for(vec![(t.id, *q)], now - Duration::days(3)))
                .collect();

            let expected: i64 = quantities.iter().sum();
            let summaries = aggregate_product_sales(
                &orders,
                &[t],
                &SalesInsightsFilters::default(),
                now,
            );

            let total: i64 = summaries.iter().map(|s| s.total_quantity_sold).sum();
            prop_assert_eq!(total, expected);
        }
    }
}
