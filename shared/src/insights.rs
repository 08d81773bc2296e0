//! Pre-filtering and aggregation for Mode A sales insights
//!
//! The gateway never sees raw orders. Matching orders' lines are rolled up
//! per template, so the payload size is bounded by the number of distinct
//! templates rather than the order count.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{
    ProductSalesSummary, ProductTemplate, SalesInsightsAnswer, SalesInsightsFilters,
    WholesaleOrder,
};

/// Orders older than this are excluded when no explicit range is given
pub const DEFAULT_LOOKBACK_DAYS: i64 = 60;

/// Reduce the order log to a per-template sales aggregate.
///
/// An order qualifies when its order date falls inside the window (defaulting
/// to the last [`DEFAULT_LOOKBACK_DAYS`] days ending at `now`) and at least
/// one of its lines references a template matching the category filter. Only
/// matching lines contribute quantities.
pub fn aggregate_product_sales(
    orders: &[WholesaleOrder],
    templates: &[ProductTemplate],
    filters: &SalesInsightsFilters,
    now: DateTime<Utc>,
) -> Vec<ProductSalesSummary> {
    let range = filters.date_range.clone().unwrap_or_default();
    let from = range
        .from
        .unwrap_or_else(|| now - Duration::days(DEFAULT_LOOKBACK_DAYS));
    let to = range.to.unwrap_or(now);

    let relevant: HashMap<Uuid, &ProductTemplate> = templates
        .iter()
        .filter(|t| {
            filters
                .product_category
                .map_or(true, |category| t.product_category == category)
        })
        .map(|t| (t.id, t))
        .collect();

    // BTreeMap keeps the aggregate output stable across runs
    let mut totals: BTreeMap<Uuid, i64> = BTreeMap::new();

    for order in orders {
        if order.order_date < from || order.order_date > to {
            continue;
        }
        if !order
            .products_ordered
            .iter()
            .any(|l| relevant.contains_key(&l.product_template_id))
        {
            continue;
        }
        for line in &order.products_ordered {
            if relevant.contains_key(&line.product_template_id) {
                *totals.entry(line.product_template_id).or_insert(0) += line.quantity;
            }
        }
    }

    totals
        .into_iter()
        .filter_map(|(template_id, total_quantity_sold)| {
            relevant.get(&template_id).map(|t| ProductSalesSummary {
                product_template_id: template_id,
                product_name: t.product_name.clone(),
                strain_type: t.strain_type,
                total_quantity_sold,
            })
        })
        .collect()
}

/// Fixed answer returned when the pre-filtered aggregate is empty.
///
/// The gateway must not be invoked in that case.
pub fn no_data_answer() -> SalesInsightsAnswer {
    SalesInsightsAnswer {
        summary: "No relevant sales data found for the selected filters. \
                  Try expanding the date range or changing the product category."
            .to_string(),
        top_products_chart_data: Vec::new(),
        detailed_product_list: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        InsightsDateRange, OrderLine, PaymentMethod, PaymentStatus, PaymentTerms,
        ProductCategory, StrainType, UnitOfMeasure,
    };
    use rust_decimal::Decimal;

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

    fn order(template_id: Uuid, quantity: i64, order_date: DateTime<Utc>) -> WholesaleOrder {
        WholesaleOrder {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            order_date,
            dispensary_id: Uuid::new_v4(),
            dispensary_name: "Harborview Wellness".to_string(),
            products_ordered: vec![OrderLine {
                product_template_id: template_id,
                product_batch_id: Uuid::new_v4(),
                product_name: "Sour Diesel".to_string(),
                batch_metrc_package_id: "1A4000000000022000000777".to_string(),
                quantity,
                wholesale_price_per_unit: Decimal::from(8),
                subtotal: Decimal::from(8 * quantity),
                thc_percentage_at_sale: None,
                cbd_percentage_at_sale: None,
            }],
            total_order_amount: Decimal::from(8 * quantity),
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

    #[test]
    fn test_quantities_sum_across_orders_per_template() {
        let now = Utc::now();
        let t = template("Sour Diesel", ProductCategory::Flower);
        let orders = vec![
            order(t.id, 10, now - Duration::days(5)),
            order(t.id, 7, now - Duration::days(3)),
        ];

        let summaries =
            aggregate_product_sales(&orders, &[t], &SalesInsightsFilters::default(), now);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_quantity_sold, 17);
    }

    #[test]
    fn test_default_window_drops_old_orders() {
        let now = Utc::now();
        let t = template("Sour Diesel", ProductCategory::Flower);
        let orders = vec![
            order(t.id, 10, now - Duration::days(90)),
            order(t.id, 4, now - Duration::days(10)),
        ];

        let summaries =
            aggregate_product_sales(&orders, &[t], &SalesInsightsFilters::default(), now);
        assert_eq!(summaries[0].total_quantity_sold, 4);
    }

    #[test]
    fn test_explicit_range_overrides_default_window() {
        let now = Utc::now();
        let t = template("Sour Diesel", ProductCategory::Flower);
        let orders = vec![order(t.id, 10, now - Duration::days(90))];

        let filters = SalesInsightsFilters {
            date_range: Some(InsightsDateRange {
                from: Some(now - Duration::days(120)),
                to: None,
            }),
            product_category: None,
        };

        let summaries = aggregate_product_sales(&orders, &[t], &filters, now);
        assert_eq!(summaries[0].total_quantity_sold, 10);
    }

    #[test]
    fn test_category_filter_excludes_other_templates() {
        let now = Utc::now();
        let flower = template("Sour Diesel", ProductCategory::Flower);
        let vape = template("Citrus Cart", ProductCategory::Vapes);
        let orders = vec![
            order(flower.id, 10, now - Duration::days(5)),
            order(vape.id, 6, now - Duration::days(5)),
        ];

        let filters = SalesInsightsFilters {
            date_range: None,
            product_category: Some(ProductCategory::Vapes),
        };

        let summaries =
            aggregate_product_sales(&orders, &[flower, vape], &filters, now);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].product_name, "Citrus Cart");
        assert_eq!(summaries[0].total_quantity_sold, 6);
    }

    #[test]
    fn test_no_matches_yields_empty_aggregate() {
        let now = Utc::now();
        let t = template("Sour Diesel", ProductCategory::Flower);
        let summaries =
            aggregate_product_sales(&[], &[t], &SalesInsightsFilters::default(), now);
        assert!(summaries.is_empty());

        let answer = no_data_answer();
        assert!(answer.top_products_chart_data.is_empty());
        assert!(answer.detailed_product_list.is_empty());
        assert!(answer.summary.contains("No relevant sales data"));
    }
}
