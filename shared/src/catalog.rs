//! Catalog aggregation: per-template rollups over the batch collection
//!
//! Rollups are derived views recomputed on demand; they are never persisted
//! separately from the batches they summarize.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ProductBatch, ProductTemplate};

/// Derived per-template metrics for display and availability checks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRollup {
    pub product_template_id: Uuid,
    /// Sum of stock over batches that are active and in stock
    pub total_stock: i64,
    /// Unweighted mean THC over those same batches; None when none qualify.
    /// Callers must render None as "N/A", never as 0%.
    pub avg_thc_percentage: Option<Decimal>,
    /// Unweighted mean CBD over the qualifying batches; None when none qualify
    pub avg_cbd_percentage: Option<Decimal>,
    /// Count of active batches regardless of stock level, deliberately wider
    /// than the set behind total_stock
    pub active_batch_count: i64,
}

/// Compute the rollup for one template over the full batch collection.
///
/// A template with no batches at all yields a zero/undefined rollup; that is
/// not an error.
pub fn rollup_for_template(template_id: Uuid, all_batches: &[ProductBatch]) -> CatalogRollup {
    let for_template: Vec<&ProductBatch> = all_batches
        .iter()
        .filter(|b| b.product_template_id == template_id)
        .collect();

    let qualifying: Vec<&ProductBatch> = for_template
        .iter()
        .copied()
        .filter(|b| b.is_available())
        .collect();

    let total_stock = qualifying.iter().map(|b| b.current_stock_quantity).sum();

    let (avg_thc_percentage, avg_cbd_percentage) = if qualifying.is_empty() {
        (None, None)
    } else {
        let count = Decimal::from(qualifying.len() as u64);
        let thc_sum: Decimal = qualifying.iter().map(|b| b.thc_percentage).sum();
        let cbd_sum: Decimal = qualifying.iter().map(|b| b.cbd_percentage).sum();
        (Some(thc_sum / count), Some(cbd_sum / count))
    };

    let active_batch_count = for_template.iter().filter(|b| b.active_status).count() as i64;

    CatalogRollup {
        product_template_id: template_id,
        total_stock,
        avg_thc_percentage,
        avg_cbd_percentage,
        active_batch_count,
    }
}

/// Errors raised when mutating catalog stock
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("batch {0} not found")]
    BatchNotFound(Uuid),

    #[error("insufficient stock on batch {batch_id}: requested {requested}, available {available}")]
    InsufficientStock {
        batch_id: Uuid,
        requested: i64,
        available: i64,
    },
}

/// Read and decrement access to the live catalog.
///
/// The Postgres repository and the in-memory fake both provide these
/// semantics, so order computation can be exercised against either.
/// `decrement_stock` is a compare-and-decrement: it must refuse to take a
/// batch below zero.
pub trait CatalogStore {
    fn template(&self, id: Uuid) -> Option<&ProductTemplate>;

    fn batch(&self, id: Uuid) -> Option<&ProductBatch>;

    fn batches_for_template(&self, template_id: Uuid) -> Vec<&ProductBatch>;

    /// Subtract `quantity` from the batch's stock if at least that much is on
    /// hand, returning the new stock level.
    fn decrement_stock(&mut self, batch_id: Uuid, quantity: i64) -> Result<i64, CatalogError>;
}

/// In-memory catalog used by unit tests and the WASM bindings
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    templates: HashMap<Uuid, ProductTemplate>,
    batches: HashMap<Uuid, ProductBatch>,
}

impl InMemoryCatalog {
    pub fn new(templates: Vec<ProductTemplate>, batches: Vec<ProductBatch>) -> Self {
        Self {
            templates: templates.into_iter().map(|t| (t.id, t)).collect(),
            batches: batches.into_iter().map(|b| (b.id, b)).collect(),
        }
    }

    pub fn all_batches(&self) -> Vec<ProductBatch> {
        self.batches.values().cloned().collect()
    }
}

impl CatalogStore for InMemoryCatalog {
    fn template(&self, id: Uuid) -> Option<&ProductTemplate> {
        self.templates.get(&id)
    }

    fn batch(&self, id: Uuid) -> Option<&ProductBatch> {
        self.batches.get(&id)
    }

    fn batches_for_template(&self, template_id: Uuid) -> Vec<&ProductBatch> {
        self.batches
            .values()
            .filter(|b| b.product_template_id == template_id)
            .collect()
    }

    fn decrement_stock(&mut self, batch_id: Uuid, quantity: i64) -> Result<i64, CatalogError> {
        let batch = self
            .batches
            .get_mut(&batch_id)
            .ok_or(CatalogError::BatchNotFound(batch_id))?;

        if batch.current_stock_quantity < quantity {
            return Err(CatalogError::InsufficientStock {
                batch_id,
                requested: quantity,
                available: batch.current_stock_quantity,
            });
        }

        batch.current_stock_quantity -= quantity;
        Ok(batch.current_stock_quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductCategory, StrainType, UnitOfMeasure};
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn template(id: Uuid) -> ProductTemplate {
        ProductTemplate {
            id,
            business_id: Uuid::new_v4(),
            product_name: "OG Kush".to_string(),
            strain_type: StrainType::Hybrid,
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

    fn batch(template_id: Uuid, thc: &str, stock: i64, active: bool) -> ProductBatch {
        ProductBatch {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            product_template_id: template_id,
            metrc_package_id: format!("1A40000000{}", stock),
            thc_percentage: dec(thc),
            cbd_percentage: dec("0.5"),
            wholesale_price_per_unit: dec("8.00"),
            current_stock_quantity: stock,
            unit_of_measure: UnitOfMeasure::Grams,
            production_date: None,
            expiration_date: None,
            active_status: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_rollup_averages_active_stocked_batches() {
        let t = template(Uuid::new_v4());
        let batches = vec![
            batch(t.id, "20.0", 10, true),
            batch(t.id, "24.0", 5, true),
        ];

        let rollup = rollup_for_template(t.id, &batches);
        assert_eq!(rollup.total_stock, 15);
        assert_eq!(rollup.avg_thc_percentage, Some(dec("22.0")));
        assert_eq!(rollup.active_batch_count, 2);
    }

    #[test]
    fn test_rollup_without_sellable_batches_is_undefined_not_zero() {
        let t = template(Uuid::new_v4());
        // one active batch with no stock, one inactive batch with plenty
        let batches = vec![
            batch(t.id, "20.0", 0, true),
            batch(t.id, "24.0", 50, false),
        ];

        let rollup = rollup_for_template(t.id, &batches);
        assert_eq!(rollup.total_stock, 0);
        assert_eq!(rollup.avg_thc_percentage, None);
        assert_eq!(rollup.avg_cbd_percentage, None);
        // the active count ignores stock level
        assert_eq!(rollup.active_batch_count, 1);
    }

    #[test]
    fn test_rollup_ignores_other_templates() {
        let t = template(Uuid::new_v4());
        let other = template(Uuid::new_v4());
        let batches = vec![batch(t.id, "18.0", 7, true), batch(other.id, "30.0", 99, true)];

        let rollup = rollup_for_template(t.id, &batches);
        assert_eq!(rollup.total_stock, 7);
        assert_eq!(rollup.avg_thc_percentage, Some(dec("18.0")));
    }

    #[test]
    fn test_rollup_for_template_with_no_batches() {
        let rollup = rollup_for_template(Uuid::new_v4(), &[]);
        assert_eq!(rollup.total_stock, 0);
        assert_eq!(rollup.avg_thc_percentage, None);
        assert_eq!(rollup.active_batch_count, 0);
    }

    #[test]
    fn test_decrement_stock_refuses_oversubscription() {
        let t = template(Uuid::new_v4());
        let b = batch(t.id, "20.0", 3, true);
        let batch_id = b.id;
        let mut catalog = InMemoryCatalog::new(vec![t], vec![b]);

        let err = catalog.decrement_stock(batch_id, 5).unwrap_err();
        assert_eq!(
            err,
            CatalogError::InsufficientStock {
                batch_id,
                requested: 5,
                available: 3
            }
        );
        // stock untouched after the refused decrement
        assert_eq!(
            catalog.batch(batch_id).map(|b| b.current_stock_quantity),
            Some(3)
        );

        assert_eq!(catalog.decrement_stock(batch_id, 3), Ok(0));
    }
}
