//! WebAssembly module for the Cannabis Wholesale Management Platform
//!
//! Provides client-side computation for:
//! - Order form previews (line subtotals and order totals)
//! - Per-template catalog rollups
//! - Offline data validation

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::catalog::*;
pub use shared::models::*;
pub use shared::ordering::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Preview an order against a catalog snapshot without committing anything.
///
/// Takes JSON arrays of line items, templates, and batches; returns the
/// computed order (lines, total, decrement map) as JSON, or an error message
/// describing the first failing validation.
#[wasm_bindgen]
pub fn preview_order(
    line_items_json: &str,
    templates_json: &str,
    batches_json: &str,
) -> Result<String, JsValue> {
    let line_items: Vec<OrderLineItem> = serde_json::from_str(line_items_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid line items JSON: {}", e)))?;
    let templates: Vec<ProductTemplate> = serde_json::from_str(templates_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid templates JSON: {}", e)))?;
    let batches: Vec<ProductBatch> = serde_json::from_str(batches_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid batches JSON: {}", e)))?;

    let catalog = InMemoryCatalog::new(templates, batches);
    let computed = compute_order(&line_items, &catalog)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&computed)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Compute the rollup for one template over a batch-collection snapshot
#[wasm_bindgen]
pub fn rollup_for_template_json(template_id: &str, batches_json: &str) -> Result<String, JsValue> {
    let template_id = uuid::Uuid::parse_str(template_id)
        .map_err(|e| JsValue::from_str(&format!("Invalid template id: {}", e)))?;
    let batches: Vec<ProductBatch> = serde_json::from_str(batches_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid batches JSON: {}", e)))?;

    let rollup = rollup_for_template(template_id, &batches);
    serde_json::to_string(&rollup)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Validate a potency percentage field as the user types
#[wasm_bindgen]
pub fn is_valid_potency(value: f64) -> bool {
    Decimal::try_from(value)
        .map(|d| validate_potency_percent(d).is_ok())
        .unwrap_or(false)
}

/// Validate a wholesale unit price field
#[wasm_bindgen]
pub fn is_valid_wholesale_price(value: f64) -> bool {
    Decimal::try_from(value)
        .map(|d| validate_wholesale_price(d).is_ok())
        .unwrap_or(false)
}

/// Validate an ordered quantity field
#[wasm_bindgen]
pub fn is_valid_order_quantity(quantity: i64) -> bool {
    validate_order_quantity(quantity).is_ok()
}

/// Validate a METRC package id field
#[wasm_bindgen]
pub fn is_valid_metrc_package_id(id: &str) -> bool {
    validate_metrc_package_id(id).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_potency_validation() {
        assert!(is_valid_potency(22.5));
        assert!(is_valid_potency(0.0));
        assert!(!is_valid_potency(-1.0));
        assert!(!is_valid_potency(120.0));
    }

    #[test]
    fn test_price_validation() {
        assert!(is_valid_wholesale_price(8.0));
        assert!(is_valid_wholesale_price(0.0));
        assert!(!is_valid_wholesale_price(-0.01));
    }

    #[test]
    fn test_quantity_validation() {
        assert!(is_valid_order_quantity(1));
        assert!(!is_valid_order_quantity(0));
        assert!(!is_valid_order_quantity(-3));
    }

    #[test]
    fn test_metrc_id_validation() {
        assert!(is_valid_metrc_package_id("1A4000000000022000000123"));
        assert!(!is_valid_metrc_package_id(""));
    }
}
