//! Validation utilities for the Cannabis Wholesale Management Platform

use rust_decimal::Decimal;

/// Validate that a THC/CBD potency value is a percentage in [0, 100]
pub fn validate_potency_percent(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO || value > Decimal::from(100) {
        return Err("Potency must be between 0 and 100 percent");
    }
    Ok(())
}

/// Validate a wholesale unit price (zero allowed for samples)
pub fn validate_wholesale_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Wholesale price cannot be negative");
    }
    Ok(())
}

/// Validate a batch stock level
pub fn validate_stock_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity < 0 {
        return Err("Stock quantity cannot be negative");
    }
    Ok(())
}

/// Validate an ordered quantity
pub fn validate_order_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Ordered quantity must be at least 1");
    }
    Ok(())
}

/// Validate a METRC package id.
///
/// The tag is opaque to this platform; only obvious garbage is rejected.
pub fn validate_metrc_package_id(id: &str) -> Result<(), &'static str> {
    if id.trim().is_empty() {
        return Err("METRC package id cannot be empty");
    }
    if id.chars().any(char::is_whitespace) {
        return Err("METRC package id cannot contain whitespace");
    }
    Ok(())
}

/// Validate a dispensary license number
pub fn validate_license_number(license: &str) -> Result<(), &'static str> {
    if license.trim().is_empty() {
        return Err("License number cannot be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_potency_bounds() {
        assert!(validate_potency_percent(dec("0")).is_ok());
        assert!(validate_potency_percent(dec("22.5")).is_ok());
        assert!(validate_potency_percent(dec("100")).is_ok());
        assert!(validate_potency_percent(dec("-0.1")).is_err());
        assert!(validate_potency_percent(dec("100.1")).is_err());
    }

    #[test]
    fn test_price_and_quantities() {
        assert!(validate_wholesale_price(dec("0")).is_ok());
        assert!(validate_wholesale_price(dec("-1")).is_err());
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-1).is_err());
        assert!(validate_order_quantity(1).is_ok());
        assert!(validate_order_quantity(0).is_err());
    }

    #[test]
    fn test_metrc_package_id() {
        assert!(validate_metrc_package_id("1A4000000000022000000123").is_ok());
        assert!(validate_metrc_package_id("").is_err());
        assert!(validate_metrc_package_id("  ").is_err());
        assert!(validate_metrc_package_id("1A40 123").is_err());
    }
}
