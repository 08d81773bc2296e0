//! Product catalog models: templates and the METRC-tracked batches behind them

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sellable product definition, independent of any specific produced batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductTemplate {
    pub id: Uuid,
    pub business_id: Uuid,
    pub product_name: String,
    pub strain_type: StrainType,
    pub product_category: ProductCategory,
    /// General unit for the template; every batch inherits it unchanged
    pub unit_of_measure: UnitOfMeasure,
    pub supplier: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub active_status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Strain classification of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrainType {
    Indica,
    Sativa,
    Hybrid,
    Cbd,
    Other,
}

impl StrainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrainType::Indica => "indica",
            StrainType::Sativa => "sativa",
            StrainType::Hybrid => "hybrid",
            StrainType::Cbd => "cbd",
            StrainType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "indica" => Some(StrainType::Indica),
            "sativa" => Some(StrainType::Sativa),
            "hybrid" => Some(StrainType::Hybrid),
            "cbd" => Some(StrainType::Cbd),
            "other" => Some(StrainType::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for StrainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrainType::Indica => write!(f, "Indica"),
            StrainType::Sativa => write!(f, "Sativa"),
            StrainType::Hybrid => write!(f, "Hybrid"),
            StrainType::Cbd => write!(f, "CBD"),
            StrainType::Other => write!(f, "Other"),
        }
    }
}

impl TryFrom<String> for StrainType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown strain type: {}", value))
    }
}

/// Product form the template is sold as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Flower,
    Concentrates,
    Edibles,
    Vapes,
    Topicals,
    PreRolls,
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Flower => "flower",
            ProductCategory::Concentrates => "concentrates",
            ProductCategory::Edibles => "edibles",
            ProductCategory::Vapes => "vapes",
            ProductCategory::Topicals => "topicals",
            ProductCategory::PreRolls => "pre_rolls",
            ProductCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flower" => Some(ProductCategory::Flower),
            "concentrates" => Some(ProductCategory::Concentrates),
            "edibles" => Some(ProductCategory::Edibles),
            "vapes" => Some(ProductCategory::Vapes),
            "topicals" => Some(ProductCategory::Topicals),
            "pre_rolls" => Some(ProductCategory::PreRolls),
            "other" => Some(ProductCategory::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductCategory::Flower => write!(f, "Flower"),
            ProductCategory::Concentrates => write!(f, "Concentrates"),
            ProductCategory::Edibles => write!(f, "Edibles"),
            ProductCategory::Vapes => write!(f, "Vapes"),
            ProductCategory::Topicals => write!(f, "Topicals"),
            ProductCategory::PreRolls => write!(f, "Pre-Rolls"),
            ProductCategory::Other => write!(f, "Other"),
        }
    }
}

impl TryFrom<String> for ProductCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown product category: {}", value))
    }
}

/// Unit the product is priced and counted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    Grams,
    Ounces,
    Each,
    Milligrams,
    Other,
}

impl UnitOfMeasure {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Grams => "grams",
            UnitOfMeasure::Ounces => "ounces",
            UnitOfMeasure::Each => "each",
            UnitOfMeasure::Milligrams => "milligrams",
            UnitOfMeasure::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "grams" => Some(UnitOfMeasure::Grams),
            "ounces" => Some(UnitOfMeasure::Ounces),
            "each" => Some(UnitOfMeasure::Each),
            "milligrams" => Some(UnitOfMeasure::Milligrams),
            "other" => Some(UnitOfMeasure::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitOfMeasure::Grams => write!(f, "Grams"),
            UnitOfMeasure::Ounces => write!(f, "Ounces"),
            UnitOfMeasure::Each => write!(f, "Each"),
            UnitOfMeasure::Milligrams => write!(f, "Milligrams"),
            UnitOfMeasure::Other => write!(f, "Other"),
        }
    }
}

impl TryFrom<String> for UnitOfMeasure {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown unit of measure: {}", value))
    }
}

/// A specific batch of a template, tracked by its METRC package id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductBatch {
    pub id: Uuid,
    pub business_id: Uuid,
    pub product_template_id: Uuid,
    /// Regulatory traceability tag; treated as an opaque string
    pub metrc_package_id: String,
    pub thc_percentage: Decimal,
    pub cbd_percentage: Decimal,
    pub wholesale_price_per_unit: Decimal,
    pub current_stock_quantity: i64,
    pub unit_of_measure: UnitOfMeasure,
    pub production_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub active_status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductBatch {
    /// A batch can be sold only while it is active and has stock on hand
    pub fn is_available(&self) -> bool {
        self.active_status && self.current_stock_quantity > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_round_trips() {
        for s in ["indica", "sativa", "hybrid", "cbd", "other"] {
            assert_eq!(StrainType::parse(s).map(|v| v.as_str()), Some(s));
        }
        for s in [
            "flower",
            "concentrates",
            "edibles",
            "vapes",
            "topicals",
            "pre_rolls",
            "other",
        ] {
            assert_eq!(ProductCategory::parse(s).map(|v| v.as_str()), Some(s));
        }
        for s in ["grams", "ounces", "each", "milligrams", "other"] {
            assert_eq!(UnitOfMeasure::parse(s).map(|v| v.as_str()), Some(s));
        }
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert!(StrainType::parse("ruderalis").is_none());
        assert!(ProductCategory::parse("beverages").is_none());
        assert!(UnitOfMeasure::try_from("kilograms".to_string()).is_err());
    }
}
