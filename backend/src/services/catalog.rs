//! Product catalog service: template and batch management plus rollups
//!
//! The catalog is the single source of truth for stock; it is mutated only by
//! explicit batch edits here and by the order service's decrement step.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::catalog::{rollup_for_template, CatalogRollup};
use shared::models::{ProductBatch, ProductCategory, ProductTemplate, StrainType, UnitOfMeasure};
use shared::validation::{
    validate_metrc_package_id, validate_potency_percent, validate_stock_quantity,
    validate_wholesale_price,
};

/// Catalog service for managing product templates and batches
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Template row as stored; enum columns are snake_case VARCHAR
#[derive(Debug, FromRow)]
struct TemplateRow {
    id: Uuid,
    business_id: Uuid,
    product_name: String,
    strain_type: String,
    product_category: String,
    unit_of_measure: String,
    supplier: String,
    description: Option<String>,
    image_url: Option<String>,
    active_status: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TemplateRow> for ProductTemplate {
    type Error = AppError;

    fn try_from(row: TemplateRow) -> Result<Self, Self::Error> {
        Ok(ProductTemplate {
            id: row.id,
            business_id: row.business_id,
            product_name: row.product_name,
            strain_type: StrainType::try_from(row.strain_type).map_err(AppError::Internal)?,
            product_category: ProductCategory::try_from(row.product_category)
                .map_err(AppError::Internal)?,
            unit_of_measure: UnitOfMeasure::try_from(row.unit_of_measure)
                .map_err(AppError::Internal)?,
            supplier: row.supplier,
            description: row.description,
            image_url: row.image_url,
            active_status: row.active_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Batch row as stored
#[derive(Debug, FromRow)]
struct BatchRow {
    id: Uuid,
    business_id: Uuid,
    product_template_id: Uuid,
    metrc_package_id: String,
    thc_percentage: Decimal,
    cbd_percentage: Decimal,
    wholesale_price_per_unit: Decimal,
    current_stock_quantity: i64,
    unit_of_measure: String,
    production_date: Option<NaiveDate>,
    expiration_date: Option<NaiveDate>,
    active_status: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BatchRow> for ProductBatch {
    type Error = AppError;

    fn try_from(row: BatchRow) -> Result<Self, Self::Error> {
        Ok(ProductBatch {
            id: row.id,
            business_id: row.business_id,
            product_template_id: row.product_template_id,
            metrc_package_id: row.metrc_package_id,
            thc_percentage: row.thc_percentage,
            cbd_percentage: row.cbd_percentage,
            wholesale_price_per_unit: row.wholesale_price_per_unit,
            current_stock_quantity: row.current_stock_quantity,
            unit_of_measure: UnitOfMeasure::try_from(row.unit_of_measure)
                .map_err(AppError::Internal)?,
            production_date: row.production_date,
            expiration_date: row.expiration_date,
            active_status: row.active_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Input for creating a product template
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplateInput {
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    pub strain_type: StrainType,
    pub product_category: ProductCategory,
    pub unit_of_measure: UnitOfMeasure,
    #[validate(length(min = 1, max = 200))]
    pub supplier: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub active_status: Option<bool>,
}

/// Input for updating a product template
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTemplateInput {
    #[validate(length(min = 1, max = 200))]
    pub product_name: Option<String>,
    pub strain_type: Option<StrainType>,
    pub product_category: Option<ProductCategory>,
    pub unit_of_measure: Option<UnitOfMeasure>,
    #[validate(length(min = 1, max = 200))]
    pub supplier: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub active_status: Option<bool>,
}

/// Input for creating a batch under a template
#[derive(Debug, Deserialize)]
pub struct CreateBatchInput {
    pub metrc_package_id: String,
    pub thc_percentage: Decimal,
    pub cbd_percentage: Decimal,
    pub wholesale_price_per_unit: Decimal,
    pub current_stock_quantity: i64,
    pub production_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub active_status: Option<bool>,
}

/// Input for editing a batch.
///
/// The METRC tag and the template binding are immutable; everything else can
/// be corrected.
#[derive(Debug, Deserialize)]
pub struct UpdateBatchInput {
    pub thc_percentage: Option<Decimal>,
    pub cbd_percentage: Option<Decimal>,
    pub wholesale_price_per_unit: Option<Decimal>,
    pub current_stock_quantity: Option<i64>,
    pub production_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub active_status: Option<bool>,
}

/// A template together with its derived rollup, for the product table view
#[derive(Debug, Serialize)]
pub struct TemplateWithRollup {
    #[serde(flatten)]
    pub template: ProductTemplate,
    pub rollup: CatalogRollup,
}

const TEMPLATE_COLUMNS: &str = "id, business_id, product_name, strain_type, product_category, \
     unit_of_measure, supplier, description, image_url, active_status, created_at, updated_at";

const BATCH_COLUMNS: &str = "id, business_id, product_template_id, metrc_package_id, \
     thc_percentage, cbd_percentage, wholesale_price_per_unit, current_stock_quantity, \
     unit_of_measure, production_date, expiration_date, active_status, created_at, updated_at";

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product template
    pub async fn create_template(
        &self,
        business_id: Uuid,
        input: CreateTemplateInput,
    ) -> AppResult<ProductTemplate> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let row = sqlx::query_as::<_, TemplateRow>(&format!(
            r#"
            INSERT INTO product_templates (
                business_id, product_name, strain_type, product_category,
                unit_of_measure, supplier, description, image_url, active_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            TEMPLATE_COLUMNS
        ))
        .bind(business_id)
        .bind(&input.product_name)
        .bind(input.strain_type.as_str())
        .bind(input.product_category.as_str())
        .bind(input.unit_of_measure.as_str())
        .bind(&input.supplier)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.active_status.unwrap_or(true))
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// List templates for a business
    pub async fn list_templates(&self, business_id: Uuid) -> AppResult<Vec<ProductTemplate>> {
        let rows = sqlx::query_as::<_, TemplateRow>(&format!(
            "SELECT {} FROM product_templates WHERE business_id = $1 ORDER BY product_name",
            TEMPLATE_COLUMNS
        ))
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ProductTemplate::try_from).collect()
    }

    /// Get a template by id
    pub async fn get_template(
        &self,
        business_id: Uuid,
        template_id: Uuid,
    ) -> AppResult<ProductTemplate> {
        let row = sqlx::query_as::<_, TemplateRow>(&format!(
            "SELECT {} FROM product_templates WHERE id = $1 AND business_id = $2",
            TEMPLATE_COLUMNS
        ))
        .bind(template_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product template".to_string()))?;

        row.try_into()
    }

    /// Update a template
    pub async fn update_template(
        &self,
        business_id: Uuid,
        template_id: Uuid,
        input: UpdateTemplateInput,
    ) -> AppResult<ProductTemplate> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let existing = self.get_template(business_id, template_id).await?;

        // Batches inherit the template unit unchanged, so the unit is frozen
        // once any batch exists
        if let Some(unit) = input.unit_of_measure {
            if unit != existing.unit_of_measure {
                let batch_count = self.count_batches(business_id, template_id).await?;
                if batch_count > 0 {
                    return Err(AppError::Validation {
                        field: "unit_of_measure".to_string(),
                        message: "Unit of measure cannot change once batches exist".to_string(),
                    });
                }
            }
        }

        let row = sqlx::query_as::<_, TemplateRow>(&format!(
            r#"
            UPDATE product_templates
            SET product_name = $1, strain_type = $2, product_category = $3,
                unit_of_measure = $4, supplier = $5, description = $6,
                image_url = $7, active_status = $8, updated_at = NOW()
            WHERE id = $9 AND business_id = $10
            RETURNING {}
            "#,
            TEMPLATE_COLUMNS
        ))
        .bind(input.product_name.unwrap_or(existing.product_name))
        .bind(input.strain_type.unwrap_or(existing.strain_type).as_str())
        .bind(
            input
                .product_category
                .unwrap_or(existing.product_category)
                .as_str(),
        )
        .bind(
            input
                .unit_of_measure
                .unwrap_or(existing.unit_of_measure)
                .as_str(),
        )
        .bind(input.supplier.unwrap_or(existing.supplier))
        .bind(input.description.or(existing.description))
        .bind(input.image_url.or(existing.image_url))
        .bind(input.active_status.unwrap_or(existing.active_status))
        .bind(template_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Delete a template that has no batches
    pub async fn delete_template(&self, business_id: Uuid, template_id: Uuid) -> AppResult<()> {
        let batch_count = self.count_batches(business_id, template_id).await?;
        if batch_count > 0 {
            return Err(AppError::Validation {
                field: "template_id".to_string(),
                message: "Template still has batches; deactivate it instead".to_string(),
            });
        }

        let result = sqlx::query(
            "DELETE FROM product_templates WHERE id = $1 AND business_id = $2",
        )
        .bind(template_id)
        .bind(business_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product template".to_string()));
        }

        Ok(())
    }

    /// Create a batch under a template; the unit of measure is inherited
    pub async fn create_batch(
        &self,
        business_id: Uuid,
        template_id: Uuid,
        input: CreateBatchInput,
    ) -> AppResult<ProductBatch> {
        let template = self.get_template(business_id, template_id).await?;

        validate_metrc_package_id(&input.metrc_package_id)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_potency_percent(input.thc_percentage)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_potency_percent(input.cbd_percentage)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_wholesale_price(input.wholesale_price_per_unit)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_stock_quantity(input.current_stock_quantity)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let duplicate = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM product_batches WHERE business_id = $1 AND metrc_package_id = $2",
        )
        .bind(business_id)
        .bind(&input.metrc_package_id)
        .fetch_one(&self.db)
        .await?;

        if duplicate > 0 {
            return Err(AppError::DuplicateEntry("metrc_package_id".to_string()));
        }

        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            INSERT INTO product_batches (
                business_id, product_template_id, metrc_package_id, thc_percentage,
                cbd_percentage, wholesale_price_per_unit, current_stock_quantity,
                unit_of_measure, production_date, expiration_date, active_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(business_id)
        .bind(template_id)
        .bind(&input.metrc_package_id)
        .bind(input.thc_percentage)
        .bind(input.cbd_percentage)
        .bind(input.wholesale_price_per_unit)
        .bind(input.current_stock_quantity)
        .bind(template.unit_of_measure.as_str())
        .bind(input.production_date)
        .bind(input.expiration_date)
        .bind(input.active_status.unwrap_or(true))
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// List batches for a template
    pub async fn list_batches(
        &self,
        business_id: Uuid,
        template_id: Uuid,
    ) -> AppResult<Vec<ProductBatch>> {
        // template lookup doubles as the existence check
        self.get_template(business_id, template_id).await?;

        let rows = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            SELECT {} FROM product_batches
            WHERE business_id = $1 AND product_template_id = $2
            ORDER BY created_at DESC
            "#,
            BATCH_COLUMNS
        ))
        .bind(business_id)
        .bind(template_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ProductBatch::try_from).collect()
    }

    /// List every batch for a business
    pub async fn list_all_batches(&self, business_id: Uuid) -> AppResult<Vec<ProductBatch>> {
        let rows = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {} FROM product_batches WHERE business_id = $1 ORDER BY created_at DESC",
            BATCH_COLUMNS
        ))
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ProductBatch::try_from).collect()
    }

    /// Get a batch by id
    pub async fn get_batch(&self, business_id: Uuid, batch_id: Uuid) -> AppResult<ProductBatch> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {} FROM product_batches WHERE id = $1 AND business_id = $2",
            BATCH_COLUMNS
        ))
        .bind(batch_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product batch".to_string()))?;

        row.try_into()
    }

    /// Edit a batch: potency, price, stock level, dates, active flag
    pub async fn update_batch(
        &self,
        business_id: Uuid,
        batch_id: Uuid,
        input: UpdateBatchInput,
    ) -> AppResult<ProductBatch> {
        let existing = self.get_batch(business_id, batch_id).await?;

        let thc = input.thc_percentage.unwrap_or(existing.thc_percentage);
        let cbd = input.cbd_percentage.unwrap_or(existing.cbd_percentage);
        let price = input
            .wholesale_price_per_unit
            .unwrap_or(existing.wholesale_price_per_unit);
        let stock = input
            .current_stock_quantity
            .unwrap_or(existing.current_stock_quantity);

        validate_potency_percent(thc).map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_potency_percent(cbd).map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_wholesale_price(price).map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_stock_quantity(stock).map_err(|e| AppError::ValidationError(e.to_string()))?;

        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            UPDATE product_batches
            SET thc_percentage = $1, cbd_percentage = $2, wholesale_price_per_unit = $3,
                current_stock_quantity = $4, production_date = $5, expiration_date = $6,
                active_status = $7, updated_at = NOW()
            WHERE id = $8 AND business_id = $9
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(thc)
        .bind(cbd)
        .bind(price)
        .bind(stock)
        .bind(input.production_date.or(existing.production_date))
        .bind(input.expiration_date.or(existing.expiration_date))
        .bind(input.active_status.unwrap_or(existing.active_status))
        .bind(batch_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Rollup for one template
    pub async fn template_rollup(
        &self,
        business_id: Uuid,
        template_id: Uuid,
    ) -> AppResult<CatalogRollup> {
        self.get_template(business_id, template_id).await?;
        let batches = self.list_all_batches(business_id).await?;
        Ok(rollup_for_template(template_id, &batches))
    }

    /// Every template with its rollup, for the product table view
    pub async fn templates_with_rollups(
        &self,
        business_id: Uuid,
    ) -> AppResult<Vec<TemplateWithRollup>> {
        let templates = self.list_templates(business_id).await?;
        let batches = self.list_all_batches(business_id).await?;

        Ok(templates
            .into_iter()
            .map(|template| {
                let rollup = rollup_for_template(template.id, &batches);
                TemplateWithRollup { template, rollup }
            })
            .collect())
    }

    async fn count_batches(&self, business_id: Uuid, template_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM product_batches WHERE business_id = $1 AND product_template_id = $2",
        )
        .bind(business_id)
        .bind(template_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }
}
