//! Dispensary client and prospect management service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::Dispensary;
use shared::validation::validate_license_number;

/// Dispensary service
#[derive(Clone)]
pub struct DispensaryService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct DispensaryRow {
    id: Uuid,
    business_id: Uuid,
    dispensary_name: String,
    license_number: String,
    contact_person: Option<String>,
    contact_email: Option<String>,
    contact_phone_number: Option<String>,
    address: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DispensaryRow> for Dispensary {
    fn from(row: DispensaryRow) -> Self {
        Dispensary {
            id: row.id,
            business_id: row.business_id,
            dispensary_name: row.dispensary_name,
            license_number: row.license_number,
            contact_person: row.contact_person,
            contact_email: row.contact_email,
            contact_phone_number: row.contact_phone_number,
            address: row.address,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a dispensary record
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDispensaryInput {
    #[validate(length(min = 1, max = 200))]
    pub dispensary_name: String,
    pub license_number: String,
    pub contact_person: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    pub contact_phone_number: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Input for updating a dispensary record
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDispensaryInput {
    #[validate(length(min = 1, max = 200))]
    pub dispensary_name: Option<String>,
    pub license_number: Option<String>,
    pub contact_person: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    pub contact_phone_number: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

const DISPENSARY_COLUMNS: &str = "id, business_id, dispensary_name, license_number, \
     contact_person, contact_email, contact_phone_number, address, notes, created_at, updated_at";

impl DispensaryService {
    /// Create a new DispensaryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a dispensary record
    pub async fn create_dispensary(
        &self,
        business_id: Uuid,
        input: CreateDispensaryInput,
    ) -> AppResult<Dispensary> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_license_number(&input.license_number)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let duplicate = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM dispensaries WHERE business_id = $1 AND license_number = $2",
        )
        .bind(business_id)
        .bind(&input.license_number)
        .fetch_one(&self.db)
        .await?;

        if duplicate > 0 {
            return Err(AppError::DuplicateEntry("license_number".to_string()));
        }

        let row = sqlx::query_as::<_, DispensaryRow>(&format!(
            r#"
            INSERT INTO dispensaries (
                business_id, dispensary_name, license_number, contact_person,
                contact_email, contact_phone_number, address, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            DISPENSARY_COLUMNS
        ))
        .bind(business_id)
        .bind(&input.dispensary_name)
        .bind(&input.license_number)
        .bind(&input.contact_person)
        .bind(&input.contact_email)
        .bind(&input.contact_phone_number)
        .bind(&input.address)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List dispensaries for a business
    pub async fn list_dispensaries(&self, business_id: Uuid) -> AppResult<Vec<Dispensary>> {
        let rows = sqlx::query_as::<_, DispensaryRow>(&format!(
            "SELECT {} FROM dispensaries WHERE business_id = $1 ORDER BY dispensary_name",
            DISPENSARY_COLUMNS
        ))
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a dispensary by id
    pub async fn get_dispensary(
        &self,
        business_id: Uuid,
        dispensary_id: Uuid,
    ) -> AppResult<Dispensary> {
        let row = sqlx::query_as::<_, DispensaryRow>(&format!(
            "SELECT {} FROM dispensaries WHERE id = $1 AND business_id = $2",
            DISPENSARY_COLUMNS
        ))
        .bind(dispensary_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dispensary".to_string()))?;

        Ok(row.into())
    }

    /// Update a dispensary record
    pub async fn update_dispensary(
        &self,
        business_id: Uuid,
        dispensary_id: Uuid,
        input: UpdateDispensaryInput,
    ) -> AppResult<Dispensary> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let existing = self.get_dispensary(business_id, dispensary_id).await?;

        let license_number = input.license_number.unwrap_or(existing.license_number);
        validate_license_number(&license_number)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let row = sqlx::query_as::<_, DispensaryRow>(&format!(
            r#"
            UPDATE dispensaries
            SET dispensary_name = $1, license_number = $2, contact_person = $3,
                contact_email = $4, contact_phone_number = $5, address = $6,
                notes = $7, updated_at = NOW()
            WHERE id = $8 AND business_id = $9
            RETURNING {}
            "#,
            DISPENSARY_COLUMNS
        ))
        .bind(input.dispensary_name.unwrap_or(existing.dispensary_name))
        .bind(&license_number)
        .bind(input.contact_person.or(existing.contact_person))
        .bind(input.contact_email.or(existing.contact_email))
        .bind(
            input
                .contact_phone_number
                .or(existing.contact_phone_number),
        )
        .bind(input.address.or(existing.address))
        .bind(input.notes.or(existing.notes))
        .bind(dispensary_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a dispensary that has no orders
    pub async fn delete_dispensary(
        &self,
        business_id: Uuid,
        dispensary_id: Uuid,
    ) -> AppResult<()> {
        let order_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM wholesale_orders WHERE business_id = $1 AND dispensary_id = $2",
        )
        .bind(business_id)
        .bind(dispensary_id)
        .fetch_one(&self.db)
        .await?;

        if order_count > 0 {
            return Err(AppError::Validation {
                field: "dispensary_id".to_string(),
                message: "Dispensary has order history and cannot be deleted".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM dispensaries WHERE id = $1 AND business_id = $2")
            .bind(dispensary_id)
            .bind(business_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Dispensary".to_string()));
        }

        Ok(())
    }
}
