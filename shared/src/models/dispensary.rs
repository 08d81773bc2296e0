//! Dispensary client and prospect records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dispensary the manufacturer sells to (or is courting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispensary {
    pub id: Uuid,
    pub business_id: Uuid,
    pub dispensary_name: String,
    /// State retail license; treated as an opaque identifier
    pub license_number: String,
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone_number: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
