//! Wholesale order models and the payment lifecycle

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product/batch/quantity line within a wholesale order.
///
/// Product name, METRC tag, unit price, and potency are denormalized copies
/// taken from the catalog at computation time, so the order stays historically
/// accurate even if the batch record changes later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_template_id: Uuid,
    pub product_batch_id: Uuid,
    pub product_name: String,
    pub batch_metrc_package_id: String,
    pub quantity: i64,
    pub wholesale_price_per_unit: Decimal,
    pub subtotal: Decimal,
    pub thc_percentage_at_sale: Option<Decimal>,
    pub cbd_percentage_at_sale: Option<Decimal>,
}

/// A wholesale order placed by a dispensary.
///
/// Immutable once created, except for payment-status transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WholesaleOrder {
    pub id: Uuid,
    pub business_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub dispensary_id: Uuid,
    pub dispensary_name: String,
    pub products_ordered: Vec<OrderLine>,
    pub total_order_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_terms: PaymentTerms,
    pub payment_status: PaymentStatus,
    pub sales_associate_id: Uuid,
    pub sales_associate_name: String,
    pub notes: Option<String>,
    pub shipment_date: Option<NaiveDate>,
    pub tracking_number: Option<String>,
    pub metrc_manifest_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// How the dispensary pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Ach,
    Check,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Ach => "ach",
            PaymentMethod::Check => "check",
            PaymentMethod::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "credit_card" => Some(PaymentMethod::CreditCard),
            "debit_card" => Some(PaymentMethod::DebitCard),
            "ach" => Some(PaymentMethod::Ach),
            "check" => Some(PaymentMethod::Check),
            "other" => Some(PaymentMethod::Other),
            _ => None,
        }
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown payment method: {}", value))
    }
}

/// When payment is due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTerms {
    Net15,
    Net30,
    Net60,
    DueOnReceipt,
    Prepaid,
}

impl PaymentTerms {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentTerms::Net15 => "net_15",
            PaymentTerms::Net30 => "net_30",
            PaymentTerms::Net60 => "net_60",
            PaymentTerms::DueOnReceipt => "due_on_receipt",
            PaymentTerms::Prepaid => "prepaid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "net_15" => Some(PaymentTerms::Net15),
            "net_30" => Some(PaymentTerms::Net30),
            "net_60" => Some(PaymentTerms::Net60),
            "due_on_receipt" => Some(PaymentTerms::DueOnReceipt),
            "prepaid" => Some(PaymentTerms::Prepaid),
            _ => None,
        }
    }
}

impl TryFrom<String> for PaymentTerms {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown payment terms: {}", value))
    }
}

/// Where the order sits in the payment lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    PartiallyPaid,
    Overdue,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::PartiallyPaid => "partially_paid",
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "partially_paid" => Some(PaymentStatus::PartiallyPaid),
            "overdue" => Some(PaymentStatus::Overdue),
            "cancelled" => Some(PaymentStatus::Cancelled),
            _ => None,
        }
    }

    /// Paid and Cancelled are terminal; everything else can settle, slip
    /// overdue, or be cancelled.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        match self {
            Pending => matches!(next, Paid | PartiallyPaid | Overdue | Cancelled),
            PartiallyPaid => matches!(next, Paid | Overdue | Cancelled),
            Overdue => matches!(next, Paid | PartiallyPaid | Cancelled),
            Paid | Cancelled => false,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::PartiallyPaid => write!(f, "Partially Paid"),
            PaymentStatus::Overdue => write!(f, "Overdue"),
            PaymentStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown payment status: {}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_move_anywhere() {
        use PaymentStatus::*;
        for next in [Paid, PartiallyPaid, Overdue, Cancelled] {
            assert!(Pending.can_transition_to(next));
        }
    }

    #[test]
    fn test_terminal_statuses_are_frozen() {
        use PaymentStatus::*;
        for next in [Pending, Paid, PartiallyPaid, Overdue, Cancelled] {
            assert!(!Paid.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_partial_payment_cannot_regress_to_pending() {
        assert!(!PaymentStatus::PartiallyPaid.can_transition_to(PaymentStatus::Pending));
        assert!(PaymentStatus::PartiallyPaid.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Overdue.can_transition_to(PaymentStatus::PartiallyPaid));
    }
}
