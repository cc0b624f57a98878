//! Payment receipt audit records.
//!
//! A receipt is written once, in the same atomic unit as the enrollment it
//! references, and never updated afterwards. The type exposes no mutators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{CourseId, UserId};

/// Outcome recorded on a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptStatus {
    Success,
    Failed,
}

impl ReceiptStatus {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    /// Parse the storage representation.
    pub fn parse(value: &str) -> Result<Self, super::enrollment::UnknownStatusError> {
        match value {
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            other => Err(super::enrollment::UnknownStatusError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Append-only audit record of a verified payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub id: Uuid,
    pub user_id: UserId,
    pub course_id: CourseId,
    /// The enrollment this receipt settled; a receipt never exists without
    /// its enrollment.
    pub enrollment_id: Uuid,
    pub order_id: String,
    pub payment_id: String,
    /// Amount in major currency units, provider-reported.
    pub amount: u32,
    pub currency: String,
    pub status: ReceiptStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to write a receipt; the enrollment reference is supplied by
/// the repository inside the atomic commit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPaymentReceipt {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub order_id: String,
    pub payment_id: String,
    pub amount: u32,
    pub currency: String,
    pub status: ReceiptStatus,
}

/// Client-facing projection of a receipt. Carries no signature or secret
/// material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    #[schema(value_type = String)]
    pub receipt_id: Uuid,
    pub payment_id: String,
    pub order_id: String,
    pub amount: u32,
    pub currency: String,
    pub course_name: String,
    pub date: DateTime<Utc>,
}
