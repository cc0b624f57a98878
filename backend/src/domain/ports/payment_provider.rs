//! Port onto the external payment provider.
//!
//! The provider mints orders and reports their authoritative amounts.
//! Signature verification is this core's responsibility, not the provider's;
//! the port never sees the shared secret.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{CourseId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment provider adapters.
    pub enum PaymentProviderError {
        /// Provider could not be reached or timed out.
        Transport { message: String } => "payment provider unreachable: {message}",
        /// Provider answered with a non-success status.
        Status { code: u16 } => "payment provider returned status {code}",
        /// Provider payload could not be decoded.
        Decode { message: String } => "payment provider response invalid: {message}",
    }
}

/// Audit metadata stamped onto a minted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotes {
    pub user_id: UserId,
    pub course_id: CourseId,
    /// Amount in major currency units as requested by the client.
    pub amount: u32,
}

/// Request to mint an order with the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// Amount in minor currency units (provider wire convention).
    pub amount_minor: i64,
    pub currency: String,
    /// Caller-generated receipt tag.
    pub receipt: String,
    pub notes: OrderNotes,
}

/// Order as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOrder {
    /// Provider-issued order id.
    pub id: String,
    /// Amount in minor currency units; authoritative for receipts.
    pub amount_minor: i64,
    pub currency: String,
}

impl ProviderOrder {
    /// Provider-reported amount converted to major currency units.
    pub fn amount_major(&self) -> u32 {
        u32::try_from(self.amount_minor / 100).unwrap_or(0)
    }
}

/// Port for minting and fetching provider orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Mint a new order.
    async fn create_order(
        &self,
        request: &OrderRequest,
    ) -> Result<ProviderOrder, PaymentProviderError>;

    /// Fetch an existing order by provider id.
    async fn fetch_order(&self, order_id: &str) -> Result<ProviderOrder, PaymentProviderError>;
}
