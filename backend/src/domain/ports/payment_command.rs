//! Driving port for payment reconciliation.

use async_trait::async_trait;

use crate::domain::{CourseId, Error, ReceiptView, UserId};

use super::payment_provider::ProviderOrder;

/// Request to mint a checkout order for a priced course.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub course_id: CourseId,
    /// Amount in major currency units as quoted to the client.
    pub amount: u32,
}

/// Request carrying a provider payment callback for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyPaymentRequest {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub order_id: String,
    pub payment_id: String,
    /// Hex HMAC signature supplied by the provider callback.
    pub signature: String,
}

/// Outcome of a successful payment verification.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentVerification {
    /// The enrollment and receipt were created by this call.
    Enrolled { receipt: ReceiptView },
    /// An enrollment already existed; no new enrollment or receipt was
    /// created. Safe replay of a duplicate callback.
    AlreadyEnrolled,
}

/// Use-case port for the payment reconciler.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentCommand: Send + Sync {
    /// Mint a provider order stamped with audit metadata.
    async fn create_order(&self, request: CreateOrderRequest) -> Result<ProviderOrder, Error>;

    /// Verify a provider callback and reconcile it into an enrollment and
    /// receipt. Idempotent for an already-enrolled pair.
    async fn verify_payment(
        &self,
        request: VerifyPaymentRequest,
    ) -> Result<PaymentVerification, Error>;
}

/// Fixture reconciler that refuses every callback.
#[derive(Debug, Default)]
pub struct FixturePaymentCommand;

#[async_trait]
impl PaymentCommand for FixturePaymentCommand {
    async fn create_order(&self, _request: CreateOrderRequest) -> Result<ProviderOrder, Error> {
        Err(Error::service_unavailable("payment provider not configured"))
    }

    async fn verify_payment(
        &self,
        _request: VerifyPaymentRequest,
    ) -> Result<PaymentVerification, Error> {
        Err(Error::service_unavailable("payment provider not configured"))
    }
}
