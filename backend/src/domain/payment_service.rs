//! Payment reconciliation service.
//!
//! Mints provider orders for priced courses and verifies provider callbacks
//! into paid enrollments. Verification is strictly ordered: the signature is
//! checked before any state is read or written, the provider's order record
//! is treated as the authoritative amount, and the enrollment plus receipt
//! commit as one unit through the ledger port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    CourseCatalog, CourseCatalogError, CreateOrderRequest, EnrollmentRepository,
    EnrollmentRepositoryError, OrderNotes, OrderRequest, PaymentCommand, PaymentProvider,
    PaymentProviderError, PaymentVerification, ProviderOrder, VerifyPaymentRequest,
};
use crate::domain::signature::{verify_signature, PaymentSecret};
use crate::domain::{
    Course, Error, NewEnrollment, NewPaymentReceipt, PaymentRecord, PaymentStatus, ReceiptStatus,
    ReceiptView,
};

/// Currency every provider order is minted in.
const ORDER_CURRENCY: &str = "INR";

/// The provider identifier recorded on paid enrollments.
const PROVIDER_NAME: &str = "razorpay";

fn map_catalog_error(error: CourseCatalogError) -> Error {
    match error {
        CourseCatalogError::Connection { message } => {
            Error::service_unavailable(format!("course catalog unavailable: {message}"))
        }
        CourseCatalogError::Query { message } => {
            Error::internal(format!("course catalog error: {message}"))
        }
    }
}

fn map_repository_error(error: EnrollmentRepositoryError) -> Error {
    match error {
        EnrollmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("enrollment ledger unavailable: {message}"))
        }
        EnrollmentRepositoryError::Query { message } => {
            Error::internal(format!("enrollment ledger error: {message}"))
        }
        EnrollmentRepositoryError::DuplicateEnrollment => {
            Error::conflict("enrollment already exists for this user and course")
        }
    }
}

fn map_provider_error(error: &PaymentProviderError) -> Error {
    Error::service_unavailable(format!("payment provider request failed: {error}"))
}

/// Payment reconciliation service implementing [`PaymentCommand`].
#[derive(Clone)]
pub struct PaymentService<P, R, C> {
    provider: Arc<P>,
    enrollments: Arc<R>,
    catalog: Arc<C>,
    secret: PaymentSecret,
}

impl<P, R, C> PaymentService<P, R, C> {
    /// Create a new reconciler over the provider, ledger, and catalog ports.
    pub fn new(
        provider: Arc<P>,
        enrollments: Arc<R>,
        catalog: Arc<C>,
        secret: PaymentSecret,
    ) -> Self {
        Self {
            provider,
            enrollments,
            catalog,
            secret,
        }
    }
}

impl<P, R, C> PaymentService<P, R, C>
where
    P: PaymentProvider,
    R: EnrollmentRepository,
    C: CourseCatalog,
{
    async fn require_course(&self, request_course: &crate::domain::CourseId) -> Result<Course, Error> {
        self.catalog
            .find_by_id(request_course)
            .await
            .map_err(map_catalog_error)?
            .ok_or_else(|| Error::not_found(format!("course {request_course} not found")))
    }
}

#[async_trait]
impl<P, R, C> PaymentCommand for PaymentService<P, R, C>
where
    P: PaymentProvider,
    R: EnrollmentRepository,
    C: CourseCatalog,
{
    async fn create_order(&self, request: CreateOrderRequest) -> Result<ProviderOrder, Error> {
        let course = self.require_course(&request.course_id).await?;
        if !course.is_paid() {
            return Err(Error::invalid_request(
                "course is free; enroll directly instead of creating an order",
            ));
        }
        if request.amount == 0 {
            return Err(Error::invalid_request("order amount must be positive"));
        }

        let order_request = OrderRequest {
            amount_minor: i64::from(request.amount) * 100,
            currency: ORDER_CURRENCY.to_owned(),
            receipt: format!("rcpt_{}", Uuid::new_v4().simple()),
            notes: OrderNotes {
                user_id: request.user_id.clone(),
                course_id: request.course_id.clone(),
                amount: request.amount,
            },
        };

        let order = self
            .provider
            .create_order(&order_request)
            .await
            .map_err(|err| {
                error!(error = %err, course_id = %request.course_id, "order creation failed");
                map_provider_error(&err)
            })?;

        info!(
            order_id = %order.id,
            course_id = %request.course_id,
            amount_minor = order.amount_minor,
            "payment order created"
        );
        Ok(order)
    }

    async fn verify_payment(
        &self,
        request: VerifyPaymentRequest,
    ) -> Result<PaymentVerification, Error> {
        // Signature first: nothing is read or written for a forged callback,
        // and the response never reveals which part failed.
        if !verify_signature(
            &self.secret,
            &request.order_id,
            &request.payment_id,
            &request.signature,
        ) {
            warn!(
                order_id = %request.order_id,
                course_id = %request.course_id,
                "payment signature verification failed"
            );
            return Err(Error::verification_failed("payment verification failed"));
        }

        let course = self.require_course(&request.course_id).await?;

        // The amount recorded on the receipt comes from the provider's own
        // order record, never from the client callback.
        let order = self
            .provider
            .fetch_order(&request.order_id)
            .await
            .map_err(|err| {
                error!(error = %err, order_id = %request.order_id, "order lookup failed");
                map_provider_error(&err)
            })?;

        if let Some(existing) = self
            .enrollments
            .find(&request.user_id, &request.course_id)
            .await
            .map_err(map_repository_error)?
        {
            info!(
                order_id = %request.order_id,
                enrollment_id = %existing.id,
                "duplicate payment callback; enrollment already settled"
            );
            return Ok(PaymentVerification::AlreadyEnrolled);
        }

        let paid_at = Utc::now();
        let new_enrollment = NewEnrollment {
            user_id: request.user_id.clone(),
            course_id: request.course_id.clone(),
            started_at: paid_at,
            payment: Some(PaymentRecord {
                provider: PROVIDER_NAME.to_owned(),
                order_id: request.order_id.clone(),
                payment_id: request.payment_id.clone(),
                signature: request.signature.clone(),
                amount: order.amount_major(),
                currency: order.currency.clone(),
                status: PaymentStatus::Paid,
                paid_at,
            }),
        };
        let new_receipt = NewPaymentReceipt {
            user_id: request.user_id.clone(),
            course_id: request.course_id.clone(),
            order_id: request.order_id.clone(),
            payment_id: request.payment_id.clone(),
            amount: order.amount_major(),
            currency: order.currency.clone(),
            status: ReceiptStatus::Success,
        };

        match self
            .enrollments
            .create_with_receipt(&new_enrollment, &new_receipt)
            .await
        {
            Ok((enrollment, receipt, _stats)) => {
                info!(
                    order_id = %request.order_id,
                    enrollment_id = %enrollment.id,
                    receipt_id = %receipt.id,
                    "payment verified and enrollment settled"
                );
                Ok(PaymentVerification::Enrolled {
                    receipt: ReceiptView {
                        receipt_id: receipt.id,
                        payment_id: receipt.payment_id,
                        order_id: receipt.order_id,
                        amount: receipt.amount,
                        currency: receipt.currency,
                        course_name: course.name,
                        date: receipt.created_at,
                    },
                })
            }
            // Two callbacks for the same pair raced past the idempotency
            // read; the loser observes the winner's commit.
            Err(EnrollmentRepositoryError::DuplicateEnrollment) => {
                info!(
                    order_id = %request.order_id,
                    "concurrent payment callback already settled the enrollment"
                );
                Ok(PaymentVerification::AlreadyEnrolled)
            }
            Err(err) => Err(map_repository_error(err)),
        }
    }
}

#[cfg(test)]
#[path = "payment_service_tests.rs"]
mod tests;
