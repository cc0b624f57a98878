//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    EnrollmentCommand, EnrollmentQuery, FixtureEnrollmentCommand, FixtureEnrollmentQuery,
    FixturePaymentCommand, PaymentCommand,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub enrollments: Arc<dyn EnrollmentCommand>,
    pub enrollments_query: Arc<dyn EnrollmentQuery>,
    pub payments: Arc<dyn PaymentCommand>,
}

impl HttpState {
    /// Construct state from the port implementations.
    pub fn new(
        enrollments: Arc<dyn EnrollmentCommand>,
        enrollments_query: Arc<dyn EnrollmentQuery>,
        payments: Arc<dyn PaymentCommand>,
    ) -> Self {
        Self {
            enrollments,
            enrollments_query,
            payments,
        }
    }
}

impl Default for HttpState {
    /// Fixture-backed state for tests and servers with no storage wired.
    fn default() -> Self {
        Self {
            enrollments: Arc::new(FixtureEnrollmentCommand),
            enrollments_query: Arc::new(FixtureEnrollmentQuery),
            payments: Arc::new(FixturePaymentCommand),
        }
    }
}
