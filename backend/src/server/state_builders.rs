//! Builders for HTTP state ports backed by real adapters or fixtures.

use std::sync::Arc;

use actix_web::web;

use backend::domain::ports::{
    EnrollmentCommand, EnrollmentQuery, FixtureEnrollmentCommand, FixtureEnrollmentQuery,
    FixturePaymentCommand, PaymentCommand,
};
use backend::domain::{EnrollmentService, PaymentService};
use backend::inbound::http::state::HttpState;
use backend::outbound::payments::RazorpayHttpProvider;
use backend::outbound::persistence::{DieselCourseCatalog, DieselEnrollmentRepository};

use super::ServerConfig;

type DieselEnrollmentService =
    EnrollmentService<DieselEnrollmentRepository, DieselEnrollmentRepository, DieselCourseCatalog>;

/// Build the enrollment command/query pair.
///
/// The Diesel repository backs both the enrollment ledger and the stats
/// counters, so one shared instance serves both ports when a pool is
/// configured. Without a pool the fixture implementations answer instead.
fn build_enrollment_pair(
    config: &ServerConfig,
) -> (Arc<dyn EnrollmentCommand>, Arc<dyn EnrollmentQuery>) {
    match &config.db_pool {
        Some(pool) => {
            let ledger = Arc::new(DieselEnrollmentRepository::new(pool.clone()));
            let catalog = Arc::new(DieselCourseCatalog::new(pool.clone()));
            let service: Arc<DieselEnrollmentService> =
                Arc::new(EnrollmentService::new(ledger.clone(), ledger, catalog));
            (
                service.clone() as Arc<dyn EnrollmentCommand>,
                service as Arc<dyn EnrollmentQuery>,
            )
        }
        None => (
            Arc::new(FixtureEnrollmentCommand),
            Arc::new(FixtureEnrollmentQuery),
        ),
    }
}

/// Build the payment command port.
///
/// Requires both a database pool (for the enrollment ledger) and payment
/// settings (provider endpoint plus signing secret); the fixture answers
/// when either is missing.
fn build_payment_command(
    config: &ServerConfig,
    provider: Option<RazorpayHttpProvider>,
) -> Arc<dyn PaymentCommand> {
    match (&config.db_pool, provider, &config.payments) {
        (Some(pool), Some(provider), Some(payments)) => {
            let ledger = Arc::new(DieselEnrollmentRepository::new(pool.clone()));
            let catalog = Arc::new(DieselCourseCatalog::new(pool.clone()));
            Arc::new(PaymentService::new(
                Arc::new(provider),
                ledger,
                catalog,
                payments.secret.clone(),
            ))
        }
        _ => Arc::new(FixturePaymentCommand),
    }
}

/// Build the shared HTTP state from configured ports and fixture fallbacks.
pub(super) fn build_http_state(
    config: &ServerConfig,
    provider: Option<RazorpayHttpProvider>,
) -> web::Data<HttpState> {
    let (enrollments, enrollments_query) = build_enrollment_pair(config);
    let payments = build_payment_command(config, provider);

    web::Data::new(HttpState::new(enrollments, enrollments_query, payments))
}
