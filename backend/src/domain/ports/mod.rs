//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports describe how the domain reaches collaborators (catalog,
//! ledger storage, payment provider); driving ports are the use-case
//! contracts inbound adapters call. Each port carries a strongly typed error
//! enum so adapters map failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod course_catalog;
mod enrollment_command;
mod enrollment_query;
mod enrollment_repository;
mod payment_command;
mod payment_provider;
mod user_stats_repository;

#[cfg(test)]
pub use course_catalog::MockCourseCatalog;
pub use course_catalog::{CourseCatalog, CourseCatalogError, FixtureCourseCatalog};
#[cfg(test)]
pub use enrollment_command::MockEnrollmentCommand;
pub use enrollment_command::{
    EnrollFreeRequest, EnrollResponse, EnrollmentCommand, FixtureEnrollmentCommand,
    UpdateProgressRequest, UpdateProgressResponse,
};
#[cfg(test)]
pub use enrollment_query::MockEnrollmentQuery;
pub use enrollment_query::{
    CompletedCourseView, CompletedCourses, CompletedListNotice, EnrollmentQuery, EnrollmentView,
    FixtureEnrollmentQuery,
};
#[cfg(test)]
pub use enrollment_repository::MockEnrollmentRepository;
pub use enrollment_repository::{
    CompletionResult, EnrollmentRepository, EnrollmentRepositoryError,
};
#[cfg(test)]
pub use payment_command::MockPaymentCommand;
pub use payment_command::{
    CreateOrderRequest, FixturePaymentCommand, PaymentCommand, PaymentVerification,
    VerifyPaymentRequest,
};
#[cfg(test)]
pub use payment_provider::MockPaymentProvider;
pub use payment_provider::{
    OrderNotes, OrderRequest, PaymentProvider, PaymentProviderError, ProviderOrder,
};
#[cfg(test)]
pub use user_stats_repository::MockUserStatsRepository;
pub use user_stats_repository::{
    FixtureUserStatsRepository, UserStatsRepository, UserStatsRepositoryError,
};
