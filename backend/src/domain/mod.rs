//! Core domain for the enrollment ledger and payment reconciler.
//!
//! Transport and storage agnostic: entities, the status state machine,
//! signature verification, and the services implementing the driving ports.
//! Everything beyond this module is an adapter.

mod course;
mod enrollment;
mod enrollment_service;
mod error;
pub mod ports;
mod payment_service;
mod receipt;
pub mod signature;
pub mod stats;
mod user;

pub use course::{Course, CourseId, CourseIdValidationError, CourseSummary};
pub use enrollment::{
    Enrollment, EnrollmentStatus, NewEnrollment, PaymentRecord, PaymentStatus, Progress,
    ProgressPlan, ProgressValidationError, UnknownStatusError,
};
pub use enrollment_service::EnrollmentService;
pub use error::{Error, ErrorCode};
pub use payment_service::PaymentService;
pub use receipt::{NewPaymentReceipt, PaymentReceipt, ReceiptStatus, ReceiptView};
pub use user::{UserId, UserIdValidationError, UserStats};
