//! Persistence port for the enrollment ledger.
//!
//! The operations that pair an enrollment write with a stats delta or a
//! receipt are single port calls, so the adapter owns the transaction scope
//! and a caller can never observe one half of the pair.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CourseId, Enrollment, NewEnrollment, NewPaymentReceipt, PaymentReceipt, Progress, UserId,
    UserStats,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by enrollment ledger adapters.
    pub enum EnrollmentRepositoryError {
        /// Ledger backend could not be reached.
        Connection { message: String } => "enrollment ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "enrollment ledger query failed: {message}",
        /// The (user, course) uniqueness constraint fired on insert.
        DuplicateEnrollment => "enrollment already exists for this user and course",
    }
}

/// Result of an atomic completion commit.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionResult {
    /// The enrollment transitioned into completed and the stats delta was
    /// applied in the same unit.
    Applied {
        enrollment: Enrollment,
        stats: UserStats,
    },
    /// A concurrent writer completed first; no side effects were applied.
    AlreadyCompleted { enrollment: Enrollment },
    /// No enrollment exists for the pair.
    Missing,
}

/// Port for enrollment ledger storage.
///
/// ## Atomicity contract
///
/// - [`create`](EnrollmentRepository::create) inserts the enrollment and
///   applies [`StatsDelta::ENROLL`](crate::domain::stats::StatsDelta::ENROLL)
///   as one unit, or fails with `DuplicateEnrollment` leaving both untouched.
/// - [`create_with_receipt`](EnrollmentRepository::create_with_receipt)
///   additionally writes the receipt in the same unit; a receipt never exists
///   without its enrollment.
/// - [`complete`](EnrollmentRepository::complete) commits only where the
///   current status is not already completed, so the completion side effects
///   fire exactly once under concurrent updates.
/// - [`set_progress`](EnrollmentRepository::set_progress) always writes the
///   progress value but never downgrades a completed status, preserving
///   status monotonicity when racing a completion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Fetch the enrollment for a (user, course) pair.
    async fn find(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, EnrollmentRepositoryError>;

    /// List all enrollments for a user.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Enrollment>, EnrollmentRepositoryError>;

    /// Insert a fresh enrollment and increment the user's enrolled counter
    /// atomically. Returns the created row and the fresh stats snapshot.
    async fn create(
        &self,
        new: &NewEnrollment,
    ) -> Result<(Enrollment, UserStats), EnrollmentRepositoryError>;

    /// Insert a fresh paid enrollment together with its receipt and the
    /// stats increment, all in one unit.
    async fn create_with_receipt(
        &self,
        new: &NewEnrollment,
        receipt: &NewPaymentReceipt,
    ) -> Result<(Enrollment, PaymentReceipt, UserStats), EnrollmentRepositoryError>;

    /// Transition the enrollment into completed where it is not already,
    /// applying the completion stats delta in the same unit.
    async fn complete(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        completed_at: DateTime<Utc>,
    ) -> Result<CompletionResult, EnrollmentRepositoryError>;

    /// Write a progress value (and status, unless the row is completed).
    /// Returns `None` when no enrollment exists for the pair.
    async fn set_progress(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        progress: Progress,
        status: crate::domain::EnrollmentStatus,
    ) -> Result<Option<Enrollment>, EnrollmentRepositoryError>;

    /// Remove all enrollments for a user (cascading user deletion).
    /// Returns the number of rows removed.
    async fn delete_for_user(&self, user_id: &UserId)
        -> Result<u64, EnrollmentRepositoryError>;
}
