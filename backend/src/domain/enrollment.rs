//! Enrollment entity and its status state machine.
//!
//! An enrollment binds one user to one course; the `(user_id, course_id)`
//! pair is unique in storage. Status moves monotonically toward `Completed`
//! (explicit cancellation aside) and `completed_at` is set exactly once, on
//! the first transition into `Completed`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{CourseId, UserId};

/// Lifecycle status of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EnrollmentStatus {
    /// Created, no progress recorded yet.
    Enrolled,
    /// Some progress recorded, not yet complete.
    InProgress,
    /// Progress reached 100; terminal apart from the raw progress value.
    Completed,
    /// Explicitly cancelled; not reflected in user counters.
    Cancelled,
}

impl EnrollmentStatus {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enrolled => "enrolled",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the storage representation.
    pub fn parse(value: &str) -> Result<Self, UnknownStatusError> {
        match value {
            "enrolled" => Ok(Self::Enrolled),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatusError {
                value: other.to_owned(),
            }),
        }
    }

    /// Plan the transition for a new progress value.
    ///
    /// Encodes the progress table: a completed enrollment never leaves
    /// `Completed` and never re-fires completion side effects; progress of
    /// zero leaves the status untouched; 1–99 moves to `InProgress`; 100
    /// completes.
    pub fn plan_progress(self, progress: Progress) -> ProgressPlan {
        if self == Self::Completed {
            return ProgressPlan {
                status: Self::Completed,
                completes: false,
            };
        }
        if progress.is_complete() {
            return ProgressPlan {
                status: Self::Completed,
                completes: true,
            };
        }
        if progress.value() > 0 {
            return ProgressPlan {
                status: Self::InProgress,
                completes: false,
            };
        }
        ProgressPlan {
            status: self,
            completes: false,
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when storage holds an unrecognised status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown enrollment status: {value}")]
pub struct UnknownStatusError {
    /// The unrecognised value.
    pub value: String,
}

/// Outcome of planning a progress update against the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPlan {
    /// Status the enrollment should carry after the update.
    pub status: EnrollmentStatus,
    /// Whether this update fires the one-time completion side effects.
    pub completes: bool,
}

/// Validation error for [`Progress`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("progress must be an integer between 0 and 100, got {value}")]
pub struct ProgressValidationError {
    /// The rejected input value.
    pub value: i64,
}

/// Course progress percentage, validated to the closed range [0, 100].
///
/// Out-of-range input is rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Progress(u8);

impl Progress {
    /// No progress recorded.
    pub const ZERO: Self = Self(0);
    /// Fully complete.
    pub const COMPLETE: Self = Self(100);

    /// Validate and construct a progress value.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressValidationError`] when `value` is outside [0, 100].
    pub fn new(value: i64) -> Result<Self, ProgressValidationError> {
        if !(0..=100).contains(&value) {
            return Err(ProgressValidationError { value });
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self(value as u8))
    }

    /// The percentage as an integer in [0, 100].
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether this value represents full completion.
    pub fn is_complete(self) -> bool {
        self.0 == 100
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Progress> for i64 {
    fn from(value: Progress) -> Self {
        Self::from(value.0)
    }
}

impl TryFrom<i64> for Progress {
    type Error = ProgressValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Settlement state of an embedded payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Parse the storage representation.
    pub fn parse(value: &str) -> Result<Self, UnknownStatusError> {
        match value {
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownStatusError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Payment details embedded in a paid enrollment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Payment provider identifier (e.g. `razorpay`).
    pub provider: String,
    /// Provider-issued order id.
    pub order_id: String,
    /// Provider-issued payment id.
    pub payment_id: String,
    /// Signature supplied with the provider callback. Stored for audit,
    /// never returned to clients.
    pub signature: String,
    /// Amount in major currency units, as reported by the provider.
    pub amount: u32,
    /// ISO currency code.
    pub currency: String,
    /// Settlement state.
    pub status: PaymentStatus,
    /// When the payment was confirmed.
    pub paid_at: DateTime<Utc>,
}

/// The enrollment ledger entry binding a user to a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// Surrogate ledger key.
    pub id: Uuid,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
    pub progress: Progress,
    pub started_at: DateTime<Utc>,
    /// Set exactly once, on the first transition into `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
    /// Present on enrollments created through payment reconciliation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentRecord>,
}

/// Fields needed to create an enrollment; status and progress are derived
/// (`Enrolled`, zero) on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEnrollment {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub started_at: DateTime<Utc>,
    pub payment: Option<PaymentRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-1)]
    #[case(101)]
    #[case(150)]
    #[case(i64::MIN)]
    fn progress_rejects_out_of_range(#[case] value: i64) {
        let err = Progress::new(value).expect_err("out of range rejected");
        assert_eq!(err.value, value);
    }

    #[rstest]
    #[case(0)]
    #[case(50)]
    #[case(100)]
    fn progress_accepts_in_range(#[case] value: i64) {
        let progress = Progress::new(value).expect("in range accepted");
        assert_eq!(i64::from(progress.value()), value);
    }

    #[test]
    fn status_round_trips_storage_form() {
        for status in [
            EnrollmentStatus::Enrolled,
            EnrollmentStatus::InProgress,
            EnrollmentStatus::Completed,
            EnrollmentStatus::Cancelled,
        ] {
            assert_eq!(EnrollmentStatus::parse(status.as_str()), Ok(status));
        }
        assert!(EnrollmentStatus::parse("archived").is_err());
    }

    #[rstest]
    #[case(EnrollmentStatus::Enrolled, 0, EnrollmentStatus::Enrolled, false)]
    #[case(EnrollmentStatus::InProgress, 0, EnrollmentStatus::InProgress, false)]
    #[case(EnrollmentStatus::Enrolled, 1, EnrollmentStatus::InProgress, false)]
    #[case(EnrollmentStatus::Enrolled, 99, EnrollmentStatus::InProgress, false)]
    #[case(EnrollmentStatus::InProgress, 55, EnrollmentStatus::InProgress, false)]
    #[case(EnrollmentStatus::Enrolled, 100, EnrollmentStatus::Completed, true)]
    #[case(EnrollmentStatus::InProgress, 100, EnrollmentStatus::Completed, true)]
    fn plan_progress_follows_transition_table(
        #[case] current: EnrollmentStatus,
        #[case] progress: i64,
        #[case] expected_status: EnrollmentStatus,
        #[case] expected_completes: bool,
    ) {
        let plan = current.plan_progress(Progress::new(progress).expect("valid"));
        assert_eq!(plan.status, expected_status);
        assert_eq!(plan.completes, expected_completes);
    }

    #[rstest]
    #[case(0)]
    #[case(40)]
    #[case(100)]
    fn completed_enrollment_never_leaves_completed(#[case] progress: i64) {
        let plan =
            EnrollmentStatus::Completed.plan_progress(Progress::new(progress).expect("valid"));
        assert_eq!(plan.status, EnrollmentStatus::Completed);
        assert!(!plan.completes, "completion side effects must not re-fire");
    }
}
