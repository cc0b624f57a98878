//! Driving port for enrollment mutations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{CourseId, Enrollment, Error, Progress, UserId, UserStats};

use super::enrollment_query::EnrollmentView;

/// Request to enroll a user on a free course.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollFreeRequest {
    pub user_id: UserId,
    pub course_id: CourseId,
}

/// Response to a free enrollment.
///
/// `already_enrolled` distinguishes the idempotent replay from first
/// creation; both are successes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollResponse {
    pub enrollment: Enrollment,
    pub already_enrolled: bool,
}

/// Request to record course progress.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProgressRequest {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub progress: Progress,
}

/// Response to a progress update: the updated enrollment joined with its
/// course plus a fresh stats snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressResponse {
    pub enrollment: EnrollmentView,
    pub stats: UserStats,
}

/// Use-case port for enrollment mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentCommand: Send + Sync {
    /// Enroll a user on a free course; idempotent for an existing pair.
    async fn enroll_free(&self, request: EnrollFreeRequest) -> Result<EnrollResponse, Error>;

    /// Record progress against an existing enrollment.
    async fn update_progress(
        &self,
        request: UpdateProgressRequest,
    ) -> Result<UpdateProgressResponse, Error>;

    /// Remove all enrollments for a user as part of account deletion.
    /// Returns the number of enrollments removed.
    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, Error>;
}

/// Fixture command that reports every course and enrollment as missing.
#[derive(Debug, Default)]
pub struct FixtureEnrollmentCommand;

#[async_trait]
impl EnrollmentCommand for FixtureEnrollmentCommand {
    async fn enroll_free(&self, request: EnrollFreeRequest) -> Result<EnrollResponse, Error> {
        Err(Error::not_found(format!(
            "course {} not found",
            request.course_id
        )))
    }

    async fn update_progress(
        &self,
        request: UpdateProgressRequest,
    ) -> Result<UpdateProgressResponse, Error> {
        Err(Error::not_found(format!(
            "enrollment not found for course {}",
            request.course_id
        )))
    }

    async fn delete_for_user(&self, _user_id: &UserId) -> Result<u64, Error> {
        Ok(0)
    }
}
