//! Driving port for enrollment listings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CourseSummary, Enrollment, Error, UserId};

/// Enrollment joined with its course projection.
///
/// `course` is `None` when the referenced course no longer exists in the
/// catalog; listings tolerate this rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    pub enrollment: Enrollment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<CourseSummary>,
}

/// Completed-course listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCourseView {
    pub course: CourseSummary,
    pub completed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
}

/// Why a completed-course listing came back empty.
///
/// The two cases are deliberately distinct for diagnostic clarity: "nothing
/// completed yet" and "completions exist but their courses were deleted"
/// should not read the same to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CompletedListNotice {
    /// The user has not completed any course.
    NoneCompleted,
    /// Completed enrollments exist, but every referenced course is gone.
    CoursesUnavailable,
}

impl CompletedListNotice {
    /// User-facing message for the notice.
    pub fn message(self) -> &'static str {
        match self {
            Self::NoneCompleted => "You have not completed any courses yet",
            Self::CoursesUnavailable => "Your completed courses are no longer available",
        }
    }
}

/// Completed-course listing with an optional empty-result notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCourses {
    pub courses: Vec<CompletedCourseView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<CompletedListNotice>,
}

/// Use-case port for enrollment listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentQuery: Send + Sync {
    /// Enrollments that are not yet completed, joined with course data.
    async fn list_active(&self, user_id: &UserId) -> Result<Vec<EnrollmentView>, Error>;

    /// Completed enrollments joined with course data; entries whose course
    /// was deleted are filtered out and reported via the notice.
    async fn list_completed(&self, user_id: &UserId) -> Result<CompletedCourses, Error>;
}

/// Fixture query returning empty listings.
#[derive(Debug, Default)]
pub struct FixtureEnrollmentQuery;

#[async_trait]
impl EnrollmentQuery for FixtureEnrollmentQuery {
    async fn list_active(&self, _user_id: &UserId) -> Result<Vec<EnrollmentView>, Error> {
        Ok(Vec::new())
    }

    async fn list_completed(&self, _user_id: &UserId) -> Result<CompletedCourses, Error> {
        Ok(CompletedCourses {
            courses: Vec::new(),
            notice: Some(CompletedListNotice::NoneCompleted),
        })
    }
}
