//! Enrollment domain services.
//!
//! Implements the enrollment driving ports: free enrollment, listings, and
//! progress updates, enforcing the status state machine and keeping the
//! user's counters consistent with every transition. All storage-visible
//! atomicity lives behind the [`EnrollmentRepository`] port; this service
//! decides *what* transition applies, the adapter commits it as one unit.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{
    CompletedCourseView, CompletedCourses, CompletedListNotice, CompletionResult, CourseCatalog,
    CourseCatalogError, EnrollFreeRequest, EnrollResponse, EnrollmentCommand, EnrollmentQuery,
    EnrollmentRepository, EnrollmentRepositoryError, EnrollmentView, UpdateProgressRequest,
    UpdateProgressResponse, UserStatsRepository, UserStatsRepositoryError,
};
use crate::domain::{
    CourseId, CourseSummary, Enrollment, EnrollmentStatus, Error, NewEnrollment, UserId, UserStats,
};

fn map_repository_error(error: EnrollmentRepositoryError) -> Error {
    match error {
        EnrollmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("enrollment ledger unavailable: {message}"))
        }
        EnrollmentRepositoryError::Query { message } => {
            Error::internal(format!("enrollment ledger error: {message}"))
        }
        EnrollmentRepositoryError::DuplicateEnrollment => {
            // Only reachable when the insert raced past the existence
            // pre-check; the caller translates per operation.
            Error::conflict("enrollment already exists for this user and course")
        }
    }
}

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

fn map_stats_error(error: UserStatsRepositoryError) -> Error {
    match error {
        UserStatsRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user stats unavailable: {message}"))
        }
        UserStatsRepositoryError::Query { message } => {
            Error::internal(format!("user stats error: {message}"))
        }
    }
}

/// Enrollment service implementing the enrollment driving ports.
#[derive(Clone)]
pub struct EnrollmentService<R, S, C> {
    enrollments: Arc<R>,
    stats: Arc<S>,
    catalog: Arc<C>,
}

impl<R, S, C> EnrollmentService<R, S, C> {
    /// Create a new service over the ledger, stats, and catalog ports.
    pub fn new(enrollments: Arc<R>, stats: Arc<S>, catalog: Arc<C>) -> Self {
        Self {
            enrollments,
            stats,
            catalog,
        }
    }
}

impl<R, S, C> EnrollmentService<R, S, C>
where
    R: EnrollmentRepository,
    S: UserStatsRepository,
    C: CourseCatalog,
{
    async fn course_summaries(
        &self,
        ids: &[CourseId],
    ) -> Result<HashMap<CourseId, CourseSummary>, Error> {
        self.catalog
            .summaries_by_ids(ids)
            .await
            .map_err(map_catalog_error)
    }

    async fn join_course(&self, enrollment: Enrollment) -> Result<EnrollmentView, Error> {
        let mut summaries = self
            .course_summaries(std::slice::from_ref(&enrollment.course_id))
            .await?;
        let course = summaries.remove(&enrollment.course_id);
        Ok(EnrollmentView { enrollment, course })
    }

    async fn progress_response(
        &self,
        enrollment: Enrollment,
        stats: UserStats,
    ) -> Result<UpdateProgressResponse, Error> {
        let view = self.join_course(enrollment).await?;
        Ok(UpdateProgressResponse {
            enrollment: view,
            stats,
        })
    }

    /// Plain progress write for updates that fire no completion side effect.
    async fn write_progress(
        &self,
        request: &UpdateProgressRequest,
        status: EnrollmentStatus,
    ) -> Result<UpdateProgressResponse, Error> {
        let updated = self
            .enrollments
            .set_progress(
                &request.user_id,
                &request.course_id,
                request.progress,
                status,
            )
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "enrollment not found for course {}",
                    request.course_id
                ))
            })?;

        let stats = self
            .stats
            .fetch(&request.user_id)
            .await
            .map_err(map_stats_error)?;
        self.progress_response(updated, stats).await
    }
}

#[async_trait]
impl<R, S, C> EnrollmentCommand for EnrollmentService<R, S, C>
where
    R: EnrollmentRepository,
    S: UserStatsRepository,
    C: CourseCatalog,
{
    async fn enroll_free(&self, request: EnrollFreeRequest) -> Result<EnrollResponse, Error> {
        let course = self
            .catalog
            .find_by_id(&request.course_id)
            .await
            .map_err(map_catalog_error)?
            .ok_or_else(|| Error::not_found(format!("course {} not found", request.course_id)))?;

        if course.is_paid() {
            return Err(Error::payment_required(
                "this course requires payment; complete checkout to enroll",
            ));
        }

        if let Some(existing) = self
            .enrollments
            .find(&request.user_id, &request.course_id)
            .await
            .map_err(map_repository_error)?
        {
            return Ok(EnrollResponse {
                enrollment: existing,
                already_enrolled: true,
            });
        }

        let new = NewEnrollment {
            user_id: request.user_id.clone(),
            course_id: request.course_id.clone(),
            started_at: Utc::now(),
            payment: None,
        };

        match self.enrollments.create(&new).await {
            Ok((enrollment, _stats)) => Ok(EnrollResponse {
                enrollment,
                already_enrolled: false,
            }),
            // The uniqueness constraint fired after the pre-check passed: a
            // true race, surfaced as a conflict rather than silently read
            // back.
            Err(EnrollmentRepositoryError::DuplicateEnrollment) => Err(Error::conflict(
                "user was enrolled concurrently; retry to fetch the enrollment",
            )),
            Err(err) => Err(map_repository_error(err)),
        }
    }

    async fn update_progress(
        &self,
        request: UpdateProgressRequest,
    ) -> Result<UpdateProgressResponse, Error> {
        let current = self
            .enrollments
            .find(&request.user_id, &request.course_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "enrollment not found for course {}",
                    request.course_id
                ))
            })?;

        let plan = current.status.plan_progress(request.progress);

        if !plan.completes {
            return self.write_progress(&request, plan.status).await;
        }

        match self
            .enrollments
            .complete(&request.user_id, &request.course_id, Utc::now())
            .await
            .map_err(map_repository_error)?
        {
            CompletionResult::Applied { enrollment, stats } => {
                self.progress_response(enrollment, stats).await
            }
            // A concurrent writer completed first; the side effects already
            // fired exactly once, so this update degrades to a plain write.
            CompletionResult::AlreadyCompleted { .. } => {
                self.write_progress(&request, EnrollmentStatus::Completed)
                    .await
            }
            CompletionResult::Missing => Err(Error::not_found(format!(
                "enrollment not found for course {}",
                request.course_id
            ))),
        }
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, Error> {
        self.enrollments
            .delete_for_user(user_id)
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<R, S, C> EnrollmentQuery for EnrollmentService<R, S, C>
where
    R: EnrollmentRepository,
    S: UserStatsRepository,
    C: CourseCatalog,
{
    async fn list_active(&self, user_id: &UserId) -> Result<Vec<EnrollmentView>, Error> {
        let enrollments = self
            .enrollments
            .list_for_user(user_id)
            .await
            .map_err(map_repository_error)?;

        let active: Vec<Enrollment> = enrollments
            .into_iter()
            .filter(|e| e.status != EnrollmentStatus::Completed)
            .collect();

        let ids: Vec<CourseId> = active.iter().map(|e| e.course_id.clone()).collect();
        let mut summaries = self.course_summaries(&ids).await?;

        Ok(active
            .into_iter()
            .map(|enrollment| {
                let course = summaries.remove(&enrollment.course_id);
                EnrollmentView { enrollment, course }
            })
            .collect())
    }

    async fn list_completed(&self, user_id: &UserId) -> Result<CompletedCourses, Error> {
        let enrollments = self
            .enrollments
            .list_for_user(user_id)
            .await
            .map_err(map_repository_error)?;

        let completed: Vec<Enrollment> = enrollments
            .into_iter()
            .filter(|e| e.status == EnrollmentStatus::Completed)
            .collect();

        if completed.is_empty() {
            return Ok(CompletedCourses {
                courses: Vec::new(),
                notice: Some(CompletedListNotice::NoneCompleted),
            });
        }

        let ids: Vec<CourseId> = completed.iter().map(|e| e.course_id.clone()).collect();
        let mut summaries = self.course_summaries(&ids).await?;

        let courses: Vec<CompletedCourseView> = completed
            .into_iter()
            .filter_map(|enrollment| {
                let course = summaries.remove(&enrollment.course_id)?;
                Some(CompletedCourseView {
                    course,
                    completed_at: enrollment.completed_at.unwrap_or(enrollment.started_at),
                    certificate_url: enrollment.certificate_url,
                })
            })
            .collect();

        let notice = courses
            .is_empty()
            .then_some(CompletedListNotice::CoursesUnavailable);

        Ok(CompletedCourses { courses, notice })
    }
}

#[cfg(test)]
#[path = "enrollment_service_tests.rs"]
mod tests;
