//! Read-only port onto the catalog store.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{Course, CourseId, CourseSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalog adapters.
    pub enum CourseCatalogError {
        /// Catalog backend could not be reached.
        Connection { message: String } => "course catalog connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } => "course catalog query failed: {message}",
    }
}

/// Port for course lookups. This core never writes to the catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// Fetch a full course record by id.
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseCatalogError>;

    /// Fetch listing projections for a batch of ids.
    ///
    /// Ids that no longer resolve are simply absent from the result; callers
    /// must tolerate enrollments whose course has been deleted.
    async fn summaries_by_ids(
        &self,
        ids: &[CourseId],
    ) -> Result<HashMap<CourseId, CourseSummary>, CourseCatalogError>;
}

/// Fixture catalog with no courses, for tests that don't exercise lookups.
#[derive(Debug, Default)]
pub struct FixtureCourseCatalog;

#[async_trait]
impl CourseCatalog for FixtureCourseCatalog {
    async fn find_by_id(&self, _id: &CourseId) -> Result<Option<Course>, CourseCatalogError> {
        Ok(None)
    }

    async fn summaries_by_ids(
        &self,
        _ids: &[CourseId],
    ) -> Result<HashMap<CourseId, CourseSummary>, CourseCatalogError> {
        Ok(HashMap::new())
    }
}
