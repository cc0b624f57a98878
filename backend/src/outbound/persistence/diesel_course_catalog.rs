//! PostgreSQL-backed read-only course catalog using Diesel ORM.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CourseCatalog, CourseCatalogError};
use crate::domain::{Course, CourseId, CourseSummary};

use super::models::CourseRow;
use super::pool::{DbPool, PoolError};
use super::schema::courses;

/// Diesel-backed implementation of the `CourseCatalog` port.
#[derive(Clone)]
pub struct DieselCourseCatalog {
    pool: DbPool,
}

impl DieselCourseCatalog {
    /// Create a new catalog adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CourseCatalogError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            CourseCatalogError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CourseCatalogError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            CourseCatalogError::connection("database connection error")
        }
        _ => CourseCatalogError::query("database error"),
    }
}

fn row_to_course(row: CourseRow) -> Course {
    #[expect(
        clippy::cast_sign_loss,
        reason = "prices are non-negative in the database"
    )]
    let price = row.price as u32;
    Course {
        id: CourseId::from_uuid(row.id),
        name: row.name,
        logo: row.logo,
        category: row.category,
        duration: row.duration,
        instructor: row.instructor,
        rating: row.rating,
        price,
        link: row.link,
    }
}

#[async_trait]
impl CourseCatalog for DieselCourseCatalog {
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseCatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CourseRow> = courses::table
            .filter(courses::id.eq(id.as_uuid()))
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_course))
    }

    async fn summaries_by_ids(
        &self,
        ids: &[CourseId],
    ) -> Result<HashMap<CourseId, CourseSummary>, CourseCatalogError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = courses::table
            .filter(courses::id.eq_any(uuids))
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let course = row_to_course(row);
                (course.id.clone(), course.summary())
            })
            .collect())
    }
}
