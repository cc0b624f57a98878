//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer, never exposed to the
//! domain. They exist solely to satisfy Diesel's type requirements for
//! queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{courses, enrollments, payment_receipts, user_stats};

/// Row struct for reading from the courses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub name: String,
    pub logo: String,
    pub category: String,
    pub duration: String,
    pub instructor: String,
    pub rating: f32,
    pub price: i32,
    pub link: Option<String>,
    #[expect(dead_code, reason = "schema field not consumed by catalog reads")]
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the enrollments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = enrollments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EnrollmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub status: String,
    pub progress: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub certificate_url: Option<String>,
    pub payment: Option<serde_json::Value>,
}

/// Insertable struct for creating enrollment rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = enrollments)]
pub(crate) struct NewEnrollmentRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub status: &'a str,
    pub progress: i32,
    pub started_at: DateTime<Utc>,
    pub payment: Option<&'a serde_json::Value>,
}

/// Row struct for reading from the payment_receipts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payment_receipts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReceiptRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub enrollment_id: Uuid,
    pub order_id: String,
    pub payment_id: String,
    pub amount: i32,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for writing receipt rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payment_receipts)]
pub(crate) struct NewReceiptRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub enrollment_id: Uuid,
    pub order_id: &'a str,
    pub payment_id: &'a str,
    pub amount: i32,
    pub currency: &'a str,
    pub status: &'a str,
}

/// Row struct for reading from the user_stats table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_stats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserStatsRow {
    #[expect(dead_code, reason = "key column; reads are already user-scoped")]
    pub user_id: Uuid,
    pub courses_enrolled: i32,
    pub courses_completed: i32,
    pub certificates_earned: i32,
    pub study_hours: i32,
    #[expect(dead_code, reason = "audit column maintained by the adapter")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable/changeset struct for upserting user_stats rows.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = user_stats)]
pub(crate) struct UserStatsUpsert {
    pub user_id: Uuid,
    pub courses_enrolled: i32,
    pub courses_completed: i32,
    pub certificates_earned: i32,
    pub study_hours: i32,
    pub updated_at: DateTime<Utc>,
}
