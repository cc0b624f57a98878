//! PostgreSQL-backed enrollment ledger using Diesel ORM.
//!
//! Implements both `EnrollmentRepository` and `UserStatsRepository`. The
//! paired writes (enrollment plus stats delta, enrollment plus receipt) run
//! inside single transactions, and completion takes a `FOR UPDATE` lock on
//! the enrollment row so the side effects commit exactly once under
//! concurrent updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    CompletionResult, EnrollmentRepository, EnrollmentRepositoryError, UserStatsRepository,
    UserStatsRepositoryError,
};
use crate::domain::stats::StatsDelta;
use crate::domain::{
    CourseId, Enrollment, EnrollmentStatus, NewEnrollment, NewPaymentReceipt, PaymentReceipt,
    Progress, ReceiptStatus, UserId, UserStats,
};

use super::models::{
    EnrollmentRow, NewEnrollmentRow, NewReceiptRow, ReceiptRow, UserStatsRow, UserStatsUpsert,
};
use super::pool::{DbPool, PoolError};
use super::schema::{enrollments, payment_receipts, user_stats};

/// Diesel-backed implementation of the enrollment ledger ports.
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    pool: DbPool,
}

impl DieselEnrollmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EnrollmentRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            EnrollmentRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> EnrollmentRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            EnrollmentRepositoryError::DuplicateEnrollment
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            EnrollmentRepositoryError::connection("database connection error")
        }
        DieselError::NotFound => EnrollmentRepositoryError::query("record not found"),
        _ => EnrollmentRepositoryError::query("database error"),
    }
}

/// Transaction-internal error that threads both Diesel failures and already
/// mapped domain failures out of the closure.
enum TxError {
    Diesel(diesel::result::Error),
    Mapped(EnrollmentRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn unwrap_tx_error(error: TxError) -> EnrollmentRepositoryError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::Mapped(error) => error,
    }
}

fn row_to_enrollment(row: EnrollmentRow) -> Result<Enrollment, EnrollmentRepositoryError> {
    let status = EnrollmentStatus::parse(&row.status)
        .map_err(|err| EnrollmentRepositoryError::query(err.to_string()))?;
    let progress = Progress::new(i64::from(row.progress))
        .map_err(|err| EnrollmentRepositoryError::query(err.to_string()))?;
    let payment = row
        .payment
        .map(serde_json::from_value)
        .transpose()
        .map_err(|err| {
            EnrollmentRepositoryError::query(format!("invalid payment record: {err}"))
        })?;

    Ok(Enrollment {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        course_id: CourseId::from_uuid(row.course_id),
        status,
        progress,
        started_at: row.started_at,
        completed_at: row.completed_at,
        certificate_url: row.certificate_url,
        payment,
    })
}

fn row_to_receipt(row: ReceiptRow) -> Result<PaymentReceipt, EnrollmentRepositoryError> {
    let status = ReceiptStatus::parse(&row.status)
        .map_err(|err| EnrollmentRepositoryError::query(err.to_string()))?;
    #[expect(
        clippy::cast_sign_loss,
        reason = "receipt amounts are non-negative in the database"
    )]
    let amount = row.amount as u32;
    Ok(PaymentReceipt {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        course_id: CourseId::from_uuid(row.course_id),
        enrollment_id: row.enrollment_id,
        order_id: row.order_id,
        payment_id: row.payment_id,
        amount,
        currency: row.currency,
        status,
        created_at: row.created_at,
    })
}

#[expect(
    clippy::cast_sign_loss,
    reason = "counters are non-negative in the database"
)]
fn row_to_stats(row: &UserStatsRow) -> UserStats {
    UserStats {
        courses_enrolled: row.courses_enrolled as u32,
        courses_completed: row.courses_completed as u32,
        certificates_earned: row.certificates_earned as u32,
        study_hours: row.study_hours as u32,
    }
}

#[expect(
    clippy::cast_possible_wrap,
    reason = "counter values stay far below i32::MAX"
)]
fn stats_upsert(user_id: Uuid, stats: UserStats) -> UserStatsUpsert {
    UserStatsUpsert {
        user_id,
        courses_enrolled: stats.courses_enrolled as i32,
        courses_completed: stats.courses_completed as i32,
        certificates_earned: stats.certificates_earned as i32,
        study_hours: stats.study_hours as i32,
        updated_at: Utc::now(),
    }
}

/// Read the user's counters inside a transaction, locking the row when it
/// exists. Missing rows read as zeroed counters.
async fn locked_stats(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
) -> Result<UserStats, diesel::result::Error> {
    let row: Option<UserStatsRow> = user_stats::table
        .filter(user_stats::user_id.eq(user_id))
        .for_update()
        .select(UserStatsRow::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(row.as_ref().map(row_to_stats).unwrap_or_default())
}

/// Apply a stats delta and upsert the resulting snapshot.
async fn apply_stats_delta(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    delta: StatsDelta,
) -> Result<UserStats, diesel::result::Error> {
    let next = locked_stats(conn, user_id).await?.apply(delta);
    let upsert = stats_upsert(user_id, next);
    diesel::insert_into(user_stats::table)
        .values(&upsert)
        .on_conflict(user_stats::user_id)
        .do_update()
        .set(&upsert)
        .execute(conn)
        .await?;
    Ok(next)
}

fn new_enrollment_row<'a>(
    new: &'a NewEnrollment,
    id: Uuid,
    payment_json: Option<&'a serde_json::Value>,
) -> NewEnrollmentRow<'a> {
    NewEnrollmentRow {
        id,
        user_id: *new.user_id.as_uuid(),
        course_id: *new.course_id.as_uuid(),
        status: EnrollmentStatus::Enrolled.as_str(),
        progress: 0,
        started_at: new.started_at,
        payment: payment_json,
    }
}

fn payment_json(new: &NewEnrollment) -> Result<Option<serde_json::Value>, EnrollmentRepositoryError> {
    new.payment
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|err| {
            EnrollmentRepositoryError::query(format!("payment record not serializable: {err}"))
        })
}

async fn find_row(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<Option<EnrollmentRow>, diesel::result::Error> {
    enrollments::table
        .filter(enrollments::user_id.eq(user_id))
        .filter(enrollments::course_id.eq(course_id))
        .select(EnrollmentRow::as_select())
        .first(conn)
        .await
        .optional()
}

#[async_trait]
impl EnrollmentRepository for DieselEnrollmentRepository {
    async fn find(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = find_row(&mut conn, *user_id.as_uuid(), *course_id.as_uuid())
            .await
            .map_err(map_diesel_error)?;
        row.map(row_to_enrollment).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Enrollment>, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<EnrollmentRow> = enrollments::table
            .filter(enrollments::user_id.eq(user_id.as_uuid()))
            .order(enrollments::started_at.desc())
            .select(EnrollmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_enrollment).collect()
    }

    async fn create(
        &self,
        new: &NewEnrollment,
    ) -> Result<(Enrollment, UserStats), EnrollmentRepositoryError> {
        let payment = payment_json(new)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_uuid = *new.user_id.as_uuid();

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let row: EnrollmentRow =
                    diesel::insert_into(enrollments::table)
                        .values(new_enrollment_row(new, Uuid::new_v4(), payment.as_ref()))
                        .get_result(conn)
                        .await?;
                let stats = apply_stats_delta(conn, user_uuid, StatsDelta::ENROLL).await?;
                let enrollment = row_to_enrollment(row).map_err(TxError::Mapped)?;
                Ok((enrollment, stats))
            }
            .scope_boxed()
        })
        .await
        .map_err(unwrap_tx_error)
    }

    async fn create_with_receipt(
        &self,
        new: &NewEnrollment,
        receipt: &NewPaymentReceipt,
    ) -> Result<(Enrollment, PaymentReceipt, UserStats), EnrollmentRepositoryError> {
        let payment = payment_json(new)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_uuid = *new.user_id.as_uuid();

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let row: EnrollmentRow =
                    diesel::insert_into(enrollments::table)
                        .values(new_enrollment_row(new, Uuid::new_v4(), payment.as_ref()))
                        .get_result(conn)
                        .await?;

                #[expect(
                    clippy::cast_possible_wrap,
                    reason = "receipt amounts stay far below i32::MAX"
                )]
                let receipt_row: ReceiptRow = diesel::insert_into(payment_receipts::table)
                    .values(NewReceiptRow {
                        id: Uuid::new_v4(),
                        user_id: *receipt.user_id.as_uuid(),
                        course_id: *receipt.course_id.as_uuid(),
                        enrollment_id: row.id,
                        order_id: &receipt.order_id,
                        payment_id: &receipt.payment_id,
                        amount: receipt.amount as i32,
                        currency: &receipt.currency,
                        status: receipt.status.as_str(),
                    })
                    .get_result(conn)
                    .await?;

                let stats = apply_stats_delta(conn, user_uuid, StatsDelta::ENROLL).await?;
                let enrollment = row_to_enrollment(row).map_err(TxError::Mapped)?;
                let receipt = row_to_receipt(receipt_row).map_err(TxError::Mapped)?;
                Ok((enrollment, receipt, stats))
            }
            .scope_boxed()
        })
        .await
        .map_err(unwrap_tx_error)
    }

    async fn complete(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        completed_at: DateTime<Utc>,
    ) -> Result<CompletionResult, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_uuid = *user_id.as_uuid();
        let course_uuid = *course_id.as_uuid();

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let row: Option<EnrollmentRow> = enrollments::table
                    .filter(enrollments::user_id.eq(user_uuid))
                    .filter(enrollments::course_id.eq(course_uuid))
                    .for_update()
                    .select(EnrollmentRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;

                let Some(row) = row else {
                    return Ok(CompletionResult::Missing);
                };

                if row.status == EnrollmentStatus::Completed.as_str() {
                    let enrollment = row_to_enrollment(row).map_err(TxError::Mapped)?;
                    return Ok(CompletionResult::AlreadyCompleted { enrollment });
                }

                let updated: EnrollmentRow = diesel::update(
                    enrollments::table.filter(enrollments::id.eq(row.id)),
                )
                .set((
                    enrollments::status.eq(EnrollmentStatus::Completed.as_str()),
                    enrollments::progress.eq(100),
                    enrollments::completed_at.eq(Some(completed_at)),
                ))
                .get_result(conn)
                .await?;

                let stats = apply_stats_delta(conn, user_uuid, StatsDelta::COMPLETE).await?;
                let enrollment = row_to_enrollment(updated).map_err(TxError::Mapped)?;
                Ok(CompletionResult::Applied { enrollment, stats })
            }
            .scope_boxed()
        })
        .await
        .map_err(unwrap_tx_error)
    }

    async fn set_progress(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        progress: Progress,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_uuid = *user_id.as_uuid();
        let course_uuid = *course_id.as_uuid();

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let row: Option<EnrollmentRow> = enrollments::table
                    .filter(enrollments::user_id.eq(user_uuid))
                    .filter(enrollments::course_id.eq(course_uuid))
                    .for_update()
                    .select(EnrollmentRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;

                let Some(row) = row else {
                    return Ok(None);
                };

                // Never downgrade a completed status; the progress value
                // itself still updates.
                let next_status = if row.status == EnrollmentStatus::Completed.as_str() {
                    EnrollmentStatus::Completed
                } else {
                    status
                };

                let updated: EnrollmentRow = diesel::update(
                    enrollments::table.filter(enrollments::id.eq(row.id)),
                )
                .set((
                    enrollments::status.eq(next_status.as_str()),
                    enrollments::progress.eq(i32::from(progress.value())),
                ))
                .get_result(conn)
                .await?;

                let enrollment = row_to_enrollment(updated).map_err(TxError::Mapped)?;
                Ok(Some(enrollment))
            }
            .scope_boxed()
        })
        .await
        .map_err(unwrap_tx_error)
    }

    async fn delete_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<u64, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_uuid = *user_id.as_uuid();

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let removed = diesel::delete(
                    enrollments::table.filter(enrollments::user_id.eq(user_uuid)),
                )
                .execute(conn)
                .await?;
                diesel::delete(user_stats::table.filter(user_stats::user_id.eq(user_uuid)))
                    .execute(conn)
                    .await?;
                Ok(removed as u64)
            }
            .scope_boxed()
        })
        .await
        .map_err(unwrap_tx_error)
    }
}

fn map_stats_pool_error(error: PoolError) -> UserStatsRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserStatsRepositoryError::connection(message)
        }
    }
}

#[async_trait]
impl UserStatsRepository for DieselEnrollmentRepository {
    async fn fetch(&self, user_id: &UserId) -> Result<UserStats, UserStatsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_stats_pool_error)?;
        let row: Option<UserStatsRow> = user_stats::table
            .filter(user_stats::user_id.eq(user_id.as_uuid()))
            .select(UserStatsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| UserStatsRepositoryError::query(err.to_string()))?;
        Ok(row.as_ref().map(row_to_stats).unwrap_or_default())
    }
}
