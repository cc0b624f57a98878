//! Test utilities for the backend crate.
//!
//! In-memory adapters for the persistence and provider ports so integration
//! tests can drive the full service stack without PostgreSQL or a live
//! payment provider. Compiled only for tests and the `test-support` feature.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    CompletionResult, CourseCatalog, CourseCatalogError, EnrollmentRepository,
    EnrollmentRepositoryError, OrderRequest, PaymentProvider, PaymentProviderError, ProviderOrder,
    UserStatsRepository, UserStatsRepositoryError,
};
use crate::domain::stats::StatsDelta;
use crate::domain::{
    Course, CourseId, CourseSummary, Enrollment, EnrollmentStatus, NewEnrollment,
    NewPaymentReceipt, PaymentReceipt, Progress, UserId, UserStats,
};

#[derive(Default)]
struct LedgerState {
    enrollments: Vec<Enrollment>,
    receipts: Vec<PaymentReceipt>,
    stats: HashMap<UserId, UserStats>,
}

/// In-memory enrollment ledger implementing both the ledger and stats ports.
///
/// Mirrors the atomicity contract of the SQL adapter: every enrollment write
/// and its stats delta happen under one lock acquisition, so a reader never
/// observes one half of the pair.
#[derive(Default)]
pub struct InMemoryEnrollmentLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryEnrollmentLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded receipts, for assertions.
    pub fn receipts(&self) -> Vec<PaymentReceipt> {
        self.state.lock().expect("ledger lock").receipts.clone()
    }

    fn apply_delta(state: &mut LedgerState, user_id: &UserId, delta: StatsDelta) -> UserStats {
        let current = state.stats.get(user_id).copied().unwrap_or_default();
        let next = current.apply(delta);
        state.stats.insert(user_id.clone(), next);
        next
    }

    fn insert_enrollment(
        state: &mut LedgerState,
        new: &NewEnrollment,
    ) -> Result<Enrollment, EnrollmentRepositoryError> {
        let exists = state
            .enrollments
            .iter()
            .any(|e| e.user_id == new.user_id && e.course_id == new.course_id);
        if exists {
            return Err(EnrollmentRepositoryError::DuplicateEnrollment);
        }
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            user_id: new.user_id.clone(),
            course_id: new.course_id.clone(),
            status: EnrollmentStatus::Enrolled,
            progress: Progress::ZERO,
            started_at: new.started_at,
            completed_at: None,
            certificate_url: None,
            payment: new.payment.clone(),
        };
        state.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryEnrollmentLedger {
    async fn find(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, EnrollmentRepositoryError> {
        let state = self.state.lock().expect("ledger lock");
        Ok(state
            .enrollments
            .iter()
            .find(|e| e.user_id == *user_id && e.course_id == *course_id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Enrollment>, EnrollmentRepositoryError> {
        let state = self.state.lock().expect("ledger lock");
        Ok(state
            .enrollments
            .iter()
            .filter(|e| e.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        new: &NewEnrollment,
    ) -> Result<(Enrollment, UserStats), EnrollmentRepositoryError> {
        let mut state = self.state.lock().expect("ledger lock");
        let enrollment = Self::insert_enrollment(&mut state, new)?;
        let stats = Self::apply_delta(&mut state, &new.user_id, StatsDelta::ENROLL);
        Ok((enrollment, stats))
    }

    async fn create_with_receipt(
        &self,
        new: &NewEnrollment,
        receipt: &NewPaymentReceipt,
    ) -> Result<(Enrollment, PaymentReceipt, UserStats), EnrollmentRepositoryError> {
        let mut state = self.state.lock().expect("ledger lock");
        let enrollment = Self::insert_enrollment(&mut state, new)?;
        let record = PaymentReceipt {
            id: Uuid::new_v4(),
            user_id: receipt.user_id.clone(),
            course_id: receipt.course_id.clone(),
            enrollment_id: enrollment.id,
            order_id: receipt.order_id.clone(),
            payment_id: receipt.payment_id.clone(),
            amount: receipt.amount,
            currency: receipt.currency.clone(),
            status: receipt.status,
            created_at: Utc::now(),
        };
        state.receipts.push(record.clone());
        let stats = Self::apply_delta(&mut state, &new.user_id, StatsDelta::ENROLL);
        Ok((enrollment, record, stats))
    }

    async fn complete(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        completed_at: DateTime<Utc>,
    ) -> Result<CompletionResult, EnrollmentRepositoryError> {
        let mut state = self.state.lock().expect("ledger lock");
        let Some(index) = state
            .enrollments
            .iter()
            .position(|e| e.user_id == *user_id && e.course_id == *course_id)
        else {
            return Ok(CompletionResult::Missing);
        };
        if state.enrollments[index].status == EnrollmentStatus::Completed {
            return Ok(CompletionResult::AlreadyCompleted {
                enrollment: state.enrollments[index].clone(),
            });
        }
        {
            let row = &mut state.enrollments[index];
            row.status = EnrollmentStatus::Completed;
            row.progress = Progress::COMPLETE;
            row.completed_at = Some(completed_at);
        }
        let enrollment = state.enrollments[index].clone();
        let stats = Self::apply_delta(&mut state, user_id, StatsDelta::COMPLETE);
        Ok(CompletionResult::Applied { enrollment, stats })
    }

    async fn set_progress(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        progress: Progress,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>, EnrollmentRepositoryError> {
        let mut state = self.state.lock().expect("ledger lock");
        let Some(row) = state
            .enrollments
            .iter_mut()
            .find(|e| e.user_id == *user_id && e.course_id == *course_id)
        else {
            return Ok(None);
        };
        row.progress = progress;
        if row.status != EnrollmentStatus::Completed {
            row.status = status;
        }
        Ok(Some(row.clone()))
    }

    async fn delete_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<u64, EnrollmentRepositoryError> {
        let mut state = self.state.lock().expect("ledger lock");
        let before = state.enrollments.len();
        state.enrollments.retain(|e| e.user_id != *user_id);
        let removed = before - state.enrollments.len();
        state.stats.remove(user_id);
        Ok(removed as u64)
    }
}

#[async_trait]
impl UserStatsRepository for InMemoryEnrollmentLedger {
    async fn fetch(&self, user_id: &UserId) -> Result<UserStats, UserStatsRepositoryError> {
        let state = self.state.lock().expect("ledger lock");
        Ok(state.stats.get(user_id).copied().unwrap_or_default())
    }
}

/// In-memory course catalog seeded from a fixed set of courses.
#[derive(Default)]
pub struct InMemoryCourseCatalog {
    courses: Mutex<Vec<Course>>,
}

impl InMemoryCourseCatalog {
    /// Create a catalog holding the supplied courses.
    pub fn with_courses(courses: Vec<Course>) -> Self {
        Self {
            courses: Mutex::new(courses),
        }
    }
}

#[async_trait]
impl CourseCatalog for InMemoryCourseCatalog {
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseCatalogError> {
        let courses = self.courses.lock().expect("catalog lock");
        Ok(courses.iter().find(|c| c.id == *id).cloned())
    }

    async fn summaries_by_ids(
        &self,
        ids: &[CourseId],
    ) -> Result<HashMap<CourseId, CourseSummary>, CourseCatalogError> {
        let courses = self.courses.lock().expect("catalog lock");
        Ok(courses
            .iter()
            .filter(|c| ids.contains(&c.id))
            .map(|c| (c.id.clone(), c.summary()))
            .collect())
    }
}

/// Stub payment provider that mints sequentially numbered orders and serves
/// them back on fetch.
#[derive(Default)]
pub struct StubPaymentProvider {
    counter: AtomicU64,
    orders: Mutex<HashMap<String, ProviderOrder>>,
}

impl StubPaymentProvider {
    /// Create a provider with no minted orders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an order as if it had been minted earlier, for fetch-only tests.
    pub fn seed_order(&self, order: ProviderOrder) {
        self.orders
            .lock()
            .expect("orders lock")
            .insert(order.id.clone(), order);
    }
}

#[async_trait]
impl PaymentProvider for StubPaymentProvider {
    async fn create_order(
        &self,
        request: &OrderRequest,
    ) -> Result<ProviderOrder, PaymentProviderError> {
        let sequence = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let order = ProviderOrder {
            id: format!("order_stub{sequence:05}"),
            amount_minor: request.amount_minor,
            currency: request.currency.clone(),
        };
        self.orders
            .lock()
            .expect("orders lock")
            .insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<ProviderOrder, PaymentProviderError> {
        self.orders
            .lock()
            .expect("orders lock")
            .get(order_id)
            .cloned()
            .ok_or_else(|| PaymentProviderError::status(404_u16))
    }
}
