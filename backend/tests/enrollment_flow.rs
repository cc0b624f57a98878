//! Integration tests for the enrollment lifecycle and payment reconciliation.
//!
//! These drive the real services end to end over the in-memory adapters from
//! `test_support`, so every assertion covers the same code paths the Diesel
//! and HTTP adapters compose in production, minus the I/O.

use std::sync::Arc;

use backend::domain::ports::{
    CreateOrderRequest, EnrollFreeRequest, EnrollmentCommand, EnrollmentQuery, PaymentCommand,
    PaymentVerification, UpdateProgressRequest, VerifyPaymentRequest,
};
use backend::domain::signature::{expected_signature, PaymentSecret};
use backend::domain::{
    Course, CourseId, EnrollmentService, EnrollmentStatus, ErrorCode, PaymentService, Progress,
    UserId,
};
use backend::test_support::{InMemoryCourseCatalog, InMemoryEnrollmentLedger, StubPaymentProvider};
use rstest::{fixture, rstest};

type TestEnrollmentService =
    EnrollmentService<InMemoryEnrollmentLedger, InMemoryEnrollmentLedger, InMemoryCourseCatalog>;
type TestPaymentService =
    PaymentService<StubPaymentProvider, InMemoryEnrollmentLedger, InMemoryCourseCatalog>;

fn course(id: CourseId, name: &str, price: u32) -> Course {
    Course {
        id,
        name: name.into(),
        logo: "https://cdn.example/logo.png".into(),
        category: "Programming".into(),
        duration: "8 weeks".into(),
        instructor: "A. Hoare".into(),
        rating: 4.5,
        price,
        link: None,
    }
}

struct Stack {
    ledger: Arc<InMemoryEnrollmentLedger>,
    provider: Arc<StubPaymentProvider>,
    enrollments: TestEnrollmentService,
    payments: TestPaymentService,
    free_course: CourseId,
    paid_course: CourseId,
}

fn secret() -> PaymentSecret {
    PaymentSecret::new(b"integration-secret".to_vec())
}

#[fixture]
fn stack() -> Stack {
    let free_course = CourseId::random();
    let paid_course = CourseId::random();
    let catalog = Arc::new(InMemoryCourseCatalog::with_courses(vec![
        course(free_course.clone(), "Intro to Rust", 0),
        course(paid_course.clone(), "Advanced Rust", 499),
    ]));
    let ledger = Arc::new(InMemoryEnrollmentLedger::new());
    let provider = Arc::new(StubPaymentProvider::new());

    let enrollments =
        EnrollmentService::new(ledger.clone(), ledger.clone(), catalog.clone());
    let payments = PaymentService::new(provider.clone(), ledger.clone(), catalog, secret());

    Stack {
        ledger,
        provider,
        enrollments,
        payments,
        free_course,
        paid_course,
    }
}

#[fixture]
fn user_id() -> UserId {
    UserId::random()
}

fn progress(value: i64) -> Progress {
    Progress::new(value).expect("valid progress")
}

async fn enroll(stack: &Stack, user_id: &UserId) {
    stack
        .enrollments
        .enroll_free(EnrollFreeRequest {
            user_id: user_id.clone(),
            course_id: stack.free_course.clone(),
        })
        .await
        .expect("enrollment succeeds");
}

async fn settle_paid(stack: &Stack, user_id: &UserId) -> PaymentVerification {
    let order = stack
        .payments
        .create_order(CreateOrderRequest {
            user_id: user_id.clone(),
            course_id: stack.paid_course.clone(),
            amount: 499,
        })
        .await
        .expect("order minted");
    let payment_id = "pay_integration1";
    let signature = expected_signature(&secret(), &order.id, payment_id);
    stack
        .payments
        .verify_payment(VerifyPaymentRequest {
            user_id: user_id.clone(),
            course_id: stack.paid_course.clone(),
            order_id: order.id,
            payment_id: payment_id.into(),
            signature,
        })
        .await
        .expect("verification succeeds")
}

#[rstest]
#[tokio::test]
async fn free_enrollment_is_idempotent(stack: Stack, user_id: UserId) {
    let first = stack
        .enrollments
        .enroll_free(EnrollFreeRequest {
            user_id: user_id.clone(),
            course_id: stack.free_course.clone(),
        })
        .await
        .expect("first enrollment succeeds");
    assert!(!first.already_enrolled);
    assert_eq!(first.enrollment.status, EnrollmentStatus::Enrolled);

    let replay = stack
        .enrollments
        .enroll_free(EnrollFreeRequest {
            user_id: user_id.clone(),
            course_id: stack.free_course.clone(),
        })
        .await
        .expect("replay succeeds");
    assert!(replay.already_enrolled);
    assert_eq!(replay.enrollment.id, first.enrollment.id);

    use backend::domain::ports::UserStatsRepository;
    let stats = stack.ledger.fetch(&user_id).await.expect("stats read");
    assert_eq!(stats.courses_enrolled, 1, "replay must not double count");
}

#[rstest]
#[tokio::test]
async fn paid_course_rejects_free_enrollment(stack: Stack, user_id: UserId) {
    let err = stack
        .enrollments
        .enroll_free(EnrollFreeRequest {
            user_id,
            course_id: stack.paid_course.clone(),
        })
        .await
        .expect_err("paid course must not enroll for free");
    assert_eq!(err.code(), ErrorCode::PaymentRequired);
}

#[rstest]
#[tokio::test]
async fn unknown_course_is_not_found(stack: Stack, user_id: UserId) {
    let err = stack
        .enrollments
        .enroll_free(EnrollFreeRequest {
            user_id,
            course_id: CourseId::random(),
        })
        .await
        .expect_err("unknown course rejected");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn partial_progress_moves_to_in_progress(stack: Stack, user_id: UserId) {
    enroll(&stack, &user_id).await;

    let response = stack
        .enrollments
        .update_progress(UpdateProgressRequest {
            user_id: user_id.clone(),
            course_id: stack.free_course.clone(),
            progress: progress(40),
        })
        .await
        .expect("progress recorded");

    assert_eq!(
        response.enrollment.enrollment.status,
        EnrollmentStatus::InProgress
    );
    assert_eq!(response.enrollment.enrollment.progress, progress(40));
    let joined = response.enrollment.course.expect("course joined");
    assert_eq!(joined.name, "Intro to Rust");
    assert_eq!(response.stats.courses_enrolled, 1);
    assert_eq!(response.stats.courses_completed, 0);
}

#[rstest]
#[tokio::test]
async fn completion_side_effects_fire_exactly_once(stack: Stack, user_id: UserId) {
    enroll(&stack, &user_id).await;

    let completed = stack
        .enrollments
        .update_progress(UpdateProgressRequest {
            user_id: user_id.clone(),
            course_id: stack.free_course.clone(),
            progress: progress(100),
        })
        .await
        .expect("completion recorded");
    assert_eq!(
        completed.enrollment.enrollment.status,
        EnrollmentStatus::Completed
    );
    assert!(completed.enrollment.enrollment.completed_at.is_some());
    assert_eq!(completed.stats.courses_enrolled, 0);
    assert_eq!(completed.stats.courses_completed, 1);

    // A repeated write against the completed enrollment changes no counters.
    let repeat = stack
        .enrollments
        .update_progress(UpdateProgressRequest {
            user_id: user_id.clone(),
            course_id: stack.free_course.clone(),
            progress: progress(100),
        })
        .await
        .expect("repeat accepted");
    assert_eq!(repeat.stats.courses_enrolled, 0);
    assert_eq!(repeat.stats.courses_completed, 1);
    assert_eq!(
        repeat.enrollment.enrollment.completed_at,
        completed.enrollment.enrollment.completed_at,
        "completion timestamp is written once"
    );
}

#[rstest]
#[tokio::test]
async fn listings_split_on_completion(stack: Stack, user_id: UserId) {
    enroll(&stack, &user_id).await;

    let active = stack
        .enrollments
        .list_active(&user_id)
        .await
        .expect("active listing");
    assert_eq!(active.len(), 1);

    let completed = stack
        .enrollments
        .list_completed(&user_id)
        .await
        .expect("completed listing");
    assert!(completed.courses.is_empty());
    assert!(completed.notice.is_some(), "empty listing carries a notice");

    stack
        .enrollments
        .update_progress(UpdateProgressRequest {
            user_id: user_id.clone(),
            course_id: stack.free_course.clone(),
            progress: progress(100),
        })
        .await
        .expect("completion recorded");

    let active = stack
        .enrollments
        .list_active(&user_id)
        .await
        .expect("active listing");
    assert!(active.is_empty(), "completed courses leave the active list");

    let completed = stack
        .enrollments
        .list_completed(&user_id)
        .await
        .expect("completed listing");
    assert_eq!(completed.courses.len(), 1);
    assert_eq!(completed.courses[0].course.name, "Intro to Rust");
    assert!(completed.notice.is_none());
}

#[rstest]
#[tokio::test]
async fn paid_flow_settles_with_receipt(stack: Stack, user_id: UserId) {
    let verification = settle_paid(&stack, &user_id).await;

    let PaymentVerification::Enrolled { receipt } = verification else {
        panic!("first verification must enroll");
    };
    assert_eq!(receipt.amount, 499, "receipt follows the provider order");
    assert_eq!(receipt.course_name, "Advanced Rust");

    let recorded = stack.ledger.receipts();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].amount, 499);

    use backend::domain::ports::UserStatsRepository;
    let stats = stack.ledger.fetch(&user_id).await.expect("stats read");
    assert_eq!(stats.courses_enrolled, 1);
}

#[rstest]
#[tokio::test]
async fn duplicate_callback_replays_safely(stack: Stack, user_id: UserId) {
    let order = stack
        .payments
        .create_order(CreateOrderRequest {
            user_id: user_id.clone(),
            course_id: stack.paid_course.clone(),
            amount: 499,
        })
        .await
        .expect("order minted");
    let signature = expected_signature(&secret(), &order.id, "pay_once");
    let request = VerifyPaymentRequest {
        user_id: user_id.clone(),
        course_id: stack.paid_course.clone(),
        order_id: order.id,
        payment_id: "pay_once".into(),
        signature,
    };

    let first = stack
        .payments
        .verify_payment(request.clone())
        .await
        .expect("first callback settles");
    assert!(matches!(first, PaymentVerification::Enrolled { .. }));

    let second = stack
        .payments
        .verify_payment(request)
        .await
        .expect("duplicate callback accepted");
    assert!(matches!(second, PaymentVerification::AlreadyEnrolled));
    assert_eq!(
        stack.ledger.receipts().len(),
        1,
        "replay writes no second receipt"
    );
}

#[rstest]
#[tokio::test]
async fn forged_signature_writes_nothing(stack: Stack, user_id: UserId) {
    let order = stack
        .payments
        .create_order(CreateOrderRequest {
            user_id: user_id.clone(),
            course_id: stack.paid_course.clone(),
            amount: 499,
        })
        .await
        .expect("order minted");

    let err = stack
        .payments
        .verify_payment(VerifyPaymentRequest {
            user_id: user_id.clone(),
            course_id: stack.paid_course.clone(),
            order_id: order.id,
            payment_id: "pay_forged".into(),
            signature: "deadbeef".into(),
        })
        .await
        .expect_err("forged signature rejected");
    assert_eq!(err.code(), ErrorCode::VerificationFailed);
    assert_eq!(err.message(), "payment verification failed");

    assert!(stack.ledger.receipts().is_empty());
    let enrollment = stack
        .payments
        .verify_payment(VerifyPaymentRequest {
            user_id,
            course_id: stack.paid_course.clone(),
            order_id: "order_unknown".into(),
            payment_id: "pay_forged".into(),
            signature: "deadbeef".into(),
        })
        .await;
    assert!(enrollment.is_err(), "forgery never enrolls");
}

#[rstest]
#[tokio::test]
async fn receipt_amount_follows_provider_order(stack: Stack, user_id: UserId) {
    use backend::domain::ports::ProviderOrder;

    // The provider reports a different amount than the client quoted; the
    // receipt must record the provider's figure.
    stack.provider.seed_order(ProviderOrder {
        id: "order_reported".into(),
        amount_minor: 129_900,
        currency: "INR".into(),
    });
    let signature = expected_signature(&secret(), "order_reported", "pay_reported");
    let verification = stack
        .payments
        .verify_payment(VerifyPaymentRequest {
            user_id,
            course_id: stack.paid_course.clone(),
            order_id: "order_reported".into(),
            payment_id: "pay_reported".into(),
            signature,
        })
        .await
        .expect("verification succeeds");

    let PaymentVerification::Enrolled { receipt } = verification else {
        panic!("expected a fresh enrollment");
    };
    assert_eq!(receipt.amount, 1299);
}

#[rstest]
#[tokio::test]
async fn account_deletion_clears_ledger_and_stats(stack: Stack, user_id: UserId) {
    enroll(&stack, &user_id).await;
    settle_paid(&stack, &user_id).await;

    let removed = stack
        .enrollments
        .delete_for_user(&user_id)
        .await
        .expect("deletion succeeds");
    assert_eq!(removed, 2);

    let active = stack
        .enrollments
        .list_active(&user_id)
        .await
        .expect("listing after deletion");
    assert!(active.is_empty());

    use backend::domain::ports::UserStatsRepository;
    let stats = stack.ledger.fetch(&user_id).await.expect("stats read");
    assert_eq!(stats, backend::domain::UserStats::default());
}

#[rstest]
#[tokio::test]
async fn progress_update_on_missing_enrollment_is_not_found(stack: Stack, user_id: UserId) {
    let err = stack
        .enrollments
        .update_progress(UpdateProgressRequest {
            user_id,
            course_id: stack.free_course.clone(),
            progress: progress(10),
        })
        .await
        .expect_err("no enrollment to update");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
