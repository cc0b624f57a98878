//! Payment API handlers.
//!
//! ```text
//! POST /api/v1/payments/create-order
//! POST /api/v1/payments/verify-payment
//! ```
//!
//! Checkout happens client-side against the provider; these endpoints mint
//! the order and reconcile the provider callback into a paid enrollment.

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::{
    CreateOrderRequest, PaymentVerification, VerifyPaymentRequest,
};
use crate::domain::{CourseId, Error, ReceiptView};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

fn parse_course_id(raw: &str) -> Result<CourseId, Error> {
    CourseId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "courseId", "value": raw }))
    })
}

fn require_non_empty(value: &str, field: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(
            Error::invalid_request(format!("{field} must not be empty"))
                .with_details(json!({ "field": field })),
        );
    }
    Ok(())
}

/// Request body for `POST /payments/create-order`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequestBody {
    pub course_id: String,
    /// Amount in major currency units as quoted to the client.
    pub amount: u32,
}

/// Response body for `POST /payments/create-order`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponseBody {
    pub order_id: String,
    /// Amount in minor currency units, as the provider checkout expects.
    pub amount: i64,
    pub currency: String,
}

/// Request body for `POST /payments/verify-payment`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequestBody {
    pub course_id: String,
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Response body for `POST /payments/verify-payment`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponseBody {
    pub already_enrolled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ReceiptView>,
}

/// Mint a provider order for a priced course.
#[utoipa::path(
    post,
    path = "/api/v1/payments/create-order",
    request_body = OrderRequestBody,
    responses(
        (status = 201, description = "Order created", body = OrderResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 503, description = "Payment provider unavailable", body = Error)
    ),
    tags = ["payments"],
    operation_id = "createOrder"
)]
#[post("/payments/create-order")]
pub async fn create_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OrderRequestBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let course_id = parse_course_id(&payload.course_id)?;

    let order = state
        .payments
        .create_order(CreateOrderRequest {
            user_id,
            course_id,
            amount: payload.amount,
        })
        .await?;

    Ok(HttpResponse::Created().json(OrderResponseBody {
        order_id: order.id,
        amount: order.amount_minor,
        currency: order.currency,
    }))
}

/// Verify a provider payment callback and settle the enrollment.
#[utoipa::path(
    post,
    path = "/api/v1/payments/verify-payment",
    request_body = VerifyRequestBody,
    responses(
        (status = 200, description = "Payment verified", body = VerifyResponseBody),
        (status = 400, description = "Invalid request or verification failure", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 503, description = "Payment provider unavailable", body = Error)
    ),
    tags = ["payments"],
    operation_id = "verifyPayment"
)]
#[post("/payments/verify-payment")]
pub async fn verify_payment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VerifyRequestBody>,
) -> ApiResult<web::Json<VerifyResponseBody>> {
    let user_id = session.require_user_id()?;
    let course_id = parse_course_id(&payload.course_id)?;
    require_non_empty(&payload.order_id, "orderId")?;
    require_non_empty(&payload.payment_id, "paymentId")?;
    require_non_empty(&payload.signature, "signature")?;

    let payload = payload.into_inner();
    let outcome = state
        .payments
        .verify_payment(VerifyPaymentRequest {
            user_id,
            course_id,
            order_id: payload.order_id,
            payment_id: payload.payment_id,
            signature: payload.signature,
        })
        .await?;

    Ok(web::Json(match outcome {
        PaymentVerification::Enrolled { receipt } => VerifyResponseBody {
            already_enrolled: false,
            receipt: Some(receipt),
        },
        PaymentVerification::AlreadyEnrolled => VerifyResponseBody {
            already_enrolled: true,
            receipt: None,
        },
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};
    use chrono::Utc;
    use serde_json::Value;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ports::{MockPaymentCommand, ProviderOrder};
    use crate::domain::UserId;

    const COURSE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn state_with(payments: MockPaymentCommand) -> HttpState {
        HttpState {
            payments: Arc::new(payments),
            ..HttpState::default()
        }
    }

    async fn call_as_user(
        state: HttpState,
        request: test::TestRequest,
    ) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/test-login",
                    web::get().to(|session: SessionContext| async move {
                        let id = UserId::random();
                        session.persist_user(&id)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .service(create_order)
                .service(verify_payment),
        )
        .await;

        let login = test::call_service(
            &app,
            test::TestRequest::get().uri("/test-login").to_request(),
        )
        .await;
        let cookie = login
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned();

        test::call_service(&app, request.cookie(cookie).to_request()).await
    }

    #[actix_web::test]
    async fn create_order_returns_provider_order() {
        let mut payments = MockPaymentCommand::new();
        payments.expect_create_order().returning(|request| {
            assert_eq!(request.amount, 499);
            Ok(ProviderOrder {
                id: "order_MhVZ7LNyFs".into(),
                amount_minor: 49_900,
                currency: "INR".into(),
            })
        });

        let res = call_as_user(
            state_with(payments),
            test::TestRequest::post()
                .uri("/payments/create-order")
                .set_json(serde_json::json!({ "courseId": COURSE_ID, "amount": 499 })),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["orderId"], "order_MhVZ7LNyFs");
        assert_eq!(body["amount"], 49_900);
        assert_eq!(body["currency"], "INR");
    }

    #[actix_web::test]
    async fn verify_payment_returns_receipt() {
        let mut payments = MockPaymentCommand::new();
        payments.expect_verify_payment().returning(|request| {
            Ok(PaymentVerification::Enrolled {
                receipt: ReceiptView {
                    receipt_id: Uuid::new_v4(),
                    payment_id: request.payment_id.clone(),
                    order_id: request.order_id.clone(),
                    amount: 499,
                    currency: "INR".into(),
                    course_name: "Advanced Databases".into(),
                    date: Utc::now(),
                },
            })
        });

        let res = call_as_user(
            state_with(payments),
            test::TestRequest::post()
                .uri("/payments/verify-payment")
                .set_json(serde_json::json!({
                    "courseId": COURSE_ID,
                    "orderId": "order_MhVZ7LNyFs",
                    "paymentId": "pay_MhVaQQPzX1",
                    "signature": "deadbeef",
                })),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["alreadyEnrolled"], false);
        assert_eq!(body["receipt"]["orderId"], "order_MhVZ7LNyFs");
    }

    #[actix_web::test]
    async fn verify_payment_reports_replay() {
        let mut payments = MockPaymentCommand::new();
        payments
            .expect_verify_payment()
            .returning(|_| Ok(PaymentVerification::AlreadyEnrolled));

        let res = call_as_user(
            state_with(payments),
            test::TestRequest::post()
                .uri("/payments/verify-payment")
                .set_json(serde_json::json!({
                    "courseId": COURSE_ID,
                    "orderId": "order_MhVZ7LNyFs",
                    "paymentId": "pay_MhVaQQPzX1",
                    "signature": "deadbeef",
                })),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["alreadyEnrolled"], true);
        assert!(body.get("receipt").is_none());
    }

    #[actix_web::test]
    async fn verify_payment_rejects_blank_signature() {
        let mut payments = MockPaymentCommand::new();
        payments.expect_verify_payment().never();

        let res = call_as_user(
            state_with(payments),
            test::TestRequest::post()
                .uri("/payments/verify-payment")
                .set_json(serde_json::json!({
                    "courseId": COURSE_ID,
                    "orderId": "order_MhVZ7LNyFs",
                    "paymentId": "pay_MhVaQQPzX1",
                    "signature": " ",
                })),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn verification_failure_is_a_bad_request() {
        let mut payments = MockPaymentCommand::new();
        payments
            .expect_verify_payment()
            .returning(|_| Err(Error::verification_failed("payment verification failed")));

        let res = call_as_user(
            state_with(payments),
            test::TestRequest::post()
                .uri("/payments/verify-payment")
                .set_json(serde_json::json!({
                    "courseId": COURSE_ID,
                    "orderId": "order_MhVZ7LNyFs",
                    "paymentId": "pay_forged",
                    "signature": "deadbeef",
                })),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "verification_failed");
        assert_eq!(body["message"], "payment verification failed");
    }
}
