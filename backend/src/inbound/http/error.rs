//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers
//! turn domain failures into consistent JSON responses and status codes.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::TraceId;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::VerificationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        Error::internal("Internal server error")
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            let trace_id = TraceId::current().map(|id| id.to_string());
            error!(
                message = %self.message(),
                trace_id = trace_id.as_deref(),
                "internal error returned to client"
            );
        }
        HttpResponse::build(self.status_code()).json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case(Error::invalid_request("bad progress"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("login required"), StatusCode::UNAUTHORIZED)]
    #[case(Error::payment_required("paid course"), StatusCode::PAYMENT_REQUIRED)]
    #[case(Error::not_found("course"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("duplicate"), StatusCode::CONFLICT)]
    #[case(Error::verification_failed("payment verification failed"), StatusCode::BAD_REQUEST)]
    #[case(Error::service_unavailable("provider down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_codes_to_status(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[actix_rt::test]
    async fn internal_errors_are_redacted() {
        let response = Error::internal("diesel: relation missing").error_response();
        let body = to_bytes(response.into_body()).await.expect("body");
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["message"], "Internal server error");
        assert_eq!(json["code"], "internal_error");
    }

    #[actix_rt::test]
    async fn client_errors_keep_their_message() {
        let response = Error::not_found("course abc not found").error_response();
        let body = to_bytes(response.into_body()).await.expect("body");
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["message"], "course abc not found");
    }
}
