//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: all HTTP endpoints from the inbound layer, the shared error
//! schema, and the session cookie security scheme. The generated document is
//! served by Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::enrollments::{CompletedCoursesResponse, ProgressRequest};
use crate::inbound::http::payments::{OrderRequestBody, OrderResponseBody, VerifyRequestBody, VerifyResponseBody};
use crate::inbound::http::users::LoginRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Enrollment backend API",
        description = "HTTP interface for course enrollment, progress tracking, and payment reconciliation."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::enrollments::enroll,
        crate::inbound::http::enrollments::enrolled_courses,
        crate::inbound::http::enrollments::completed_courses,
        crate::inbound::http::enrollments::update_progress,
        crate::inbound::http::payments::create_order,
        crate::inbound::http::payments::verify_payment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginRequest,
        ProgressRequest,
        CompletedCoursesResponse,
        OrderRequestBody,
        OrderResponseBody,
        VerifyRequestBody,
        VerifyResponseBody,
    ))
)]
pub struct ApiDoc;
