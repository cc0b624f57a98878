//! Identity API handlers.
//!
//! ```text
//! POST /api/v1/login {"username":"admin","password":"password"}
//! ```
//!
//! Development stand-in for the external identity provider: a successful
//! login persists a verified user id in the session cookie, which every
//! enrollment and payment handler then requires.

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::ApiResult;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn authenticate(username: &str, password: &str) -> ApiResult<UserId> {
    if username.trim().is_empty() {
        return Err(Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username" })));
    }
    if password.trim().is_empty() {
        return Err(Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password" })));
    }
    if username == "admin" && password == "password" {
        UserId::new("123e4567-e89b-12d3-a456-426614174000")
            .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))
    } else {
        Err(Error::unauthorized("invalid credentials"))
    }
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = authenticate(&payload.username, &payload.password)?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}
