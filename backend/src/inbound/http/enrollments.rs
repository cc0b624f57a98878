//! Enrollment API handlers.
//!
//! ```text
//! POST  /api/v1/courses/{course_id}/enroll
//! GET   /api/v1/me/enrolled-courses
//! GET   /api/v1/me/completed-courses
//! PATCH /api/v1/courses/{course_id}/progress
//! ```

use actix_web::{get, patch, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::{
    CompletedCourseView, EnrollFreeRequest, EnrollmentView, UpdateProgressRequest,
    UpdateProgressResponse,
};
use crate::domain::{CourseId, Error, Progress};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Parse the `course_id` path segment.
fn parse_course_id(raw: &str) -> Result<CourseId, Error> {
    CourseId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "courseId", "value": raw }))
    })
}

/// Request body for `PATCH /courses/{course_id}/progress`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    /// Progress percentage, an integer in [0, 100].
    pub progress: i64,
}

/// Completed-course listing response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCoursesResponse {
    pub courses: Vec<CompletedCourseView>,
    /// Present when the listing is empty, explaining why.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Enroll the authenticated user on a free course.
///
/// Idempotent: repeating the request for an existing enrollment returns the
/// original enrollment with `200 OK` instead of creating a second row.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{course_id}/enroll",
    responses(
        (status = 200, description = "Already enrolled; existing enrollment returned"),
        (status = 201, description = "Enrollment created"),
        (status = 400, description = "Invalid course id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 402, description = "Course requires payment", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 409, description = "Concurrent enrollment detected", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    params(("course_id" = String, Path, description = "Course identifier")),
    tags = ["enrollments"],
    operation_id = "enrollFree"
)]
#[post("/courses/{course_id}/enroll")]
pub async fn enroll(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let course_id = parse_course_id(&path)?;

    let response = state
        .enrollments
        .enroll_free(EnrollFreeRequest { user_id, course_id })
        .await?;

    let mut builder = if response.already_enrolled {
        HttpResponse::Ok()
    } else {
        HttpResponse::Created()
    };
    Ok(builder.json(response))
}

/// List the authenticated user's active enrollments.
#[utoipa::path(
    get,
    path = "/api/v1/me/enrolled-courses",
    responses(
        (status = 200, description = "Active enrollments joined with course data"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["enrollments"],
    operation_id = "listEnrolledCourses"
)]
#[get("/me/enrolled-courses")]
pub async fn enrolled_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<EnrollmentView>>> {
    let user_id = session.require_user_id()?;
    let views = state.enrollments_query.list_active(&user_id).await?;
    Ok(web::Json(views))
}

/// List the authenticated user's completed courses.
#[utoipa::path(
    get,
    path = "/api/v1/me/completed-courses",
    responses(
        (status = 200, description = "Completed courses", body = CompletedCoursesResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["enrollments"],
    operation_id = "listCompletedCourses"
)]
#[get("/me/completed-courses")]
pub async fn completed_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CompletedCoursesResponse>> {
    let user_id = session.require_user_id()?;
    let listing = state.enrollments_query.list_completed(&user_id).await?;
    Ok(web::Json(CompletedCoursesResponse {
        courses: listing.courses,
        message: listing.notice.map(|notice| notice.message().to_owned()),
    }))
}

/// Record progress on the authenticated user's enrollment.
#[utoipa::path(
    patch,
    path = "/api/v1/courses/{course_id}/progress",
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "Updated enrollment and stats snapshot"),
        (status = 400, description = "Invalid progress value", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Enrollment not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    params(("course_id" = String, Path, description = "Course identifier")),
    tags = ["enrollments"],
    operation_id = "updateProgress"
)]
#[patch("/courses/{course_id}/progress")]
pub async fn update_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ProgressRequest>,
) -> ApiResult<web::Json<UpdateProgressResponse>> {
    let user_id = session.require_user_id()?;
    let course_id = parse_course_id(&path)?;
    let progress = Progress::new(payload.progress).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "progress", "value": payload.progress }))
    })?;

    let response = state
        .enrollments
        .update_progress(UpdateProgressRequest {
            user_id,
            course_id,
            progress,
        })
        .await?;
    Ok(web::Json(response))
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
    use crate::domain::ports::{
        CompletedCourses, CompletedListNotice, EnrollResponse, MockEnrollmentCommand,
        MockEnrollmentQuery,
    };
    use crate::domain::{Enrollment, EnrollmentStatus, UserId};

    const COURSE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn enrollment(user_id: &UserId) -> Enrollment {
        Enrollment {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            course_id: CourseId::new(COURSE_ID).expect("fixture course id"),
            status: EnrollmentStatus::Enrolled,
            progress: Progress::ZERO,
            started_at: Utc::now(),
            completed_at: None,
            certificate_url: None,
            payment: None,
        }
    }

    fn state_with(command: MockEnrollmentCommand, query: MockEnrollmentQuery) -> HttpState {
        HttpState {
            enrollments: Arc::new(command),
            enrollments_query: Arc::new(query),
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
                .service(enroll)
                .service(enrolled_courses)
                .service(completed_courses)
                .service(update_progress),
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
    async fn enroll_returns_created_for_fresh_enrollment() {
        let mut command = MockEnrollmentCommand::new();
        command.expect_enroll_free().returning(|request| {
            Ok(EnrollResponse {
                enrollment: enrollment(&request.user_id),
                already_enrolled: false,
            })
        });

        let res = call_as_user(
            state_with(command, MockEnrollmentQuery::new()),
            test::TestRequest::post().uri(&format!("/courses/{COURSE_ID}/enroll")),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["alreadyEnrolled"], false);
    }

    #[actix_web::test]
    async fn enroll_replay_returns_ok() {
        let mut command = MockEnrollmentCommand::new();
        command.expect_enroll_free().returning(|request| {
            Ok(EnrollResponse {
                enrollment: enrollment(&request.user_id),
                already_enrolled: true,
            })
        });

        let res = call_as_user(
            state_with(command, MockEnrollmentQuery::new()),
            test::TestRequest::post().uri(&format!("/courses/{COURSE_ID}/enroll")),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["alreadyEnrolled"], true);
    }

    #[actix_web::test]
    async fn enroll_rejects_malformed_course_id() {
        let command = MockEnrollmentCommand::new();

        let res = call_as_user(
            state_with(command, MockEnrollmentQuery::new()),
            test::TestRequest::post().uri("/courses/not-a-uuid/enroll"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn enroll_surfaces_payment_required() {
        let mut command = MockEnrollmentCommand::new();
        command
            .expect_enroll_free()
            .returning(|_| Err(Error::payment_required("this course requires payment")));

        let res = call_as_user(
            state_with(command, MockEnrollmentQuery::new()),
            test::TestRequest::post().uri(&format!("/courses/{COURSE_ID}/enroll")),
        )
        .await;

        assert_eq!(res.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[actix_web::test]
    async fn enroll_requires_a_session() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::default()))
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .service(enroll),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/courses/{COURSE_ID}/enroll"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn progress_rejects_out_of_range_value() {
        let mut command = MockEnrollmentCommand::new();
        command.expect_update_progress().never();

        let res = call_as_user(
            state_with(command, MockEnrollmentQuery::new()),
            test::TestRequest::patch()
                .uri(&format!("/courses/{COURSE_ID}/progress"))
                .set_json(serde_json::json!({ "progress": 150 })),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["value"], 150);
    }

    #[actix_web::test]
    async fn completed_listing_carries_notice_message() {
        let mut query = MockEnrollmentQuery::new();
        query.expect_list_completed().returning(|_| {
            Ok(CompletedCourses {
                courses: Vec::new(),
                notice: Some(CompletedListNotice::NoneCompleted),
            })
        });

        let res = call_as_user(
            state_with(MockEnrollmentCommand::new(), query),
            test::TestRequest::get().uri("/me/completed-courses"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "You have not completed any courses yet");
        assert!(body["courses"].as_array().expect("array").is_empty());
    }

    #[actix_web::test]
    async fn enrolled_listing_returns_views() {
        let mut query = MockEnrollmentQuery::new();
        query.expect_list_active().returning(|user_id| {
            Ok(vec![EnrollmentView {
                enrollment: enrollment(user_id),
                course: None,
            }])
        });

        let res = call_as_user(
            state_with(MockEnrollmentCommand::new(), query),
            test::TestRequest::get().uri("/me/enrolled-courses"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body.as_array().expect("array").len(), 1);
    }
}
