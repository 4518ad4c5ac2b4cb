use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::directory::{DirectoryError, EmployeeDirectory};
use super::domain::{
    Dimension, Employee, EmployeeId, EmployeeUpdate, NewEmployee, ReviewDraft, ReviewId,
};
use super::repository::{ReviewQuery, ReviewRepository};
use super::service::{ReviewService, ReviewServiceError};
use super::window::PolicyViolation;

/// Header carrying the caller's employee id.
pub const EMPLOYEE_HEADER: &str = "x-employee-id";

type SharedService<R, D> = Arc<ReviewService<R, D>>;

/// Router builder exposing the review, reporting, and directory endpoints.
pub fn review_router<R, D>(service: SharedService<R, D>) -> Router
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    Router::new()
        .route("/api/v1/reviews", post(save_handler::<R, D>))
        .route("/api/v1/reviews/me", get(my_reviews_handler::<R, D>))
        .route("/api/v1/reviews/pending", get(pending_handler::<R, D>))
        .route("/api/v1/reviews/window", get(window_handler::<R, D>))
        .route("/api/v1/reviews/:review_id", get(review_handler::<R, D>))
        .route("/api/v1/employees/active", get(colleagues_handler::<R, D>))
        .route("/api/v1/admin/reviews", get(query_handler::<R, D>))
        .route("/api/v1/admin/summary", get(summary_handler::<R, D>))
        .route("/api/v1/admin/export", get(export_handler::<R, D>))
        .route(
            "/api/v1/admin/employees",
            get(employees_handler::<R, D>).post(create_employee_handler::<R, D>),
        )
        .route(
            "/api/v1/admin/employees/:employee_id",
            put(update_employee_handler::<R, D>),
        )
        .with_state(service)
}

/// Quarter/year selection shared by the summary, export, and window endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PeriodParams {
    #[serde(default)]
    quarter: Option<u8>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    department: Option<String>,
}

impl PeriodParams {
    fn require(&self) -> Result<(u8, i32, Option<&str>), Response> {
        match (self.quarter, self.year) {
            (Some(quarter), Some(year)) => Ok((
                quarter,
                year,
                self.department.as_deref().filter(|dept| !dept.is_empty()),
            )),
            _ => Err(bad_request("quarter and year are required")),
        }
    }
}

fn authenticate<R, D>(
    service: &ReviewService<R, D>,
    headers: &HeaderMap,
) -> Result<Employee, ReviewServiceError>
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    let id = headers
        .get(EMPLOYEE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ReviewServiceError::Unauthenticated)?;
    service.authenticate(&EmployeeId(id.to_string()))
}

pub(crate) async fn save_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    headers: HeaderMap,
    payload: Result<Json<ReviewDraft>, JsonRejection>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    let draft = match payload {
        Ok(Json(draft)) => draft,
        Err(rejection) => return draft_rejection(rejection),
    };
    let result = authenticate(&service, &headers).and_then(|actor| service.save(&actor, draft));
    match result {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn my_reviews_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    headers: HeaderMap,
) -> Response
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    match authenticate(&service, &headers).and_then(|actor| service.reviews_by(&actor)) {
        Ok(records) => {
            let payload = json!({ "count": records.len(), "reviews": records });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn pending_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    headers: HeaderMap,
) -> Response
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    match authenticate(&service, &headers).and_then(|actor| service.pending(&actor)) {
        Ok(pending) => (StatusCode::OK, Json(pending)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn window_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    headers: HeaderMap,
    Query(params): Query<PeriodParams>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    let (quarter, year, _) = match params.require() {
        Ok(selection) => selection,
        Err(response) => return response,
    };
    match authenticate(&service, &headers).and_then(|_| service.window_status(quarter, year)) {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    headers: HeaderMap,
    Path(review_id): Path<String>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    let id = ReviewId(review_id);
    match authenticate(&service, &headers).and_then(|actor| service.get(&actor, &id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn colleagues_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    headers: HeaderMap,
) -> Response
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    match authenticate(&service, &headers).and_then(|actor| service.colleagues(&actor)) {
        Ok(employees) => {
            let payload = json!({ "count": employees.len(), "employees": employees });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn query_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    headers: HeaderMap,
    Query(query): Query<ReviewQuery>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    match authenticate(&service, &headers).and_then(|actor| service.query(&actor, &query)) {
        Ok(records) => {
            let payload = json!({ "count": records.len(), "reviews": records });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn summary_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    headers: HeaderMap,
    Query(params): Query<PeriodParams>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    let (quarter, year, department) = match params.require() {
        Ok(selection) => selection,
        Err(response) => return response,
    };
    let result = authenticate(&service, &headers)
        .and_then(|actor| service.summary(&actor, quarter, year, department));
    match result {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    headers: HeaderMap,
    Query(params): Query<PeriodParams>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    let (quarter, year, department) = match params.require() {
        Ok(selection) => selection,
        Err(response) => return response,
    };
    let result = authenticate(&service, &headers)
        .and_then(|actor| service.export(&actor, quarter, year, department));
    match result {
        Ok(export) => {
            let disposition = format!("attachment; filename=\"{}\"", export.file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                export.body,
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn employees_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    headers: HeaderMap,
) -> Response
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    match authenticate(&service, &headers).and_then(|actor| service.employees(&actor)) {
        Ok(employees) => {
            let payload = json!({ "count": employees.len(), "employees": employees });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_employee_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    headers: HeaderMap,
    Json(new_employee): Json<NewEmployee>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    let result = authenticate(&service, &headers)
        .and_then(|actor| service.create_employee(&actor, new_employee));
    match result {
        Ok(employee) => (StatusCode::CREATED, Json(employee)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_employee_handler<R, D>(
    State(service): State<SharedService<R, D>>,
    headers: HeaderMap,
    Path(employee_id): Path<String>,
    Json(update): Json<EmployeeUpdate>,
) -> Response
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    let id = EmployeeId(employee_id);
    let result = authenticate(&service, &headers)
        .and_then(|actor| service.update_employee(&actor, &id, update));
    match result {
        Ok(employee) => (StatusCode::OK, Json(employee)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Body errors that point at a rating are reported like failed score validation.
fn draft_rejection(rejection: JsonRejection) -> Response {
    let message = rejection.body_text();
    let dimension = Dimension::ordered()
        .into_iter()
        .map(Dimension::key)
        .find(|key| message.contains(&format!("scores.{key}:")));
    match dimension {
        Some(dimension) => {
            let payload = json!({ "error": message, "dimension": dimension });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        None => {
            let payload = json!({ "error": message });
            (rejection.status(), Json(payload)).into_response()
        }
    }
}

fn bad_request(message: &str) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

pub(crate) fn error_response(error: ReviewServiceError) -> Response {
    let message = error.to_string();
    let (status, payload) = match &error {
        ReviewServiceError::Validation(validation) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "error": message,
                "dimension": validation.dimension().map(|dimension| dimension.key()),
            }),
        ),
        ReviewServiceError::Policy(PolicyViolation::SubmissionClosed {
            opens_on,
            closes_on,
            ..
        }) => (
            StatusCode::FORBIDDEN,
            json!({
                "error": message,
                "window": { "opens_on": opens_on, "closes_on": closes_on },
            }),
        ),
        ReviewServiceError::Policy(PolicyViolation::NoWindow(_))
        | ReviewServiceError::Forbidden(_) => {
            (StatusCode::FORBIDDEN, json!({ "error": message }))
        }
        ReviewServiceError::Unauthenticated => {
            (StatusCode::UNAUTHORIZED, json!({ "error": message }))
        }
        ReviewServiceError::NotFound(_)
        | ReviewServiceError::UnknownEmployee(_)
        | ReviewServiceError::Directory(DirectoryError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, json!({ "error": message }))
        }
        ReviewServiceError::Directory(DirectoryError::DuplicateEmployeeCode(_)) => {
            (StatusCode::CONFLICT, json!({ "error": message }))
        }
        ReviewServiceError::Directory(DirectoryError::MissingField(_)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": message }))
        }
        ReviewServiceError::Directory(DirectoryError::Unavailable(_))
        | ReviewServiceError::Repository(_)
        | ReviewServiceError::Export(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
        }
    };
    (status, Json(payload)).into_response()
}
