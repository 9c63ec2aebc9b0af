use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateCourseRequest, UpdateCourseRequest},
    repo_types::Course,
    services::{self, GpaSummary},
};
use crate::{auth::extractors::AuthUser, error::AppError, extract::ApiJson, state::AppState};

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/", get(list_courses).post(create_course))
        .route("/courses/summary", get(gpa_summary))
        .route("/courses/:id", put(update_course).delete(delete_course))
}

#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = services::list(state.courses.as_ref(), &owner).await?;
    Ok(Json(courses))
}

#[instrument(skip(state, payload))]
pub async fn create_course(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    ApiJson(payload): ApiJson<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = services::create(state.courses.as_ref(), &owner, payload.into()).await?;
    info!(course_id = course.id, "course created");
    Ok((StatusCode::CREATED, Json(course)))
}

#[instrument(skip(state, payload))]
pub async fn update_course(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let course = services::update(state.courses.as_ref(), &owner, id, payload.into()).await?;
    Ok(Json(course))
}

#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::delete(state.courses.as_ref(), &owner, id).await?;
    info!(course_id = id, "course deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn gpa_summary(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
) -> Result<Json<GpaSummary>, AppError> {
    let summary = services::summary(state.courses.as_ref(), &owner).await?;
    Ok(Json(summary))
}
