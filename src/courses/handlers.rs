use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument};

use super::{
    dto::{CourseRequest, CourseResponse},
    repo_types::CourseInput,
    services::{load_owned_course, CourseId},
};
use crate::{
    auth::CurrentUser,
    error::{ApiError, COURSE_NOT_FOUND},
    state::AppState,
    validation::{self, required, JsonBody, Rule},
};

const COURSE_RULES: &[Rule] = &[
    required("title", r#"Please provide a value for "title""#),
    required("description", r#"Please provide a value for "description""#),
];

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/:id",
            get(get_course).put(update_course).delete(delete_course),
        )
}

fn course_input(body: Value) -> Result<CourseInput, ApiError> {
    validation::validate(&body, COURSE_RULES)?;
    let req: CourseRequest = validation::decode(body)?;
    Ok(req.into())
}

#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = state.store.list_courses().await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    CourseId(id): CourseId,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = state
        .store
        .find_course_with_owner(id)
        .await?
        .ok_or(ApiError::NotFound(COURSE_NOT_FOUND))?;
    Ok(Json(course.into()))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn create_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response, ApiError> {
    let input = course_input(body)?;
    let course = state.store.create_course(user.id, input).await?;

    info!(course_id = course.id, "course created");
    let location = format!("/courses/{}", course.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

/// Ownership is settled before the body is read, so a non-owner always gets 403.
#[instrument(skip_all, fields(user_id = user.id, course_id = id))]
pub async fn update_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    CourseId(id): CourseId,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let course = load_owned_course(state.store.as_ref(), id, &user).await?;
    let input = course_input(validation::parse_json(&body)?)?;

    if !state.store.update_course(course.id, input).await? {
        return Err(ApiError::NotFound(COURSE_NOT_FOUND));
    }
    info!("course updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(user_id = user.id, course_id = id))]
pub async fn delete_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    CourseId(id): CourseId,
) -> Result<StatusCode, ApiError> {
    let course = load_owned_course(state.store.as_ref(), id, &user).await?;

    if !state.store.delete_course(course.id).await? {
        return Err(ApiError::NotFound(COURSE_NOT_FOUND));
    }
    info!("course deleted");
    Ok(StatusCode::NO_CONTENT)
}
