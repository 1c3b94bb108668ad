use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use tracing::warn;

use super::repo_types::Course;
use crate::{
    error::{ApiError, COURSE_NOT_FOUND, NOT_COURSE_OWNER},
    store::CatalogStore,
    users::repo_types::User,
};

/// Path ids that are not integers name no course.
pub fn parse_course_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::NotFound(COURSE_NOT_FOUND))
}

/// The `:id` segment of a course route.
///
/// A segment that fails to percent-decode is treated like any other
/// non-integer id and rejected with the course 404.
#[derive(Debug, Clone, Copy)]
pub struct CourseId(pub i64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CourseId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound(COURSE_NOT_FOUND))?;
        parse_course_id(&raw).map(Self)
    }
}

/// Loads a course the caller is about to mutate. Checked on every request.
pub async fn load_owned_course(
    store: &dyn CatalogStore,
    course_id: i64,
    user: &User,
) -> Result<Course, ApiError> {
    let course = store
        .find_course(course_id)
        .await?
        .ok_or(ApiError::NotFound(COURSE_NOT_FOUND))?;

    if course.user_id != user.id {
        warn!(
            course_id,
            owner_id = course.user_id,
            user_id = user.id,
            "course owned by a different user"
        );
        return Err(ApiError::Forbidden(NOT_COURSE_OWNER));
    }
    Ok(course)
}
