use serde::{Deserialize, Serialize};

use super::repo_types::{CourseInput, CourseWithOwner};
use crate::users::dto::PublicUser;

/// Request body for creating or replacing a course.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub materials_needed: Option<String>,
}

impl From<CourseRequest> for CourseInput {
    fn from(r: CourseRequest) -> Self {
        Self {
            title: r.title,
            description: r.description,
            estimated_time: r.estimated_time,
            materials_needed: r.materials_needed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    #[serde(rename = "User")]
    pub user: PublicUser,
}

impl From<CourseWithOwner> for CourseResponse {
    fn from(CourseWithOwner { course, owner }: CourseWithOwner) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            estimated_time: course.estimated_time,
            materials_needed: course.materials_needed,
            user: owner.into(),
        }
    }
}
