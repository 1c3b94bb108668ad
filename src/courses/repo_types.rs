use sqlx::FromRow;

use crate::users::repo_types::User;

/// Course record in the database. `user_id` references the owning user.
#[derive(Debug, Clone, FromRow)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    pub user_id: i64,
}

/// A course joined with its owner.
#[derive(Debug, Clone)]
pub struct CourseWithOwner {
    pub course: Course,
    pub owner: User,
}

/// Writable course fields, shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseInput {
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
}
