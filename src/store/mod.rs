//! Persistence boundary for users and courses.
//!
//! Handlers only see [`CatalogStore`]; the Postgres implementation is used in
//! production and [`MemoryStore`] backs tests and local runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::courses::repo_types::{Course, CourseInput, CourseWithOwner};
use crate::users::repo_types::{NewUser, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email address {0:?} already in use")]
    DuplicateEmail(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Inserts a user. Fails with [`StoreError::DuplicateEmail`] if the email is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// All courses with their owners, ordered by id.
    async fn list_courses(&self) -> StoreResult<Vec<CourseWithOwner>>;

    async fn find_course(&self, id: i64) -> StoreResult<Option<Course>>;

    async fn find_course_with_owner(&self, id: i64) -> StoreResult<Option<CourseWithOwner>>;

    async fn create_course(&self, owner_id: i64, input: CourseInput) -> StoreResult<Course>;

    /// Returns `false` if no course with `id` exists.
    async fn update_course(&self, id: i64, input: CourseInput) -> StoreResult<bool>;

    /// Returns `false` if no course with `id` exists.
    async fn delete_course(&self, id: i64) -> StoreResult<bool>;
}
