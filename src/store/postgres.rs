use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use super::{CatalogStore, StoreError, StoreResult};
use crate::courses::repo_types::{Course, CourseInput, CourseWithOwner};
use crate::users::repo_types::{NewUser, User};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

/// One row of the courses/users join.
#[derive(Debug, FromRow)]
struct CourseOwnerRow {
    id: i64,
    title: String,
    description: String,
    estimated_time: Option<String>,
    materials_needed: Option<String>,
    user_id: i64,
    owner_first_name: String,
    owner_last_name: String,
    owner_email_address: String,
    owner_password_hash: String,
}

impl From<CourseOwnerRow> for CourseWithOwner {
    fn from(r: CourseOwnerRow) -> Self {
        Self {
            owner: User {
                id: r.user_id,
                first_name: r.owner_first_name,
                last_name: r.owner_last_name,
                email_address: r.owner_email_address,
                password_hash: r.owner_password_hash,
            },
            course: Course {
                id: r.id,
                title: r.title,
                description: r.description,
                estimated_time: r.estimated_time,
                materials_needed: r.materials_needed,
                user_id: r.user_id,
            },
        }
    }
}

const COURSE_WITH_OWNER_SELECT: &str = r#"
    SELECT c.id, c.title, c.description, c.estimated_time, c.materials_needed,
           c.user_id,
           u.first_name    AS owner_first_name,
           u.last_name     AS owner_last_name,
           u.email_address AS owner_email_address,
           u.password_hash AS owner_password_hash
      FROM courses c
      JOIN users u ON u.id = c.user_id
"#;

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email_address, password_hash
              FROM users
             WHERE email_address = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, email_address, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, email_address, password_hash
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email_address)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateEmail(user.email_address.clone())
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn list_courses(&self) -> StoreResult<Vec<CourseWithOwner>> {
        let sql = format!("{COURSE_WITH_OWNER_SELECT} ORDER BY c.id");
        let rows = sqlx::query_as::<_, CourseOwnerRow>(&sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(CourseWithOwner::from).collect())
    }

    async fn find_course(&self, id: i64) -> StoreResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, title, description, estimated_time, materials_needed,
                   user_id
              FROM courses
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(course)
    }

    async fn find_course_with_owner(&self, id: i64) -> StoreResult<Option<CourseWithOwner>> {
        let sql = format!("{COURSE_WITH_OWNER_SELECT} WHERE c.id = $1");
        let row = sqlx::query_as::<_, CourseOwnerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(CourseWithOwner::from))
    }

    async fn create_course(&self, owner_id: i64, input: CourseInput) -> StoreResult<Course> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (title, description, estimated_time, materials_needed, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, estimated_time, materials_needed,
                      user_id
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.estimated_time)
        .bind(&input.materials_needed)
        .bind(owner_id)
        .fetch_one(&self.db)
        .await?;
        Ok(course)
    }

    async fn update_course(&self, id: i64, input: CourseInput) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE courses
               SET title = $2,
                   description = $3,
                   estimated_time = $4,
                   materials_needed = $5,
                   updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.estimated_time)
        .bind(&input.materials_needed)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_course(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
