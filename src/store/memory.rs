use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CatalogStore, StoreError, StoreResult};
use crate::courses::repo_types::{Course, CourseInput, CourseWithOwner};
use crate::users::repo_types::{NewUser, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    courses: BTreeMap<i64, Course>,
    last_user_id: i64,
    last_course_id: i64,
}

impl Tables {
    fn join(&self, course: &Course) -> Option<CourseWithOwner> {
        self.users.get(&course.user_id).map(|owner| CourseWithOwner {
            course: course.clone(),
            owner: owner.clone(),
        })
    }
}

/// In-process store with the same semantics as the Postgres one.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email_address == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.email_address == user.email_address)
        {
            return Err(StoreError::DuplicateEmail(user.email_address));
        }
        tables.last_user_id += 1;
        let row = User {
            id: tables.last_user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email_address: user.email_address,
            password_hash: user.password_hash,
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_courses(&self) -> StoreResult<Vec<CourseWithOwner>> {
        let tables = self.tables.read().await;
        Ok(tables
            .courses
            .values()
            .filter_map(|c| tables.join(c))
            .collect())
    }

    async fn find_course(&self, id: i64) -> StoreResult<Option<Course>> {
        Ok(self.tables.read().await.courses.get(&id).cloned())
    }

    async fn find_course_with_owner(&self, id: i64) -> StoreResult<Option<CourseWithOwner>> {
        let tables = self.tables.read().await;
        Ok(tables.courses.get(&id).and_then(|c| tables.join(c)))
    }

    async fn create_course(&self, owner_id: i64, input: CourseInput) -> StoreResult<Course> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&owner_id) {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        tables.last_course_id += 1;
        let row = Course {
            id: tables.last_course_id,
            title: input.title,
            description: input.description,
            estimated_time: input.estimated_time,
            materials_needed: input.materials_needed,
            user_id: owner_id,
        };
        tables.courses.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_course(&self, id: i64, input: CourseInput) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(course) = tables.courses.get_mut(&id) else {
            return Ok(false);
        };
        course.title = input.title;
        course.description = input.description;
        course.estimated_time = input.estimated_time;
        course.materials_needed = input.materials_needed;
        Ok(true)
    }

    async fn delete_course(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.courses.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email_address: email.into(),
            password_hash: "hash".into(),
        }
    }

    fn input(title: &str) -> CourseInput {
        CourseInput {
            title: title.into(),
            description: "desc".into(),
            estimated_time: None,
            materials_needed: Some("paper".into()),
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.create_user(new_user("ada@example.com")).await.unwrap();
        let err = store
            .create_user(new_user("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(ref email) if email == "ada@example.com"));
    }

    #[tokio::test]
    async fn ids_are_sequential_and_courses_join_owner() {
        let store = MemoryStore::new();
        let ada = store.create_user(new_user("ada@example.com")).await.unwrap();
        let bob = store.create_user(new_user("bob@example.com")).await.unwrap();
        assert_eq!((ada.id, bob.id), (1, 2));

        let first = store.create_course(bob.id, input("first")).await.unwrap();
        let second = store.create_course(ada.id, input("second")).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let all = store.list_courses().await.unwrap();
        let owners: Vec<_> = all.iter().map(|c| c.owner.id).collect();
        assert_eq!(owners, vec![bob.id, ada.id]);

        let found = store.find_course_with_owner(second.id).await.unwrap().unwrap();
        assert_eq!(found.owner.email_address, "ada@example.com");
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let store = MemoryStore::new();
        let ada = store.create_user(new_user("ada@example.com")).await.unwrap();
        let course = store.create_course(ada.id, input("old")).await.unwrap();

        assert!(store.update_course(course.id, input("new")).await.unwrap());
        assert_eq!(store.find_course(course.id).await.unwrap().unwrap().title, "new");
        assert!(!store.update_course(99, input("x")).await.unwrap());

        assert!(store.delete_course(course.id).await.unwrap());
        assert!(!store.delete_course(course.id).await.unwrap());
        assert!(store.find_course(course.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn course_requires_existing_owner() {
        let store = MemoryStore::new();
        assert!(store.create_course(7, input("orphan")).await.is_err());
    }
}
