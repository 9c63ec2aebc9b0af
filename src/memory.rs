use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::{email_taken, UserStore},
        repo_types::{NewUser, User, UserChanges},
    },
    courses::{
        repo::CourseStore,
        repo_types::{Course, CoursePatch, NewCourse},
    },
    error::AppError,
};

/// In-process store used for `memory://` and in tests. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    courses: RwLock<Courses>,
}

#[derive(Default)]
struct Courses {
    next_id: i64,
    rows: Vec<Course>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn deactivate(&self, email: &str) -> bool {
        match self.users.write().await.get_mut(email) {
            Some(user) => {
                user.is_active = false;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.contains_key(&new.email) {
            return Err(email_taken());
        }
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            full_name: new.full_name,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn update(&self, email: &str, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(email) else {
            return Ok(None);
        };
        if let Some(full_name) = changes.full_name {
            user.full_name = full_name;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Some(OffsetDateTime::now_utc());
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn list(&self, owner: &str) -> Result<Vec<Course>, AppError> {
        let courses = self.courses.read().await;
        // Ids grow with insertion order, so reverse id order is newest first.
        let mut rows: Vec<Course> = courses
            .rows
            .iter()
            .filter(|c| c.owner_email == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn insert(&self, owner: &str, new: NewCourse) -> Result<Course, AppError> {
        let mut courses = self.courses.write().await;
        courses.next_id += 1;
        let course = Course {
            id: courses.next_id,
            owner_email: owner.to_string(),
            code: new.code,
            title: new.title,
            credits: new.credits,
            grade: new.grade,
            semester: new.semester,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };
        courses.rows.push(course.clone());
        Ok(course)
    }

    async fn update(
        &self,
        owner: &str,
        id: i64,
        patch: CoursePatch,
    ) -> Result<Option<Course>, AppError> {
        let mut courses = self.courses.write().await;
        let Some(course) = courses
            .rows
            .iter_mut()
            .find(|c| c.id == id && c.owner_email == owner)
        else {
            return Ok(None);
        };
        patch.apply(course);
        course.updated_at = Some(OffsetDateTime::now_utc());
        Ok(Some(course.clone()))
    }

    async fn delete(&self, owner: &str, id: i64) -> Result<bool, AppError> {
        let mut courses = self.courses.write().await;
        let before = courses.rows.len();
        courses
            .rows
            .retain(|c| !(c.id == id && c.owner_email == owner));
        Ok(courses.rows.len() < before)
    }
}
