use async_trait::async_trait;

use crate::{
    courses::repo_types::{Course, CoursePatch, NewCourse},
    db::PgStore,
    error::AppError,
};

/// Course persistence. Every call is scoped by `owner`; a row that belongs
/// to somebody else behaves exactly like a missing one.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Newest first.
    async fn list(&self, owner: &str) -> Result<Vec<Course>, AppError>;

    async fn insert(&self, owner: &str, new: NewCourse) -> Result<Course, AppError>;

    async fn update(
        &self,
        owner: &str,
        id: i64,
        patch: CoursePatch,
    ) -> Result<Option<Course>, AppError>;

    /// `true` if a row was removed.
    async fn delete(&self, owner: &str, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
impl CourseStore for PgStore {
    async fn list(&self, owner: &str) -> Result<Vec<Course>, AppError> {
        let rows = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, owner_email, code, title, credits, grade, semester, created_at, updated_at
            FROM courses
            WHERE owner_email = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, owner: &str, new: NewCourse) -> Result<Course, AppError> {
        let row = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (owner_email, code, title, credits, grade, semester)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, owner_email, code, title, credits, grade, semester, created_at, updated_at
            "#,
        )
        .bind(owner)
        .bind(&new.code)
        .bind(&new.title)
        .bind(new.credits)
        .bind(new.grade)
        .bind(&new.semester)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        owner: &str,
        id: i64,
        patch: CoursePatch,
    ) -> Result<Option<Course>, AppError> {
        let (semester_set, semester) = match patch.semester {
            Some(value) => (true, value),
            None => (false, None),
        };
        let row = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses
               SET code = COALESCE($3, code),
                   title = COALESCE($4, title),
                   credits = COALESCE($5, credits),
                   grade = COALESCE($6, grade),
                   semester = CASE WHEN $7 THEN $8 ELSE semester END,
                   updated_at = now()
             WHERE id = $1 AND owner_email = $2
            RETURNING id, owner_email, code, title, credits, grade, semester, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&patch.code)
        .bind(&patch.title)
        .bind(patch.credits)
        .bind(patch.grade)
        .bind(semester_set)
        .bind(&semester)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, owner: &str, id: i64) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM courses WHERE id = $1 AND owner_email = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
