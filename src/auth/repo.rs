use async_trait::async_trait;

use crate::{
    auth::repo_types::{NewUser, User, UserChanges},
    db::PgStore,
    error::AppError,
};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Fails with [`AppError::Conflict`] when the email is already taken.
    async fn create(&self, new: NewUser) -> Result<User, AppError>;

    /// Returns `None` when no such user exists.
    async fn update(&self, email: &str, changes: UserChanges) -> Result<Option<User>, AppError>;
}

pub(crate) fn email_taken() -> AppError {
    AppError::Conflict("Email already registered".into())
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, full_name, is_active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> Result<User, AppError> {
        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, full_name, is_active, created_at, updated_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.full_name)
        .fetch_one(&self.pool)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(email_taken()),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, email: &str, changes: UserChanges) -> Result<Option<User>, AppError> {
        let (name_set, full_name) = match changes.full_name {
            Some(name) => (true, name),
            None => (false, None),
        };
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET full_name = CASE WHEN $2 THEN $3 ELSE full_name END,
                   password_hash = COALESCE($4, password_hash),
                   updated_at = now()
             WHERE email = $1
            RETURNING id, email, password_hash, full_name, is_active, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(name_set)
        .bind(&full_name)
        .bind(&changes.password_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
