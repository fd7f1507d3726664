use async_trait::async_trait;
use sqlx::PgPool;

use abi::errors::{Error, Result};
use abi::model::{Onboarding, User};

use crate::user::UserRepo;

#[derive(Debug)]
pub struct PostgresUser {
    pool: PgPool,
}

impl PostgresUser {
    pub fn new(pool: PgPool) -> Self {
        PostgresUser { pool }
    }
}

fn map_email_conflict(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Error::email_taken(),
        _ => err.into(),
    }
}

#[async_trait]
impl UserRepo for PostgresUser {
    async fn create_user(&self, user: User) -> Result<User> {
        let now = chrono::Utc::now().timestamp_millis();
        let result = sqlx::query_as(
            "INSERT INTO users
            (id, full_name, email, password, bio, profile_pic, native_language,
             learning_language, location, is_onboarded, create_time, update_time)
            VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11) RETURNING *",
        )
        .bind(&user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.bio)
        .bind(&user.profile_pic)
        .bind(&user.native_language)
        .bind(&user.learning_language)
        .bind(&user.location)
        .bind(user.is_onboarded)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_email_conflict)?;
        Ok(result)
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let users = sqlx::query_as("SELECT * FROM users WHERE id = ANY($1) ORDER BY create_time")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update_onboarding(&self, id: &str, profile: &Onboarding) -> Result<User> {
        let user = sqlx::query_as(
            "UPDATE users SET
            full_name = $2,
            bio = $3,
            native_language = $4,
            learning_language = $5,
            location = $6,
            is_onboarded = TRUE,
            update_time = $7
            WHERE id = $1
            RETURNING *",
        )
        .bind(id)
        .bind(&profile.full_name)
        .bind(&profile.bio)
        .bind(&profile.native_language)
        .bind(&profile.learning_language)
        .bind(&profile.location)
        .bind(chrono::Utc::now().timestamp_millis())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found_with_details(format!("user {id} not found")))?;
        Ok(user)
    }

    async fn recommended(&self, user_id: &str) -> Result<Vec<User>> {
        let users = sqlx::query_as(
            "SELECT u.* FROM users AS u
             WHERE u.id <> $1
             AND u.is_onboarded = TRUE
             AND NOT EXISTS (
                SELECT 1 FROM friendships AS f
                WHERE (f.user_low = $1 AND f.user_high = u.id)
                   OR (f.user_high = $1 AND f.user_low = u.id)
             )
             ORDER BY u.create_time DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
