use async_trait::async_trait;
use uuid::Uuid;

use crate::{models::users::User, Result};

use super::PostgresRepo;

#[async_trait]
pub trait UserRepository: Sync + Send {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;
}

#[async_trait]
impl UserRepository for PostgresRepo {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<User> {
        let id = Uuid::now_v7();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
