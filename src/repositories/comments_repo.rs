use async_trait::async_trait;
use uuid::Uuid;

use crate::{models::comments::CommentWithAuthor, Result};

use super::PostgresRepo;

#[async_trait]
pub trait CommentRepository: Sync + Send {
    async fn post_exists(&self, post_id: Uuid) -> Result<bool>;
    async fn insert_comment(&self, post_id: Uuid, author_id: Uuid, content: &str) -> Result<Uuid>;
    async fn update_comment(&self, comment_id: Uuid, content: &str) -> Result<u64>;
    async fn delete_comment(&self, comment_id: Uuid) -> Result<u64>;
    /// Same count-equals-one guard as posts, keyed by comment author.
    async fn select_count_comment(&self, comment_id: Uuid, author_id: Uuid) -> Result<i64>;
    async fn select_comments(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>>;
}

#[async_trait]
impl CommentRepository for PostgresRepo {
    async fn post_exists(&self, post_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn insert_comment(&self, post_id: Uuid, author_id: Uuid, content: &str) -> Result<Uuid> {
        let id = Uuid::now_v7();

        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, author_id, content)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(post_id)
        .bind(author_id)
        .bind(content)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_comment(&self, comment_id: Uuid, content: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .bind(content)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn select_count_comment(&self, comment_id: Uuid, author_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comments WHERE id = $1 AND author_id = $2",
        )
        .bind(comment_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn select_comments(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.post_id, c.author_id, u.name AS author_name, c.content, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
