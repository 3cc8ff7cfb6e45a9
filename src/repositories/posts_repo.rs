use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    models::{
        page::SortKey,
        posts::{ImageMeta, Post, PostDetail, PostSummary},
    },
    Result,
};

use super::PostgresRepo;

/// Store primitives the post lifecycle core depends on. Every method is
/// atomic on its own; `delete_post_with_links` bundles the post row and its
/// image link rows into a single transaction so neither can outlive the
/// other.
#[async_trait]
pub trait PostRepository: Sync + Send {
    /// Inserts a post row and returns the store-assigned id.
    async fn insert_post(
        &self,
        owner_id: Uuid,
        title: &str,
        content: &str,
        has_image: bool,
    ) -> Result<Uuid>;

    /// Replaces title and content; `attaching_images` folds into the
    /// existing flag (`has_image OR attaching_images`) since attachments
    /// only accumulate during a post's life.
    async fn update_post(
        &self,
        post_id: Uuid,
        title: &str,
        content: &str,
        attaching_images: bool,
    ) -> Result<u64>;

    /// Deletes the post row and all its image link rows transactionally.
    /// Also the compensation path for a failed attachment during creation,
    /// where stray link rows must not block the post-row delete.
    async fn delete_post_with_links(&self, post_id: Uuid) -> Result<()>;

    /// Ownership guard primitive: 1 iff the post exists and is owned.
    async fn select_count_post(&self, post_id: Uuid, owner_id: Uuid) -> Result<i64>;

    async fn select_total_count(&self) -> Result<i64>;

    async fn select_post_summary_list(
        &self,
        limit: i64,
        offset: i64,
        sort: SortKey,
    ) -> Result<Vec<PostSummary>>;

    /// Increments the view counter and reports how many rows were touched.
    /// The affected-row count doubles as the existence check, evaluated
    /// atomically by the store.
    async fn update_views_and_get_affected_rows(&self, post_id: Uuid) -> Result<u64>;

    async fn select_post_details(&self, post_id: Uuid) -> Result<Option<PostDetail>>;
}

#[async_trait]
impl PostRepository for PostgresRepo {
    async fn insert_post(
        &self,
        owner_id: Uuid,
        title: &str,
        content: &str,
        has_image: bool,
    ) -> Result<Uuid> {
        let id = Uuid::now_v7();

        sqlx::query(
            r#"
            INSERT INTO posts (id, owner_id, title, content, has_image)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(title)
        .bind(content)
        .bind(has_image)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        title: &str,
        content: &str,
        attaching_images: bool,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2,
                content = $3,
                has_image = has_image OR $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .bind(title)
        .bind(content)
        .bind(attaching_images)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_post_with_links(&self, post_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM post_images WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn select_count_post(&self, post_id: Uuid, owner_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE id = $1 AND owner_id = $2",
        )
        .bind(post_id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn select_total_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn select_post_summary_list(
        &self,
        limit: i64,
        offset: i64,
        sort: SortKey,
    ) -> Result<Vec<PostSummary>> {
        // Static fragments only; sort keys never come from raw user input.
        let order = match sort {
            SortKey::Newest => "p.created_at DESC",
            SortKey::Views => "p.views DESC, p.created_at DESC",
        };

        let sql = format!(
            r#"
            SELECT p.id, p.title, u.name AS author_name, p.has_image, p.views, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.owner_id
            ORDER BY {order}
            LIMIT $1 OFFSET $2
            "#
        );

        let summaries = sqlx::query_as::<_, PostSummary>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(summaries)
    }

    async fn update_views_and_get_affected_rows(&self, post_id: Uuid) -> Result<u64> {
        let result = sqlx::query("UPDATE posts SET views = views + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn select_post_details(&self, post_id: Uuid) -> Result<Option<PostDetail>> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(post) = post else {
            return Ok(None);
        };

        let author_name: String = sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
            .bind(post.owner_id)
            .fetch_one(&self.pool)
            .await?;

        let images = sqlx::query_as::<_, ImageMeta>(
            r#"
            SELECT id, file_name, thumbnail_name, original_name
            FROM post_images
            WHERE post_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(PostDetail {
            id: post.id,
            owner_id: post.owner_id,
            title: post.title,
            content: post.content,
            author_name,
            has_image: post.has_image,
            views: post.views,
            created_at: post.created_at,
            images,
        }))
    }
}
