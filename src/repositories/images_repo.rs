use async_trait::async_trait;
use uuid::Uuid;

use crate::{models::posts::ImageMeta, Result};

use super::PostgresRepo;

/// Stored-file names for a link row about to be recorded.
#[derive(Debug, Clone)]
pub struct NewImageLink {
    pub file_name: String,
    pub thumbnail_name: String,
    pub original_name: String,
}

/// Row store for post-image links. File bytes live on disk and are owned by
/// the image service; this trait only covers the metadata rows.
#[async_trait]
pub trait ImageRepository: Sync + Send {
    /// Records all link rows in a single transaction: either every row
    /// commits or none do.
    async fn insert_images(&self, post_id: Uuid, links: &[NewImageLink]) -> Result<()>;

    /// Returns the stored metadata rows for a post and deletes them.
    async fn delete_images(&self, post_id: Uuid) -> Result<Vec<ImageMeta>>;
}

#[async_trait]
impl ImageRepository for PostgresRepo {
    async fn insert_images(&self, post_id: Uuid, links: &[NewImageLink]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for link in links {
            sqlx::query(
                r#"
                INSERT INTO post_images (id, post_id, file_name, thumbnail_name, original_name)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(post_id)
            .bind(&link.file_name)
            .bind(&link.thumbnail_name)
            .bind(&link.original_name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn delete_images(&self, post_id: Uuid) -> Result<Vec<ImageMeta>> {
        let removed = sqlx::query_as::<_, ImageMeta>(
            r#"
            DELETE FROM post_images
            WHERE post_id = $1
            RETURNING id, file_name, thumbnail_name, original_name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(removed)
    }
}
