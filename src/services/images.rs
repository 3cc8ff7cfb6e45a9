use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    models::posts::UploadedImage,
    repositories::images_repo::{ImageRepository, NewImageLink},
    Error, Result,
};

const THUMBNAIL_EDGE: u32 = 320;

/// Image attachment collaborator. The post lifecycle core only decides when
/// to call this; it never touches image bytes itself.
#[async_trait]
pub trait ImageService: Sync + Send {
    /// All-or-nothing: either every image in the list is stored and its link
    /// row recorded, or no link row is recorded at all.
    async fn save_images(&self, post_id: Uuid, images: &[UploadedImage]) -> Result<()>;

    /// Idempotent: deleting images for a post with none attached is a no-op.
    async fn delete_images(&self, post_id: Uuid) -> Result<()>;
}

/// Stores uploads on the local filesystem, generates thumbnails and records
/// one link row per stored image.
///
/// Files are written first; link rows commit in a single transaction only
/// after every file is on disk. Any failure discards the files written so
/// far, so a partial batch never becomes visible.
#[derive(Clone)]
pub struct FsImageService {
    repo: Arc<dyn ImageRepository>,
    root: PathBuf,
}

impl FsImageService {
    pub fn new(repo: Arc<dyn ImageRepository>, root: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            root: root.into(),
        }
    }

    /// Writes the original and its thumbnail; cleans up its own partial
    /// writes on failure.
    async fn store_files(&self, upload: &UploadedImage) -> Result<NewImageLink> {
        if let Some(content_type) = upload.content_type.as_deref() {
            if !content_type.starts_with("image/") {
                return Err(Error::Validation(format!(
                    "Unsupported upload type: {content_type}"
                )));
            }
        }

        let stem = Uuid::now_v7();
        let file_name = format!("{stem}{}", extension_of(&upload.file_name));
        let thumbnail_name = format!("{stem}_thumb.png");

        tokio::fs::write(self.root.join(&file_name), &upload.bytes)
            .await
            .map_err(|err| {
                error!("Failed to write image file: {err}");
                Error::AttachmentFailure
            })?;

        let bytes = upload.bytes.clone();
        let thumb_path = self.root.join(&thumbnail_name);

        // Decoding and resizing are CPU-bound; keep them off the runtime.
        let thumbnail = tokio::task::spawn_blocking(
            move || -> core::result::Result<(), image::ImageError> {
                let decoded = image::load_from_memory(&bytes)?;
                decoded.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE).save(thumb_path)
            },
        )
        .await
        .map_err(|_| Error::AttachmentFailure)
        .and_then(|result| {
            result.map_err(|err| {
                error!("Failed to generate thumbnail: {err}");
                Error::AttachmentFailure
            })
        });

        if let Err(err) = thumbnail {
            self.remove_file(&file_name).await;
            self.remove_file(&thumbnail_name).await;
            return Err(err);
        }

        Ok(NewImageLink {
            file_name,
            thumbnail_name,
            original_name: upload.file_name.clone(),
        })
    }

    async fn discard_files(&self, links: &[NewImageLink]) {
        for link in links {
            self.remove_file(&link.file_name).await;
            self.remove_file(&link.thumbnail_name).await;
        }
    }

    async fn remove_file(&self, name: &str) {
        if let Err(err) = tokio::fs::remove_file(self.root.join(name)).await {
            warn!("Failed to remove stored image {name}: {err}");
        }
    }
}

#[async_trait]
impl ImageService for FsImageService {
    async fn save_images(&self, post_id: Uuid, images: &[UploadedImage]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|err| {
            error!("Failed to create upload directory: {err}");
            Error::AttachmentFailure
        })?;

        let mut links = Vec::with_capacity(images.len());
        for upload in images {
            match self.store_files(upload).await {
                Ok(link) => links.push(link),
                Err(err) => {
                    self.discard_files(&links).await;
                    return Err(err);
                }
            }
        }

        if let Err(err) = self.repo.insert_images(post_id, &links).await {
            self.discard_files(&links).await;
            return Err(match err {
                Error::DatabaseError(_) => Error::AttachmentFailure,
                other => other,
            });
        }

        Ok(())
    }

    async fn delete_images(&self, post_id: Uuid) -> Result<()> {
        let removed = self.repo.delete_images(post_id).await?;

        // Row removal is authoritative; stray files only waste disk space.
        for meta in removed {
            self.remove_file(&meta.file_name).await;
            self.remove_file(&meta.thumbnail_name).await;
        }

        Ok(())
    }
}

fn extension_of(original_name: &str) -> String {
    std::path::Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Mutex;

    use crate::models::posts::ImageMeta;

    use super::*;

    #[derive(Default)]
    struct MemoryImageRows {
        fail_inserts: bool,
        rows: Mutex<Vec<NewImageLink>>,
    }

    #[async_trait]
    impl ImageRepository for MemoryImageRows {
        async fn insert_images(&self, _post_id: Uuid, links: &[NewImageLink]) -> Result<()> {
            if self.fail_inserts {
                return Err(Error::DatabaseError(sqlx::Error::PoolClosed));
            }
            self.rows.lock().unwrap().extend_from_slice(links);
            Ok(())
        }

        async fn delete_images(&self, _post_id: Uuid) -> Result<Vec<ImageMeta>> {
            let rows = std::mem::take(&mut *self.rows.lock().unwrap());
            Ok(rows
                .into_iter()
                .map(|link| ImageMeta {
                    id: Uuid::now_v7(),
                    file_name: link.file_name,
                    thumbnail_name: link.thumbnail_name,
                    original_name: link.original_name,
                })
                .collect())
        }
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("community-images-{}", Uuid::now_v7()))
    }

    fn png_upload(name: &str) -> UploadedImage {
        let mut bytes = Vec::new();
        image::DynamicImage::new_rgba8(1, 1)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        UploadedImage {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes,
        }
    }

    fn broken_upload(name: &str) -> UploadedImage {
        UploadedImage {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![0, 1, 2, 3],
        }
    }

    async fn stored_file_count(root: &PathBuf) -> usize {
        let Ok(mut entries) = tokio::fs::read_dir(root).await else {
            return 0;
        };
        let mut count = 0;
        while let Ok(Some(_)) = entries.next_entry().await {
            count += 1;
        }
        count
    }

    #[tokio::test]
    async fn saves_files_and_rows_for_a_full_batch() {
        let repo = Arc::new(MemoryImageRows::default());
        let root = scratch_dir();
        let svc = FsImageService::new(repo.clone(), root.clone());

        svc.save_images(Uuid::now_v7(), &[png_upload("a.png"), png_upload("b.png")])
            .await
            .unwrap();

        assert_eq!(repo.rows.lock().unwrap().len(), 2);
        // Original plus thumbnail per upload.
        assert_eq!(stored_file_count(&root).await, 4);

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn failure_midway_through_the_batch_records_nothing() {
        let repo = Arc::new(MemoryImageRows::default());
        let root = scratch_dir();
        let svc = FsImageService::new(repo.clone(), root.clone());

        let err = svc
            .save_images(
                Uuid::now_v7(),
                &[png_upload("a.png"), broken_upload("b.png")],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AttachmentFailure));
        assert!(repo.rows.lock().unwrap().is_empty());
        assert_eq!(stored_file_count(&root).await, 0);

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn failed_row_insert_discards_every_stored_file() {
        let repo = Arc::new(MemoryImageRows {
            fail_inserts: true,
            ..MemoryImageRows::default()
        });
        let root = scratch_dir();
        let svc = FsImageService::new(repo.clone(), root.clone());

        let err = svc
            .save_images(Uuid::now_v7(), &[png_upload("a.png"), png_upload("b.png")])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AttachmentFailure));
        assert!(repo.rows.lock().unwrap().is_empty());
        assert_eq!(stored_file_count(&root).await, 0);

        tokio::fs::remove_dir_all(&root).await.ok();
    }
}
