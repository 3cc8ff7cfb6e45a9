use std::sync::Arc;

use uuid::Uuid;

use crate::{
    models::{
        page::{resolve_page, PageRequest, PageResult, PAGE_SIZE},
        posts::{CreatePostInput, EditPostInput, PostDetail, PostSummary},
    },
    repositories::posts_repo::PostRepository,
    services::images::ImageService,
    Error, Result,
};

/// Post lifecycle core. Stateless between requests; the caller's identity is
/// resolved once at the request boundary and passed in explicitly.
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    images: Arc<dyn ImageService>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>, images: Arc<dyn ImageService>) -> Self {
        Self { repo, images }
    }

    /// Persists the post first so the new id exists before any image can
    /// reference it. If the attachment call fails afterwards, the inserted
    /// row is deleted again together with any link rows the attachment
    /// managed to record: a post must never claim `has_image` without its
    /// attachments actually stored.
    pub async fn create_post(&self, input: CreatePostInput, caller: Uuid) -> Result<Uuid> {
        validate_post_fields(&input.title, &input.content)?;

        let has_image = !input.images.is_empty();
        let post_id = self
            .repo
            .insert_post(caller, &input.title, &input.content, has_image)
            .await?;

        if has_image {
            if let Err(err) = self.images.save_images(post_id, &input.images).await {
                self.repo.delete_post_with_links(post_id).await?;
                return Err(err);
            }
        }

        Ok(post_id)
    }

    pub async fn get_post_page(&self, req: PageRequest) -> Result<PageResult<PostSummary>> {
        let total_row_count = self.repo.select_total_count().await?;
        let window = resolve_page(req.page, PAGE_SIZE, total_row_count)?;

        let items = self
            .repo
            .select_post_summary_list(window.limit, window.offset, req.sort)
            .await?;

        Ok(PageResult {
            current_page: req.page,
            total_row_count,
            total_pages: window.total_pages,
            items,
        })
    }

    /// Increments the view counter first; the affected-row count of that
    /// update is the existence check, so a post deleted concurrently can
    /// never be counted as viewed. The counter moves even if the caller
    /// never consumes the response: a view means "was requested".
    pub async fn get_post_details(&self, post_id: Uuid) -> Result<PostDetail> {
        if self.repo.update_views_and_get_affected_rows(post_id).await? == 0 {
            return Err(Error::NotFound);
        }

        self.repo
            .select_post_details(post_id)
            .await?
            .ok_or(Error::NotFound)
    }

    /// New images are stored before the row update so a failed attachment
    /// leaves the post untouched. Attachments only accumulate while a post
    /// lives, so `has_image` folds monotonically instead of trusting any
    /// caller-supplied flag.
    pub async fn edit_post(&self, input: EditPostInput, caller: Uuid) -> Result<()> {
        validate_post_fields(&input.title, &input.content)?;
        self.validate_post_exists(input.post_id, caller).await?;

        let attaching_images = !input.images.is_empty();
        if attaching_images {
            self.images.save_images(input.post_id, &input.images).await?;
        }

        self.repo
            .update_post(input.post_id, &input.title, &input.content, attaching_images)
            .await?;

        Ok(())
    }

    /// Stored image files and rows go first, then the post row together with
    /// any remaining link rows in one store transaction. No attachment row
    /// can survive the post.
    pub async fn remove_post(&self, post_id: Uuid, caller: Uuid) -> Result<()> {
        self.validate_post_exists(post_id, caller).await?;

        self.images.delete_images(post_id).await?;
        self.repo.delete_post_with_links(post_id).await?;

        Ok(())
    }

    /// Ownership guard shared by edit and remove. A post that exists but
    /// belongs to someone else reports `NotFound`, indistinguishable from a
    /// missing post.
    async fn validate_post_exists(&self, post_id: Uuid, caller: Uuid) -> Result<()> {
        if self.repo.select_count_post(post_id, caller).await? != 1 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

fn validate_post_fields(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("Title is required".to_string()));
    }
    if content.trim().is_empty() {
        return Err(Error::Validation("Content is required".to_string()));
    }

    Ok(())
}
