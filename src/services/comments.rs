use std::sync::Arc;

use uuid::Uuid;

use crate::{
    models::comments::CommentWithAuthor, repositories::comments_repo::CommentRepository, Error,
    Result,
};

#[derive(Clone)]
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_comment(
        &self,
        post_id: Uuid,
        content: &str,
        caller: Uuid,
    ) -> Result<Uuid> {
        if content.trim().is_empty() {
            return Err(Error::Validation("Content is required".to_string()));
        }

        if !self.repo.post_exists(post_id).await? {
            return Err(Error::NotFound);
        }

        self.repo.insert_comment(post_id, caller, content).await
    }

    pub async fn edit_comment(&self, comment_id: Uuid, content: &str, caller: Uuid) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::Validation("Content is required".to_string()));
        }

        self.validate_comment_exists(comment_id, caller).await?;
        self.repo.update_comment(comment_id, content).await?;

        Ok(())
    }

    pub async fn remove_comment(&self, comment_id: Uuid, caller: Uuid) -> Result<()> {
        self.validate_comment_exists(comment_id, caller).await?;
        self.repo.delete_comment(comment_id).await?;

        Ok(())
    }

    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        if !self.repo.post_exists(post_id).await? {
            return Err(Error::NotFound);
        }

        self.repo.select_comments(post_id).await
    }

    /// Author-or-nothing guard, same conflation rule as posts.
    async fn validate_comment_exists(&self, comment_id: Uuid, caller: Uuid) -> Result<()> {
        if self.repo.select_count_comment(comment_id, caller).await? != 1 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;

    #[derive(Debug, Clone)]
    struct StoredComment {
        id: Uuid,
        post_id: Uuid,
        author_id: Uuid,
        content: String,
    }

    #[derive(Default)]
    struct MemoryComments {
        known_posts: Mutex<HashSet<Uuid>>,
        comments: Mutex<Vec<StoredComment>>,
    }

    impl MemoryComments {
        fn with_post(post_id: Uuid) -> Self {
            let repo = Self::default();
            repo.known_posts.lock().unwrap().insert(post_id);
            repo
        }
    }

    #[async_trait]
    impl CommentRepository for MemoryComments {
        async fn post_exists(&self, post_id: Uuid) -> Result<bool> {
            Ok(self.known_posts.lock().unwrap().contains(&post_id))
        }

        async fn insert_comment(
            &self,
            post_id: Uuid,
            author_id: Uuid,
            content: &str,
        ) -> Result<Uuid> {
            let id = Uuid::now_v7();
            self.comments.lock().unwrap().push(StoredComment {
                id,
                post_id,
                author_id,
                content: content.to_string(),
            });
            Ok(id)
        }

        async fn update_comment(&self, comment_id: Uuid, content: &str) -> Result<u64> {
            let mut comments = self.comments.lock().unwrap();
            match comments.iter_mut().find(|c| c.id == comment_id) {
                Some(comment) => {
                    comment.content = content.to_string();
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn delete_comment(&self, comment_id: Uuid) -> Result<u64> {
            let mut comments = self.comments.lock().unwrap();
            let before = comments.len();
            comments.retain(|c| c.id != comment_id);
            Ok((before - comments.len()) as u64)
        }

        async fn select_count_comment(&self, comment_id: Uuid, author_id: Uuid) -> Result<i64> {
            let count = self
                .comments
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.id == comment_id && c.author_id == author_id)
                .count();
            Ok(count as i64)
        }

        async fn select_comments(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
            Ok(self
                .comments
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.post_id == post_id)
                .map(|c| CommentWithAuthor {
                    id: c.id,
                    post_id: c.post_id,
                    author_id: c.author_id,
                    author_name: "tester".to_string(),
                    content: c.content.clone(),
                    created_at: Utc::now(),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn comment_on_missing_post_is_not_found() {
        let svc = CommentService::new(Arc::new(MemoryComments::default()));

        let err = svc
            .create_comment(Uuid::now_v7(), "hi", Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let post_id = Uuid::now_v7();
        let svc = CommentService::new(Arc::new(MemoryComments::with_post(post_id)));

        let err = svc
            .create_comment(post_id, "   ", Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn comments_list_in_insertion_order() {
        let post_id = Uuid::now_v7();
        let svc = CommentService::new(Arc::new(MemoryComments::with_post(post_id)));
        let author = Uuid::now_v7();

        svc.create_comment(post_id, "first", author).await.unwrap();
        svc.create_comment(post_id, "second", author).await.unwrap();

        let comments = svc.list_comments(post_id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "first");
        assert_eq!(comments[1].content, "second");
    }

    #[tokio::test]
    async fn edit_by_non_author_is_not_found() {
        let post_id = Uuid::now_v7();
        let svc = CommentService::new(Arc::new(MemoryComments::with_post(post_id)));

        let author = Uuid::now_v7();
        let comment_id = svc.create_comment(post_id, "mine", author).await.unwrap();

        let err = svc
            .edit_comment(comment_id, "rewritten", Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
        assert_eq!(svc.list_comments(post_id).await.unwrap()[0].content, "mine");
    }

    #[tokio::test]
    async fn author_can_edit_and_remove() {
        let post_id = Uuid::now_v7();
        let svc = CommentService::new(Arc::new(MemoryComments::with_post(post_id)));

        let author = Uuid::now_v7();
        let comment_id = svc.create_comment(post_id, "draft", author).await.unwrap();

        svc.edit_comment(comment_id, "final", author).await.unwrap();
        assert_eq!(svc.list_comments(post_id).await.unwrap()[0].content, "final");

        svc.remove_comment(comment_id, author).await.unwrap();
        assert!(svc.list_comments(post_id).await.unwrap().is_empty());
    }
}
