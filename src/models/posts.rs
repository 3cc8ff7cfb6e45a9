use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Post {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub has_image: bool,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An uploaded file as received at the HTTP boundary. The lifecycle core
/// never inspects the bytes, it only hands them to the image service.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub images: Vec<UploadedImage>,
}

#[derive(Debug)]
pub struct EditPostInput {
    pub post_id: Uuid,
    pub title: String,
    pub content: String,
    pub images: Vec<UploadedImage>,
}

/// Listing view: no body, no image list, just a thumbnail indicator.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub author_name: String,
    pub has_image: bool,
    pub views: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct ImageMeta {
    pub id: Uuid,
    pub file_name: String,
    pub thumbnail_name: String,
    pub original_name: String,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub id: Uuid,
    #[serde(rename = "ownerId")]
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "authorName")]
    pub author_name: String,
    #[serde(rename = "hasImage")]
    pub has_image: bool,
    pub views: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub images: Vec<ImageMeta>,
}
