use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query},
    http::StatusCode,
    middleware::from_fn,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    middleware::{self, AuthenticatedUser},
    models::{
        page::PageRequest,
        posts::{CreatePostInput, EditPostInput, UploadedImage},
        response::Response,
    },
    AppState, Error, Result,
};

pub fn posts_handler() -> Router {
    let public = Router::new()
        .route("/page", get(get_post_page))
        .route("/{post_id}", get(get_post_details));

    let protected = Router::new()
        .route("/create-post", post(create_post))
        .route("/edit-post/{post_id}", put(edit_post))
        .route("/delete-post/{post_id}", delete(remove_post))
        .layer(from_fn(middleware::auth));

    public.merge(protected)
}

async fn get_post_page(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(page_request): Query<PageRequest>,
) -> Result<impl IntoResponse> {
    let page = app_state.post_service.get_post_page(page_request).await?;
    Ok((StatusCode::OK, Json(page)))
}

async fn get_post_details(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let detail = app_state.post_service.get_post_details(post_id).await?;
    Ok((StatusCode::OK, Json(detail)))
}

async fn create_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (title, content, images) = parse_post_form(multipart).await?;

    let post_id = app_state
        .post_service
        .create_post(
            CreatePostInput {
                title,
                content,
                images,
            },
            auth.user.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": post_id }))))
}

async fn edit_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(post_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (title, content, images) = parse_post_form(multipart).await?;

    app_state
        .post_service
        .edit_post(
            EditPostInput {
                post_id,
                title,
                content,
                images,
            },
            auth.user.id,
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(Response {
            status: "success",
            message: "Post updated".to_string(),
        }),
    ))
}

async fn remove_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    app_state
        .post_service
        .remove_post(post_id, auth.user.id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(Response {
            status: "success",
            message: "Post deleted".to_string(),
        }),
    ))
}

/// Pulls `title`, `content` and any number of `images` parts out of a
/// multipart form.
async fn parse_post_form(
    mut multipart: Multipart,
) -> Result<(String, String, Vec<UploadedImage>)> {
    let mut title = String::new();
    let mut content = String::new();
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| Error::Validation(err.to_string()))?
    {
        match field.name() {
            Some("title") => {
                title = field
                    .text()
                    .await
                    .map_err(|err| Error::Validation(err.to_string()))?;
            }
            Some("content") => {
                content = field
                    .text()
                    .await
                    .map_err(|err| Error::Validation(err.to_string()))?;
            }
            Some("images") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| Error::Validation(err.to_string()))?;

                // Browsers send an empty part for an empty file input.
                if !bytes.is_empty() {
                    images.push(UploadedImage {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok((title, content, images))
}
