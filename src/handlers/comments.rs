use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware::from_fn,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    middleware::{self, AuthenticatedUser},
    models::{
        comments::{CreateCommentDto, EditCommentDto},
        response::Response,
    },
    AppState, Result,
};

pub fn comments_handler() -> Router {
    let public = Router::new().route("/post/{post_id}", get(list_comments));

    let protected = Router::new()
        .route("/create/{post_id}", post(create_comment))
        .route("/edit/{comment_id}", put(edit_comment))
        .route("/delete/{comment_id}", delete(remove_comment))
        .layer(from_fn(middleware::auth));

    public.merge(protected)
}

async fn list_comments(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let comments = app_state.comment_service.list_comments(post_id).await?;
    Ok((StatusCode::OK, Json(comments)))
}

async fn create_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(post_id): Path<Uuid>,
    Json(body): Json<CreateCommentDto>,
) -> Result<impl IntoResponse> {
    body.validate()?;

    let comment_id = app_state
        .comment_service
        .create_comment(post_id, &body.content, auth.user.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": comment_id })),
    ))
}

async fn edit_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(comment_id): Path<Uuid>,
    Json(body): Json<EditCommentDto>,
) -> Result<impl IntoResponse> {
    body.validate()?;

    app_state
        .comment_service
        .edit_comment(comment_id, &body.content, auth.user.id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(Response {
            status: "success",
            message: "Comment updated".to_string(),
        }),
    ))
}

async fn remove_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(comment_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    app_state
        .comment_service
        .remove_comment(comment_id, auth.user.id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(Response {
            status: "success",
            message: "Comment deleted".to_string(),
        }),
    ))
}
