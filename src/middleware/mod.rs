use std::sync::Arc;

use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};
use axum_extra::extract::CookieJar;

use crate::{models::users::User, AppState, Error, Result};

/// Identity resolved once per request at the boundary. Handlers thread
/// `user.id` explicitly into every service call; nothing downstream reads
/// session state.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

pub async fn auth(mut req: Request, next: Next) -> Result<impl IntoResponse> {
    let app_state = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or(Error::InternalServerError)?;

    let cookies = CookieJar::from_headers(req.headers());

    let token = cookies
        .get("token")
        .map(|c| c.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| {
                    auth_value
                        .strip_prefix("Bearer ")
                        .map(|stripped| stripped.to_string())
                })
        })
        .ok_or(Error::Unauthenticated)?;

    let user_id = app_state.auth_service.decode_token(token)?;
    let user = app_state.auth_service.resolve_user(user_id).await?;

    req.extensions_mut().insert(AuthenticatedUser { user });

    Ok(next.run(req).await)
}
