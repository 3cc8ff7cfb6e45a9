use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use tower_cookies::Cookie;
use tower_http::cors::{Any, CorsLayer};
use validator::Validate;

use crate::{
    models::users::{FilterUserDto, LoginUserDto, RegisterUserDto, UserLoginResponseDto},
    AppState, Result,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn configure_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(new_user): Json<RegisterUserDto>,
) -> Result<impl IntoResponse> {
    new_user.validate()?;

    let user = app_state
        .auth_service
        .register(&new_user.name, &new_user.email, &new_user.password)
        .await?;

    Ok((StatusCode::CREATED, Json(FilterUserDto::filter_user(&user))))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(user): Json<LoginUserDto>,
) -> Result<impl IntoResponse> {
    user.validate()?;

    let token = app_state
        .auth_service
        .login(&user.email, &user.password)
        .await?;

    let cookie_duration = time::Duration::minutes(app_state.config.jwt_maxage * 60);
    let cookie = Cookie::build(("token", &token))
        .path("/")
        .max_age(cookie_duration)
        .http_only(true)
        .build();

    let response = Json(UserLoginResponseDto {
        status: "success".to_string(),
        token: token.clone(),
    });

    let mut headers = HeaderMap::new();
    headers.append(header::SET_COOKIE, cookie.to_string().parse().unwrap());

    let mut response = response.into_response();
    response.headers_mut().extend(headers);

    Ok(response)
}
