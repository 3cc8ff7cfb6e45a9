use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Post or comment absent, or the caller does not own it. The two cases
    /// are deliberately indistinguishable so a non-owner cannot probe for
    /// existence.
    NotFound,
    Unauthenticated,
    Validation(String),
    AttachmentFailure,
    DatabaseError(sqlx::Error),
    InvalidHashFormat(argon2::password_hash::Error),
    InternalServerError,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::Validation(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            Self::AttachmentFailure => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Image attachment failed")
            }
            Self::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            Self::InvalidHashFormat(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Invalid hash format")
            }
            Self::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        error!("Database error: {:?}", err);
        Self::DatabaseError(err)
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        error!("Invalid hash format");
        Self::InvalidHashFormat(err)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}
