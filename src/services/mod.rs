pub mod auth;
pub mod comments;
pub mod images;
pub mod posts;
