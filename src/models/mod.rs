pub mod comments;
pub mod page;
pub mod posts;
pub mod response;
pub mod users;
