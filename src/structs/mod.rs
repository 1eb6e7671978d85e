pub mod actor;
pub mod comment;
pub mod follow;
pub mod permission;
pub mod post;
pub mod register_user;
pub mod role;
pub mod user;
