pub mod app_error;
pub mod authentification;
pub mod comment;
pub mod logger;
pub mod pagination;
pub mod post;
pub mod register;
pub mod roles;
pub mod social;
pub mod token;
pub mod users;
