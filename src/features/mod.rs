pub mod auth;
pub mod files;
pub mod queries;
pub mod users;
