//! Natural-language questions about an uploaded file, answered by the text model.
//!
//! `POST /api/query` keeps a bare `{answer}` / `{error}` body rather than the
//! usual response envelope.

pub mod dtos;
mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{PgQueryLogRepository, QueryLogRepository};
pub use routes::routes;
pub use services::QueryService;
