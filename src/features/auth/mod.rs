//! Authentication backed by the hosted auth service.
//!
//! Access tokens are validated locally (HS256); sign-up, sign-in, refresh and
//! sign-out are forwarded to the auth REST API.

mod validator;

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use validator::JwtValidator;
