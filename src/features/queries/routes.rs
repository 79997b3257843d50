use axum::{routing::post, Router};
use std::sync::Arc;

use crate::features::queries::handlers::run_query;
use crate::features::queries::services::QueryService;

pub fn routes(service: Arc<QueryService>) -> Router {
    Router::new()
        .route("/api/query", post(run_query))
        .with_state(service)
}
