use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::rest::handlers;
use crate::core::Core;

pub struct Rest;

impl Rest {
    pub fn routes(router: Router, core: Arc<Core>) -> Router {
        router
            .route("/", get(handlers::health))
            .route("/search", get(handlers::search))
            .route("/api/search", get(handlers::search))
            .route("/api/products", get(handlers::products))
            .route("/api/products/:id", get(handlers::product))
            .route("/api/product/:id", get(handlers::product))
            .route("/api/products/:id/skus", get(handlers::skus))
            .route("/api/detail", get(handlers::detail))
            .route("/api/categories", get(handlers::categories))
            .route("/api/recommend", get(handlers::recommend))
            .route("/api/img", get(handlers::image))
            .layer(Extension(core))
    }
}

/// The full application: routes plus CORS and request tracing.
pub fn app(core: Arc<Core>) -> Router {
    Rest::routes(Router::new(), core)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
