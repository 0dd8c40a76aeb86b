pub mod health;
pub mod products;

use crate::db::Database;
use crate::error::AppError;
use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::get,
};
use std::any::Any;
use std::time::SystemTime;

/// Shared router state: the pool plus the wall-clock instant the process came up
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub started_at: SystemTime,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState {
            db,
            started_at: SystemTime::now(),
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/products", get(products::list_products))
        .route("/api/products/search", get(products::search_products))
        .route("/api/products/{id}", get(products::get_product))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::RouteNotFound
}

/// Turns a handler panic into the generic 500 envelope
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::Internal(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}
