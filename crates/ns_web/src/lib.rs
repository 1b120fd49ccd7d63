use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/companies", get(handlers::list_companies))
        .route("/api/sentiment/:company", get(handlers::get_sentiment))
        .route("/api/audio/:company", get(handlers::get_audio))
        .route("/api/analyze/:company", post(handlers::analyze_company))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use super::{create_app, AppState};
    pub use ns_core::{CompanyAnalysis, Result};
}
