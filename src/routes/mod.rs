use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;
use crate::middleware::log_errors;

pub mod admin;
pub mod analysis;
pub mod health;
pub mod stress_test;
pub mod transcript;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/ping", get(health::ping))
        // 免费额度网关
        .route("/stress-test", post(stress_test::run_stress_test))
        .route("/usage/remaining", post(stress_test::remaining_requests))
        // 调用方自带密钥
        .route("/analysis/direct", post(analysis::run_direct_analysis))
        .route("/analysis/personas", get(analysis::list_personas))
        .route("/admin/usage/reset", post(admin::reset_usage))
        .route("/transcripts/export", post(transcript::export_transcript))
        .route("/transcripts/import", post(transcript::import_transcript));

    let router = Router::new()
        .nest(&state.config.api_base_uri, api_routes)
        .layer(axum::middleware::from_fn(log_errors));

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
