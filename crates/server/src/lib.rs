//! HTTP front end for MedQuery.
//!
//! Exposes a health probe on `GET /` and the question endpoint on
//! `POST /query`.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use medquery_core::{AppConfig, AppError, AppResult};
use medquery_llm::LlmClient;
use medquery_retrieval::QueryPipeline;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the router.
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/", get(routes::health))
        .route("/query", post(routes::query))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Serve until the process is stopped.
pub async fn serve(config: &AppConfig, llm: Arc<dyn LlmClient>) -> AppResult<()> {
    let pipeline = QueryPipeline::from_config(config, llm)?;
    let state = AppState::new(pipeline, &config.server);
    let router = create_router(state, config.server.enable_cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MedQuery listening on http://{}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| AppError::Other(format!("Server error: {}", e)))?;

    Ok(())
}
