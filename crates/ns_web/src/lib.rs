use axum::{
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

pub mod docs;
pub mod error;
pub mod handlers;
pub mod state;

pub use docs::ApiDoc;
pub use error::{ApiError, ErrorBody};
pub use state::AppState;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .merge(Redoc::with_url("/docs", ApiDoc::openapi()))
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/summarize", post(handlers::summarize))
        .route("/openapi.json", get(openapi))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Serves the API on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("👋 Shutting down");
        })
        .await
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use ns_core::{Error, Result};
}
