mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::{build_resolver, AppState};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/signups",
            get(handlers::list_signups).post(handlers::create_signup),
        )
        .route("/api/geocode-text", get(handlers::geocode_text))
        .route("/api/geocode", get(handlers::geocode_place))
        .route("/api/places", get(handlers::places))
        .route("/api/map", get(handlers::map_points))
        .route(
            "/api/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(listen_addr: &str, state: AppState) -> anyhow::Result<()> {
    let app = build_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .map_err(|e| anyhow::anyhow!("cannot bind to {}: {}", listen_addr, e))?;

    tracing::info!("gathermap listening on http://{}", listen_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
