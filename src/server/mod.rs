pub mod routes;
pub mod state;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::get_index))
        .route("/index.html", get(routes::get_index))
        .route("/api/presets", get(routes::get_presets))
        .route("/api/run/local", post(routes::run_local))
        .route("/api/check/embed", post(routes::check_embed))
        .fallback(routes::not_found)
        .with_state(state)
}

/// Bind and serve the web app. Blocks until the server stops.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, "healthy-feed web app listening");
    println!("Healthy Feed web app running at http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}
