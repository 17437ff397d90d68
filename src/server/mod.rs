pub mod app;
pub mod handlers;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::backend::HttpBackendClient;
use crate::config::Config;

pub async fn start_server(config: Config) -> Result<()> {
    let port = config.server.port;
    let backend = HttpBackendClient::new(&config.backend)?;
    let app = app::create_app(Arc::new(config), Arc::new(backend))?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                     - Health check");
    info!("  /api/v1/pages               - Page registry");
    info!("  /api/v1/pages/:slug         - Render a page (GET defaults, POST parameters)");
    info!("  /api/v1/pages/:slug/roi     - Preview an ROI upload (POST)");
}
