use std::sync::Arc;

use lookia::backend::{AuthEvents, Backend};
use lookia::config::AppConfig;
use lookia::web::app_routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();
    let backend = Backend::from_config(config.backend.as_ref());
    let events = Arc::new(AuthEvents::new());

    eprintln!("👗 Lookia v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Backend: {}",
        if backend.is_configured() {
            "configured"
        } else {
            "NOT configured (set LOOKIA_BACKEND_URL / LOOKIA_BACKEND_KEY)"
        }
    );
    eprintln!("   Listening: http://0.0.0.0:{}\n", config.port);

    let app = app_routes(backend, events);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "server started");
    axum::serve(listener, app).await?;

    Ok(())
}
