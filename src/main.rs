use casework_frontend::client::{CaseClient, HttpCaseClient};
use casework_frontend::config::{AppState, Settings};
use casework_frontend::routes::build_app;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    // Setup formatting and environment for trace
    let fmt_layer = fmt::layer().with_file(true).with_line_number(true).pretty();
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let settings = Settings::from_env()?;
    let client: Arc<dyn CaseClient> = Arc::new(HttpCaseClient::new(&settings.sirius_url)?);

    let ip = SocketAddr::new([0, 0, 0, 0].into(), settings.port);
    info!("forwarding to {} with prefix {:?}", settings.sirius_url, settings.prefix);

    let app = build_app(Arc::new(AppState::new(settings, client)));

    let listener = tokio::net::TcpListener::bind(ip).await?;
    info!("serving {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    info!("shutting down");
}
