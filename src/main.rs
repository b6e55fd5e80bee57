use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eagle_eye_console::{build_app, config::AppConfig, ui::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // -----------------------------
    // Config / shared state
    // -----------------------------
    let config = AppConfig::from_env()?;
    let addr = config.listen_addr;
    let state = AppState::new(config)?;

    info!(scan_url = %state.config.scan_url, "scan endpoint");
    if let Some(url) = state.config.all_devices_url.as_deref() {
        info!(all_devices_url = url, "all-devices endpoint");
    }
    if let Some(proxy) = state.config.proxy.as_ref() {
        info!(prefix = %proxy.prefix, target = %proxy.target, "dev proxy enabled");
    }

    let app = build_app(state);

    println!("🌐 Console at http://{addr}");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
