use anyhow::Result;
use eagle_eye_console::{config::AppConfig, scan::ScanClient};
use std::env;

/// One-shot scan: prints every device as a `User/Os/Id` block.
/// Usage: `scan_cli [url]` (defaults to `SCAN_URL`).
#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    let url = env::args().nth(1).unwrap_or_else(|| config.scan_url.clone());

    let client = ScanClient::new(config.scan_timeout)?;
    let devices = client.fetch_devices(&url).await?;

    if devices.is_empty() {
        eprintln!("no devices online");
        return Ok(());
    }

    let blocks = devices
        .iter()
        .map(|d| d.to_text_block())
        .collect::<Vec<_>>()
        .join("\n\n");
    println!("{blocks}");
    Ok(())
}
