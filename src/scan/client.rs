use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::model::device::Device;

/// Why a scan produced no device list.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Connection refused, DNS failure, timeout, or the body could not be read.
    #[error("scan endpoint unreachable: {0}")]
    Network(#[from] reqwest::Error),
    #[error("scan endpoint answered {0}")]
    Status(StatusCode),
    /// Body is not a JSON array of `{user, os, id}` string records.
    #[error("scan response is not a device list: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ScanError {
    pub fn is_network(&self) -> bool {
        matches!(self, ScanError::Network(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, ScanError::Decode(_))
    }
}

/// Thin wrapper around one shared `reqwest::Client`.
#[derive(Clone)]
pub struct ScanClient {
    client: reqwest::Client,
}

impl ScanClient {
    pub fn new(timeout: Duration) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// GET `url` and decode the body as a device array, keeping response order.
    pub async fn fetch_devices(&self, url: &str) -> Result<Vec<Device>, ScanError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status(status));
        }

        let body = response.bytes().await?;
        let devices: Vec<Device> = serde_json::from_slice(&body)?;
        debug!(url, count = devices.len(), "decoded device list");
        Ok(devices)
    }
}
