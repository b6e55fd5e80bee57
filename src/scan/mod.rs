pub mod board;
pub mod client;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

pub use board::{DeviceList, ListKind, ListStatus, ScanBoard, ScanTicket};
pub use client::{ScanClient, ScanError};

pub type SharedBoard = Arc<RwLock<ScanBoard>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Applied,
    /// A newer scan of the same list started while this one was in flight.
    Superseded,
}

/// One scan of `kind` against `url`.
///
/// The board lock is only held to take the ticket and to apply the result,
/// never across the network call, so overlapping scans are allowed and the
/// last one triggered is the one that sticks.
pub async fn run_scan(board: &SharedBoard, client: &ScanClient, kind: ListKind, url: &str) -> ScanOutcome {
    let request_id = Uuid::new_v4().to_string();
    let ticket = board.write().await.begin(kind);
    info!(%request_id, list = kind.as_str(), generation = ticket.generation, url, "scan started");

    let result = client.fetch_devices(url).await;
    match &result {
        Ok(devices) => info!(%request_id, count = devices.len(), "scan finished"),
        Err(err) => warn!(%request_id, error = %err, "scan failed"),
    }

    if board.write().await.complete(ticket, result) {
        ScanOutcome::Applied
    } else {
        info!(%request_id, generation = ticket.generation, "scan superseded, result dropped");
        ScanOutcome::Superseded
    }
}
