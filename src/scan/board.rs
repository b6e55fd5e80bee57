use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::device::Device;
use crate::scan::client::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Online,
    All,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Online => "online",
            ListKind::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ListStatus {
    Idle,
    Loading,
    Loaded,
    Failed { error: String },
}

/// Issued when a scan starts. Only the newest ticket of a list may write to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTicket {
    pub kind: ListKind,
    pub generation: u64,
}

/// Displayed state of one device list.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceList {
    #[serde(skip)]
    generation: u64,
    #[serde(flatten)]
    status: ListStatus,
    devices: Vec<Device>,
    scanned_at: Option<DateTime<Utc>>,
}

impl Default for DeviceList {
    fn default() -> Self {
        Self {
            generation: 0,
            status: ListStatus::Idle,
            devices: Vec::new(),
            scanned_at: None,
        }
    }
}

impl DeviceList {
    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn scanned_at(&self) -> Option<DateTime<Utc>> {
        self.scanned_at
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, ListStatus::Loading)
    }

    /// Invalidates every ticket handed out before this one.
    /// Records already on display stay until the new result lands.
    pub fn begin(&mut self, kind: ListKind) -> ScanTicket {
        self.generation += 1;
        self.status = ListStatus::Loading;
        ScanTicket {
            kind,
            generation: self.generation,
        }
    }

    /// Applies a finished scan. Returns `false` and leaves the list untouched
    /// when `ticket` has been superseded.
    pub fn complete(&mut self, ticket: ScanTicket, result: Result<Vec<Device>, ScanError>) -> bool {
        if ticket.generation != self.generation {
            return false;
        }

        match result {
            Ok(devices) => {
                self.devices = devices;
                self.status = ListStatus::Loaded;
                self.scanned_at = Some(Utc::now());
            }
            Err(err) => {
                self.devices.clear();
                self.status = ListStatus::Failed {
                    error: err.to_string(),
                };
            }
        }
        true
    }
}

/// Both lists shown on the page. They never share records or tickets.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanBoard {
    pub online: DeviceList,
    pub all: DeviceList,
}

impl ScanBoard {
    pub fn list_mut(&mut self, kind: ListKind) -> &mut DeviceList {
        match kind {
            ListKind::Online => &mut self.online,
            ListKind::All => &mut self.all,
        }
    }

    pub fn begin(&mut self, kind: ListKind) -> ScanTicket {
        self.list_mut(kind).begin(kind)
    }

    pub fn complete(&mut self, ticket: ScanTicket, result: Result<Vec<Device>, ScanError>) -> bool {
        self.list_mut(ticket.kind).complete(ticket, result)
    }
}
