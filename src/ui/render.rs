use minijinja::Environment;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::model::device::Device;
use crate::scan::{DeviceList, ListKind, ListStatus, ScanBoard};

const PAGE_TEMPLATE_NAME: &str = "index.html";

macro_rules! template_file {
    ($name:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/", $name))
    };
}

// `.html` name turns on HTML auto-escaping for every record field.
static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template(PAGE_TEMPLATE_NAME, template_file!("index.html"))
        .expect("invalid page template");
    env
});

#[derive(Serialize)]
struct PageContext<'a> {
    online: ListView<'a>,
    all: ListView<'a>,
}

#[derive(Serialize)]
struct ListView<'a> {
    name: &'static str,
    configured: bool,
    status: &'static str,
    error: Option<&'a str>,
    scanned_at: Option<String>,
    devices: &'a [Device],
}

impl<'a> ListView<'a> {
    fn new(kind: ListKind, list: &'a DeviceList, configured: bool) -> Self {
        // an unconfigured source has nothing to show, whatever the board holds
        let devices: &[Device] = if configured { list.devices() } else { &[] };
        let (status, error) = match list.status() {
            ListStatus::Idle => ("idle", None),
            ListStatus::Loading => ("loading", None),
            ListStatus::Loaded => ("loaded", None),
            ListStatus::Failed { error } => ("failed", Some(error.as_str())),
        };

        Self {
            name: kind.as_str(),
            configured,
            status,
            error,
            scanned_at: list
                .scanned_at()
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            devices,
        }
    }
}

/// Renders the console page for the current board.
///
/// `all_configured` is false when no all-devices endpoint exists; the
/// "All Device List" section then renders as a bare heading.
pub fn render_page(board: &ScanBoard, all_configured: bool) -> Result<String, minijinja::Error> {
    let ctx = PageContext {
        online: ListView::new(ListKind::Online, &board.online, true),
        all: ListView::new(ListKind::All, &board.all, all_configured),
    };
    TEMPLATES.get_template(PAGE_TEMPLATE_NAME)?.render(&ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::ScanError;

    fn loaded(devices: Vec<Device>) -> ScanBoard {
        let mut board = ScanBoard::default();
        let ticket = board.begin(ListKind::Online);
        board.complete(ticket, Ok(devices));
        board
    }

    fn all_section(html: &str) -> &str {
        let start = html.find("<h2>All Device List</h2>").unwrap();
        &html[start..]
    }

    #[test]
    fn renders_one_block_per_device_verbatim() {
        let html = render_page(&loaded(vec![Device::new("alice", "linux", "d1")]), false).unwrap();

        assert_eq!(html.matches(r#"class="device""#).count(), 1);
        assert!(html.contains("<p>User: alice</p>"));
        assert!(html.contains("<p>Os: linux</p>"));
        assert!(html.contains("<p>Id: d1</p>"));
    }

    #[test]
    fn keeps_response_order() {
        let html = render_page(
            &loaded(vec![
                Device::new("zed", "linux", "3"),
                Device::new("amy", "mac", "1"),
                Device::new("kim", "windows", "2"),
            ]),
            false,
        )
        .unwrap();

        let zed = html.find("User: zed").unwrap();
        let amy = html.find("User: amy").unwrap();
        let kim = html.find("User: kim").unwrap();
        assert!(zed < amy && amy < kim);
        assert_eq!(html.matches(r#"class="device""#).count(), 3);
    }

    #[test]
    fn empty_scan_renders_no_blocks_and_no_error() {
        let html = render_page(&loaded(Vec::new()), false).unwrap();
        assert_eq!(html.matches(r#"class="device""#).count(), 0);
        assert!(!html.contains("Scan failed"));
        assert!(html.contains("<h2>Online Device List</h2>"));
    }

    #[test]
    fn all_section_stays_empty_without_source() {
        let html = render_page(&loaded(vec![Device::new("alice", "linux", "d1")]), false).unwrap();
        let all = all_section(&html);
        assert!(!all.contains(r#"class="device""#));
        assert!(!all.contains("User:"));
    }

    #[test]
    fn all_section_ignores_board_records_without_source() {
        let mut board = ScanBoard::default();
        let ticket = board.begin(ListKind::All);
        board.complete(ticket, Ok(vec![Device::new("ghost", "linux", "9")]));

        let html = render_page(&board, false).unwrap();
        assert!(!html.contains("ghost"));
    }

    #[test]
    fn all_section_renders_its_own_records_when_configured() {
        let mut board = loaded(vec![Device::new("alice", "linux", "d1")]);
        let ticket = board.begin(ListKind::All);
        board.complete(ticket, Ok(vec![Device::new("carol", "bsd", "7")]));

        let html = render_page(&board, true).unwrap();
        let all = all_section(&html);
        assert!(all.contains("User: carol"));
        assert!(!all.contains("User: alice"));
    }

    #[test]
    fn failure_is_shown() {
        let mut board = ScanBoard::default();
        let ticket = board.begin(ListKind::Online);
        let err = ScanError::Decode(serde_json::from_str::<Vec<Device>>("{}").unwrap_err());
        board.complete(ticket, Err(err));

        let html = render_page(&board, false).unwrap();
        assert!(html.contains("Scan failed: scan response is not a device list"));
        assert!(html.contains(r#"data-status="failed""#));
    }

    #[test]
    fn loading_is_shown() {
        let mut board = ScanBoard::default();
        board.begin(ListKind::Online);
        let html = render_page(&board, false).unwrap();
        assert!(html.contains("Scanning…"));
    }

    #[test]
    fn escapes_record_fields() {
        let html = render_page(&loaded(vec![Device::new("<script>", "linux", "1")]), false).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
