use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
    routing::{get, post},
    Json, Router,
};
use tracing::error;

use crate::config::AppConfig;
use crate::proxy::DevProxy;
use crate::scan::{run_scan, ListKind, ScanBoard, ScanClient, SharedBoard};
use crate::ui::render::render_page;

// ------------------------------------------------------------
// TYPES
// ------------------------------------------------------------
#[derive(Clone)]
pub struct AppState {
    pub board: SharedBoard,
    pub client: ScanClient,
    pub config: Arc<AppConfig>,
    pub proxy: Option<DevProxy>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = ScanClient::new(config.scan_timeout)?;
        let proxy = config.proxy.as_ref().map(DevProxy::new).transpose()?;
        Ok(Self {
            board: SharedBoard::default(),
            client,
            config: Arc::new(config),
            proxy,
        })
    }
}

// ------------------------------------------------------------
// ROUTER
// ------------------------------------------------------------
pub fn ui_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/scan", post(scan_online))
        .route("/scan-all", post(scan_all))
        .route("/state", get(board_state))
}

// ------------------------------------------------------------
// HANDLERS
// ------------------------------------------------------------
async fn index(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    let board = state.board.read().await;
    let html = render_page(&board, state.config.all_devices_url.is_some()).map_err(|err| {
        error!(error = %err, "page rendering failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "template_error".to_string())
    })?;
    Ok(Html(html))
}

/// The button's form target. Failures land on the board, so this always
/// sends the browser back to the page.
async fn scan_online(State(state): State<AppState>) -> Redirect {
    run_scan(&state.board, &state.client, ListKind::Online, &state.config.scan_url).await;
    Redirect::to("/")
}

async fn scan_all(State(state): State<AppState>) -> Result<Redirect, (StatusCode, String)> {
    let url = state.config.all_devices_url.as_deref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "all_devices_not_configured".to_string(),
    ))?;

    run_scan(&state.board, &state.client, ListKind::All, url).await;
    Ok(Redirect::to("/"))
}

async fn board_state(State(state): State<AppState>) -> Json<ScanBoard> {
    Json(state.board.read().await.clone())
}
