use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod model;
pub mod proxy;
pub mod scan;
pub mod ui;

#[cfg(test)]
mod test_support;

use ui::AppState;

/// Full HTTP surface: console page, scan triggers, state view and, when
/// configured, the dev forwarder.
pub fn build_app(state: AppState) -> Router {
    let mut app = Router::new().merge(ui::ui_router());
    if let Some(proxy) = state.proxy.as_ref() {
        app = app.merge(proxy::proxy_router(proxy));
    }

    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods(Any),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
