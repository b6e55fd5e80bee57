use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use reqwest::Url;
use tracing::{debug, warn};

use crate::config::ProxyConfig;
use crate::ui::AppState;

const MAX_FORWARD_BODY: usize = 8 * 1024 * 1024;

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Development forwarder: `{prefix}/*` on this server goes to the same path on
/// `target`, with `Host` and `Origin` pointing at the target.
#[derive(Clone)]
pub struct DevProxy {
    prefix: String,
    target: Url,
    client: reqwest::Client,
}

impl DevProxy {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let target = Url::parse(&config.target)
            .with_context(|| format!("invalid PROXY_TARGET `{}`", config.target))?;
        if target.host_str().is_none() {
            anyhow::bail!("PROXY_TARGET `{}` has no host", config.target);
        }
        // the console page owns `/`
        if config.prefix == "/" {
            anyhow::bail!("PROXY_PREFIX must not be `/`");
        }

        // redirects are the browser's business, pass them through untouched
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            prefix: config.prefix.clone(),
            target,
            client,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn authority(&self) -> String {
        let host = self.target.host_str().unwrap_or_default();
        match self.target.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    // target path (if any) is a base that the incoming path is appended to
    fn upstream_url(&self, path_and_query: &str) -> String {
        let origin = self.target.origin().ascii_serialization();
        let base = self.target.path().trim_end_matches('/');
        format!("{origin}{base}{path_and_query}")
    }

    fn upstream_headers(&self, incoming: &HeaderMap) -> HeaderMap {
        let mut headers = strip_hop_by_hop(incoming);
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);

        if let Ok(host) = HeaderValue::from_str(&self.authority()) {
            headers.insert(header::HOST, host);
        }
        if headers.contains_key(header::ORIGIN) {
            if let Ok(origin) = HeaderValue::from_str(&self.target.origin().ascii_serialization()) {
                headers.insert(header::ORIGIN, origin);
            }
        }
        headers
    }

    async fn forward(&self, req: Request) -> Result<Response, (StatusCode, String)> {
        let (parts, body) = req.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = self.upstream_url(path_and_query);

        let body = to_bytes(body, MAX_FORWARD_BODY)
            .await
            .map_err(|_| (StatusCode::PAYLOAD_TOO_LARGE, "body_too_large".to_string()))?;

        debug!(method = %parts.method, %url, "forwarding request");
        let upstream = self
            .client
            .request(parts.method, &url)
            .headers(self.upstream_headers(&parts.headers))
            .body(body)
            .send()
            .await
            .map_err(|err| {
                warn!(%url, error = %err, "upstream unreachable");
                (StatusCode::BAD_GATEWAY, "upstream_unreachable".to_string())
            })?;

        let status = upstream.status();
        let headers = strip_hop_by_hop(upstream.headers());
        let bytes = upstream.bytes().await.map_err(|err| {
            warn!(%url, error = %err, "upstream body read failed");
            (StatusCode::BAD_GATEWAY, "upstream_body_error".to_string())
        })?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Drops the fixed hop-by-hop set plus any header the `Connection` value names.
fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut out = headers.clone();
    for name in HOP_BY_HOP {
        out.remove(*name);
    }
    for name in &listed {
        out.remove(name.as_str());
    }
    out
}

pub fn proxy_router(proxy: &DevProxy) -> Router<AppState> {
    let prefix = proxy.prefix();
    Router::new()
        .route(prefix, any(forward))
        .route(&format!("{prefix}/{{*path}}"), any(forward))
}

async fn forward(State(state): State<AppState>, req: Request) -> Response {
    let Some(proxy) = state.proxy.as_ref() else {
        return (StatusCode::NOT_FOUND, "proxy_disabled").into_response();
    };
    match proxy.forward(req).await {
        Ok(response) => response,
        Err(rejection) => rejection.into_response(),
    }
}
