use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, Result};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8081";
const DEFAULT_SCAN_URL: &str = "http://127.0.0.1:8081/api/scan-devices";
const DEFAULT_PROXY_PREFIX: &str = "/api";
const DEFAULT_PROXY_TARGET: &str = "http://0.0.0.0:8080";
const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 3;

/// Runtime settings, read from `.env` and the process environment.
///
/// Variables:
/// - `LISTEN_ADDR`: where the console page is served.
/// - `SCAN_URL`: GET endpoint returning the online device array.
/// - `ALL_DEVICES_URL`: optional endpoint for the "All Device List" section.
/// - `PROXY_PREFIX` / `PROXY_TARGET`: dev forwarding of `{prefix}/*` to another
///   local server. An empty `PROXY_TARGET` turns forwarding off.
/// - `SCAN_TIMEOUT_SECS`: per-request timeout of the scan client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub scan_url: String,
    pub all_devices_url: Option<String>,
    pub proxy: Option<ProxyConfig>,
    pub scan_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub prefix: String,
    pub target: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_raw = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_raw
            .trim()
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid LISTEN_ADDR `{listen_raw}`"))?;

        let scan_url = non_empty(lookup("SCAN_URL")).unwrap_or_else(|| DEFAULT_SCAN_URL.to_string());
        let all_devices_url = non_empty(lookup("ALL_DEVICES_URL"));

        let prefix = normalize_prefix(
            &non_empty(lookup("PROXY_PREFIX")).unwrap_or_else(|| DEFAULT_PROXY_PREFIX.to_string()),
        );
        let proxy = match lookup("PROXY_TARGET") {
            Some(target) if target.trim().is_empty() => None,
            Some(target) => Some(target.trim().trim_end_matches('/').to_string()),
            None => Some(DEFAULT_PROXY_TARGET.to_string()),
        }
        .map(|target| ProxyConfig { prefix, target });

        let scan_timeout = match non_empty(lookup("SCAN_TIMEOUT_SECS")) {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .with_context(|| format!("invalid SCAN_TIMEOUT_SECS `{raw}`"))?,
            ),
            None => Duration::from_secs(DEFAULT_SCAN_TIMEOUT_SECS),
        };

        Ok(Self {
            listen_addr,
            scan_url,
            all_devices_url,
            proxy,
            scan_timeout,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// "/api/" and "api" both become "/api"
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    format!("/{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_local_dev_setup() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:8081".parse().unwrap());
        assert_eq!(cfg.scan_url, DEFAULT_SCAN_URL);
        assert!(cfg.all_devices_url.is_none());
        assert_eq!(
            cfg.proxy,
            Some(ProxyConfig {
                prefix: "/api".into(),
                target: "http://0.0.0.0:8080".into(),
            })
        );
        assert_eq!(cfg.scan_timeout, Duration::from_secs(3));
    }

    #[test]
    fn empty_proxy_target_disables_forwarding() {
        let cfg = config_from(&[("PROXY_TARGET", "  ")]).unwrap();
        assert!(cfg.proxy.is_none());
    }

    #[test]
    fn normalizes_prefix_and_target() {
        let cfg = config_from(&[
            ("PROXY_PREFIX", "backend/"),
            ("PROXY_TARGET", "http://10.0.0.5:9000/"),
        ])
        .unwrap();
        let proxy = cfg.proxy.unwrap();
        assert_eq!(proxy.prefix, "/backend");
        assert_eq!(proxy.target, "http://10.0.0.5:9000");
    }

    #[test]
    fn rejects_bad_timeout() {
        let err = config_from(&[("SCAN_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("SCAN_TIMEOUT_SECS"));
    }

    #[test]
    fn rejects_bad_listen_addr() {
        assert!(config_from(&[("LISTEN_ADDR", "localhost")]).is_err());
    }
}
