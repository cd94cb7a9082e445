//! Configuration loading and parsing.
//!
//! The TOML file is optional; command-line flags override whatever it sets.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use url::Url;

use crate::assets::AssetResolver;
use crate::transport::ReconnectPolicy;

const SOCKET_PATH: &str = "/socket.io/";
const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 150;

/// Top-level client configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct KioskConfig {
    /// Backend base URL, e.g. `http://volumio.local:3000`.
    pub backend_url: Option<String>,
    /// Host for relative asset URLs (defaults to the backend origin).
    pub asset_host: Option<String>,
    /// Reconnect backoff settings.
    pub reconnect: Option<ReconnectConfig>,
    /// Quiet period before a viewport resize is applied.
    pub resize_debounce_ms: Option<u64>,
}

/// Reconnect settings from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct ReconnectConfig {
    pub initial_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    /// Omit to retry forever.
    pub max_retries: Option<u32>,
    pub handshake_timeout_ms: Option<u64>,
}

impl KioskConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = toml::from_str::<KioskConfig>(&raw)
            .with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }
}

/// The configured backend URL, validated.
pub fn backend_url_from_config(cfg: &KioskConfig) -> Result<Url> {
    let raw = cfg
        .backend_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("backend_url is required (config file or --backend)"))?;
    let url = Url::parse(raw).with_context(|| format!("parse backend_url {raw}"))?;
    match url.scheme() {
        "http" | "https" | "ws" | "wss" => Ok(url),
        other => Err(anyhow!("unsupported backend_url scheme {other}")),
    }
}

/// Websocket endpoint for the Engine.IO v4 transport.
pub fn socket_url_from_config(cfg: &KioskConfig) -> Result<String> {
    let mut url = backend_url_from_config(cfg)?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        _ => "wss",
    };
    url.set_scheme(scheme)
        .map_err(|_| anyhow!("cannot switch backend_url to {scheme}"))?;
    if !url.path().ends_with(SOCKET_PATH) {
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base}{SOCKET_PATH}"));
    }
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url.to_string())
}

/// Asset host: explicit setting, else the backend origin.
pub fn asset_host_from_config(cfg: &KioskConfig) -> Result<String> {
    if let Some(host) = cfg
        .asset_host
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return Ok(host.trim_end_matches('/').to_string());
    }
    let backend = backend_url_from_config(cfg)?;
    Ok(AssetResolver::from_backend_url(backend.as_str())?
        .host()
        .to_string())
}

pub fn asset_resolver_from_config(cfg: &KioskConfig) -> Result<AssetResolver> {
    Ok(AssetResolver::new(asset_host_from_config(cfg)?))
}

/// Merge reconnect settings over the defaults.
pub fn reconnect_policy_from_config(cfg: &KioskConfig) -> Result<ReconnectPolicy> {
    let mut policy = ReconnectPolicy::default();
    let Some(reconnect) = cfg.reconnect.as_ref() else {
        return Ok(policy);
    };
    if let Some(ms) = reconnect.initial_delay_ms {
        policy.initial_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = reconnect.max_delay_ms {
        policy.max_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = reconnect.handshake_timeout_ms {
        policy.handshake_timeout = Duration::from_millis(ms);
    }
    policy.max_retries = reconnect.max_retries;
    if policy.initial_delay.is_zero() {
        return Err(anyhow!("reconnect.initial_delay_ms must be greater than zero"));
    }
    if policy.max_delay < policy.initial_delay {
        return Err(anyhow!(
            "reconnect.max_delay_ms ({}) is below initial_delay_ms ({})",
            policy.max_delay.as_millis(),
            policy.initial_delay.as_millis()
        ));
    }
    Ok(policy)
}

pub fn resize_debounce_from_config(cfg: &KioskConfig) -> Duration {
    Duration::from_millis(cfg.resize_debounce_ms.unwrap_or(DEFAULT_RESIZE_DEBOUNCE_MS))
}
