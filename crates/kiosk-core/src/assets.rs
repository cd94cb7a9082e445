//! Rewrites backend-relative asset URLs to absolute ones.

use anyhow::{Context, Result, anyhow};
use url::Url;

/// Resolves relative cover-art paths against the backend asset host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetResolver {
    host: String,
}

impl AssetResolver {
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            host: host.trim_end_matches('/').to_string(),
        }
    }

    /// Use the origin (`scheme://host:port`) of the backend URL as asset host.
    pub fn from_backend_url(backend_url: &str) -> Result<Self> {
        let url = Url::parse(backend_url)
            .with_context(|| format!("parse backend url {backend_url}"))?;
        let scheme = match url.scheme() {
            "ws" => "http",
            "wss" => "https",
            other => other,
        };
        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("backend url {backend_url} has no host"))?;
        let origin = match url.port() {
            Some(port) => format!("{scheme}://{host}:{port}"),
            None => format!("{scheme}://{host}"),
        };
        Ok(Self::new(origin))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn resolve(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_absolute(trimmed) {
            return trimmed.to_string();
        }
        if trimmed.starts_with('/') {
            format!("{}{trimmed}", self.host)
        } else {
            format!("{}/{trimmed}", self.host)
        }
    }

    pub fn resolve_opt(&self, raw: Option<&str>) -> Option<String> {
        raw.map(|s| self.resolve(s)).filter(|s| !s.is_empty())
    }
}

fn is_absolute(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("data:")
        || lower.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_the_asset_host() {
        let resolver = AssetResolver::new("http://host:3000");
        assert_eq!(
            resolver.resolve("/albumart?path=/mnt/a"),
            "http://host:3000/albumart?path=/mnt/a"
        );
        assert_eq!(
            resolver.resolve("albumart?path=x"),
            "http://host:3000/albumart?path=x"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        let resolver = AssetResolver::new("http://host:3000/");
        assert_eq!(resolver.resolve("https://cdn/x.jpg"), "https://cdn/x.jpg");
        assert_eq!(resolver.resolve("data:image/png;base64,AA"), "data:image/png;base64,AA");
        assert_eq!(resolver.resolve(""), "");
        assert_eq!(resolver.resolve_opt(Some("  ")), None);
    }

    #[test]
    fn trailing_slash_on_host_is_not_doubled() {
        let resolver = AssetResolver::new("http://host:3000/");
        assert_eq!(resolver.resolve("/a.png"), "http://host:3000/a.png");
    }

    #[test]
    fn host_derives_from_backend_origin() {
        let resolver = AssetResolver::from_backend_url("ws://volumio.local:3000/socket.io").unwrap();
        assert_eq!(resolver.host(), "http://volumio.local:3000");
        let resolver = AssetResolver::from_backend_url("https://player.lan").unwrap();
        assert_eq!(resolver.host(), "https://player.lan");
        assert!(AssetResolver::from_backend_url("not a url").is_err());
    }
}
