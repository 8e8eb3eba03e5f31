//! Server configuration read from the environment at startup.

use axum::http::HeaderValue;
use std::net::SocketAddr;

use storybook_core::defaults;

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// CORS origin whitelist.
    pub allowed_origins: Vec<HeaderValue>,
    pub rate_limit_enabled: bool,
    /// Requests allowed per `rate_limit_period_secs`.
    pub rate_limit_requests: u32,
    pub rate_limit_period_secs: u64,
    /// Largest accepted request body, sized for inlined photos.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            allowed_origins: default_origins(),
            rate_limit_enabled: true,
            rate_limit_requests: defaults::RATE_LIMIT_REQUESTS,
            rate_limit_period_secs: defaults::RATE_LIMIT_PERIOD_SECS,
            max_body_bytes: defaults::MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load from environment variables.
    ///
    /// Unparseable numbers fall back to their defaults.
    pub fn from_env() -> Self {
        fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
            std::env::var(name)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        }

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| defaults::HOST.to_string()),
            port: parsed_or("PORT", defaults::PORT),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|v| parse_allowed_origins(&v))
                .unwrap_or_else(|_| default_origins()),
            rate_limit_enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            rate_limit_requests: parsed_or("RATE_LIMIT_REQUESTS", defaults::RATE_LIMIT_REQUESTS),
            rate_limit_period_secs: parsed_or(
                "RATE_LIMIT_PERIOD_SECS",
                defaults::RATE_LIMIT_PERIOD_SECS,
            ),
            max_body_bytes: parsed_or("MAX_BODY_BYTES", defaults::MAX_BODY_BYTES),
        }
    }

    /// Socket address to bind.
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

fn default_origins() -> Vec<HeaderValue> {
    defaults::ALLOWED_ORIGINS
        .iter()
        .copied()
        .map(HeaderValue::from_static)
        .collect()
}

/// Parse a comma-separated CORS origin list.
///
/// Entries that are not valid header values are dropped with a warning, as
/// is a `*` wildcard since credentialed CORS cannot use one. A blank list
/// yields the default development origins.
///
/// ```text
/// ALLOWED_ORIGINS=https://storybook.example.com,http://localhost:5173
/// ```
pub fn parse_allowed_origins(origins_str: &str) -> Vec<HeaderValue> {
    if origins_str.trim().is_empty() {
        return default_origins();
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            if trimmed == "*" {
                tracing::warn!("Ignoring wildcard CORS origin '*'; list origins explicitly");
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
