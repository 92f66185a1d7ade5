//! HTTP surface for metric ingestion and live delivery.
//!
//! Thin shell over [`crate::store`] and [`crate::feed`]: producers POST
//! metric records to `/{category}`, observers GET `/{category}/{run_id}`
//! as a long-lived event stream, and a static chart UI is served as the
//! router fallback.
//!
//! # Example
//!
//! ```ignore
//! use vigilar::server::{MonitorServer, ServerConfig};
//!
//! let config = ServerConfig::default();
//! MonitorServer::new(config).run().await?;
//! ```

mod api;
mod handlers;
mod state;

pub use api::*;
pub use handlers::*;
pub use state::*;

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{MetricRecord, StoreLimits, UnknownCategory};

/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "VIGILAR_PORT";

/// Default listen port when neither flag nor environment sets one.
pub const DEFAULT_PORT: u16 = 3000;

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bind error: {0}")]
    Bind(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    Category(#[from] UnknownCategory),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Category(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server address
    pub address: SocketAddr,
    /// Directory of static UI assets served as the router fallback
    /// (None = no static hosting)
    pub static_dir: Option<PathBuf>,
    /// Store capacity limits
    pub limits: StoreLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            static_dir: None,
            limits: StoreLimits::default(),
        }
    }
}

impl ServerConfig {
    /// Create config with custom address
    #[must_use]
    pub fn with_address(mut self, addr: SocketAddr) -> Self {
        self.address = addr;
        self
    }

    /// Serve static assets from the given directory
    #[must_use]
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Set store capacity limits
    #[must_use]
    pub fn with_limits(mut self, limits: StoreLimits) -> Self {
        self.limits = limits;
        self
    }
}

// =============================================================================
// Request/Response DTOs
// =============================================================================

/// Body of a producer write: `{"id": <run id>, "metrics": <record>}`.
///
/// Both fields are optional on the wire; a malformed producer must not be
/// able to crash ingestion. A missing id is treated as the empty run id
/// and missing metrics as a null record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Run identifier, chosen by the producer
    #[serde(default)]
    pub id: Option<String>,
    /// Metric record payload, opaque to the server
    #[serde(default)]
    pub metrics: Option<MetricRecord>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Server status
    pub status: String,
    /// Server version
    pub version: String,
    /// Uptime in seconds
    pub uptime_secs: u64,
    /// Number of (category, run) logs
    pub runs_count: usize,
    /// Total stored records
    pub records_count: usize,
}

// =============================================================================
// Tests
// =============================================================================


// =============================================================================
// Property Tests
// =============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_server_config_port_preserved(port in 1024u16..65535) {
            let addr: SocketAddr = format!("127.0.0.1:{}", port).parse().unwrap();
            let config = ServerConfig::default().with_address(addr);
            prop_assert_eq!(config.address.port(), port);
        }

        #[test]
        fn prop_ingest_request_roundtrip(id in "[a-zA-Z0-9-]{1,40}", loss in -1e6f64..1e6) {
            let req = IngestRequest {
                id: Some(id.clone()),
                metrics: Some(serde_json::json!({"logs": {"loss": loss}})),
            };
            let json = serde_json::to_string(&req).unwrap();
            let parsed: IngestRequest = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(parsed.id, Some(id));
            prop_assert_eq!(parsed.metrics, req.metrics);
        }
    }
}
