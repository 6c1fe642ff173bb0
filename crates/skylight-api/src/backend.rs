// Backend health check.

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::http::Endpoint;
use crate::transport::TransportConfig;

/// `GET {url}/api/health` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub devices_configured: Option<u32>,
    #[serde(default)]
    pub notifications_count: Option<u32>,
    #[serde(default)]
    pub recurring_count: Option<u32>,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Async client for the backend service's health endpoint.
pub struct BackendClient {
    endpoint: Endpoint,
}

impl BackendClient {
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            endpoint: Endpoint::new(base_url, transport.build_client()?)?,
        })
    }

    pub async fn health(&self) -> Result<HealthReport, Error> {
        self.endpoint.get("api/health").await
    }
}
