// ── Backend health source ──

use skylight_api::{BackendClient, HealthReport, TransportConfig};

use crate::config::{Configuration, endpoint};
use crate::error::CoreError;
use crate::sync::{FailurePolicy, Source};

pub struct HealthSource {
    client: BackendClient,
}

impl HealthSource {
    pub fn from_config(
        config: &Configuration,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let url = config
            .api_url(endpoint::BACKEND)
            .ok_or_else(|| CoreError::not_configured("No backend configured"))?;
        Ok(Self {
            client: BackendClient::new(url, transport)?,
        })
    }
}

impl Source for HealthSource {
    type Output = HealthReport;
    const NAME: &'static str = "health";
    const FAILURE_POLICY: FailurePolicy = FailurePolicy::Clear;

    async fn fetch(&self) -> Result<HealthReport, CoreError> {
        Ok(self.client.health().await?)
    }
}
