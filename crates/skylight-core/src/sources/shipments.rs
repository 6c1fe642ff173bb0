// ── Shipment source ──

use skylight_api::{ShipmentClient, TransportConfig};

use crate::config::{Configuration, Credentials, endpoint};
use crate::error::CoreError;
use crate::model::{Shipment, ShipmentBoard};
use crate::sync::{FailurePolicy, Source};

/// Shown when the tracker has no API key.
pub const NO_KEY_REASON: &str = "No tracking key configured";

/// Fetches every tracking record; widgets derive the active view.
pub struct ShipmentSource {
    client: ShipmentClient,
}

impl ShipmentSource {
    /// Requires a tracker key; the URL defaults to the public tracker.
    pub fn from_config(
        config: &Configuration,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let key = credentials
            .get(endpoint::SHIPMENTS)
            .ok_or_else(|| CoreError::not_configured(NO_KEY_REASON))?;
        let url = config
            .api_url(endpoint::SHIPMENTS)
            .unwrap_or(skylight_api::shipments::DEFAULT_TRACKINGS_URL);
        Ok(Self {
            client: ShipmentClient::new(url, key, transport)?,
        })
    }

    pub fn from_client(client: ShipmentClient) -> Self {
        Self { client }
    }
}

impl Source for ShipmentSource {
    type Output = ShipmentBoard;
    const NAME: &'static str = "shipments";
    const FAILURE_POLICY: FailurePolicy = FailurePolicy::Clear;

    async fn fetch(&self) -> Result<ShipmentBoard, CoreError> {
        let trackings = self.client.list_trackings().await?;
        Ok(ShipmentBoard::new(
            trackings.into_iter().map(Shipment::from).collect(),
        ))
    }
}
