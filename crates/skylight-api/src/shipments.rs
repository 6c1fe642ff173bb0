// Shipment tracker client (AfterShip-compatible).
//
// GET {url}  ->  { "data": { "trackings": [...] } }
// Auth: `as-api-key` header

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::http::Endpoint;
use crate::transport::TransportConfig;

/// Public tracker endpoint, used when only a key is configured.
pub const DEFAULT_TRACKINGS_URL: &str = "https://api.aftership.com/tracking/2024-04/trackings";

const API_KEY_HEADER: &str = "as-api-key";

/// One scan event along a shipment's route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default)]
    pub checkpoint_time: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

/// Tracking record as reported by the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracking {
    #[serde(default)]
    pub id: String,
    /// Delivery status tag: `"InTransit"`, `"OutForDelivery"`, `"Delivered"`, ...
    #[serde(default)]
    pub tag: String,
    /// Carrier slug.
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub expected_delivery: Option<String>,
    #[serde(default)]
    pub tracking_number: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
}

#[derive(Deserialize)]
struct TrackingsEnvelope {
    data: TrackingsData,
}

#[derive(Deserialize)]
struct TrackingsData {
    #[serde(default)]
    trackings: Vec<Tracking>,
}

/// Async client for the shipment tracker.
pub struct ShipmentClient {
    endpoint: Endpoint,
}

impl ShipmentClient {
    /// Build from a tracker URL and API key (sent as `as-api-key`).
    pub fn new(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_keyed_client(API_KEY_HEADER, api_key)?;
        Ok(Self {
            endpoint: Endpoint::new(base_url, http)?,
        })
    }

    pub fn base_url(&self) -> &url::Url {
        self.endpoint.base_url()
    }

    pub async fn list_trackings(&self) -> Result<Vec<Tracking>, Error> {
        let envelope: TrackingsEnvelope = self.endpoint.get("").await?;
        Ok(envelope.data.trackings)
    }
}
