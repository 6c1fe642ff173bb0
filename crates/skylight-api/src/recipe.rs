// Recipe-of-the-day client.

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::http::Endpoint;
use crate::transport::TransportConfig;

/// Recipe object as cached by the backend. Every field is optional on the
/// wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipePayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Preparation time, free text (`"45 minutes"`).
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub servings: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Unix seconds of the backend's last scrape.
    #[serde(default)]
    pub updated: Option<i64>,
}

/// Async client for the recipe service.
pub struct RecipeClient {
    endpoint: Endpoint,
}

impl RecipeClient {
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            endpoint: Endpoint::new(base_url, transport.build_client()?)?,
        })
    }

    pub async fn get(&self) -> Result<RecipePayload, Error> {
        self.endpoint.get("").await
    }
}
