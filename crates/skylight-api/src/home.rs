// Client for the home-automation hub that owns the smart devices.
//
// State:   GET  {url}/api/states/{entity}
// Command: POST {url}/api/services/{domain}/{action}  { entity_id, ...params }
// Auth:    Authorization: Bearer <token>

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;
use crate::http::Endpoint;
use crate::transport::TransportConfig;

/// Raw entity state as reported by the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    #[serde(default)]
    pub entity_id: Option<String>,
    /// `"on"`, `"off"`, `"unavailable"`, ...
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityState {
    /// Whether the hub reports the entity as switched on.
    pub fn is_on(&self) -> bool {
        self.state.eq_ignore_ascii_case("on")
    }

    /// Brightness on the hub's native 0–255 scale, if reported.
    pub fn brightness(&self) -> Option<u8> {
        self.attributes
            .get("brightness")
            .and_then(Value::as_f64)
            .map(|raw| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
                let clamped = raw.round().clamp(0.0, 255.0) as u8;
                clamped
            })
    }
}

/// Async client for the device control API.
pub struct HomeClient {
    endpoint: Endpoint,
}

impl HomeClient {
    /// Build from a base URL and bearer token.
    pub fn new(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_bearer_client(token)?;
        Ok(Self {
            endpoint: Endpoint::new(base_url, http)?,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            endpoint: Endpoint::new(base_url, http)?,
        })
    }

    /// Fetch the authoritative state of one entity.
    pub async fn get_state(&self, entity_id: &str) -> Result<EntityState, Error> {
        self.endpoint
            .get(&format!("api/states/{entity_id}"))
            .await
    }

    /// Invoke `{domain}.{action}` on an entity. Extra `params` are merged
    /// into the request body next to `entity_id`.
    pub async fn call_service(
        &self,
        domain: &str,
        action: &str,
        entity_id: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<(), Error> {
        let mut body = params.unwrap_or_default();
        body.insert("entity_id".into(), Value::String(entity_id.to_owned()));

        self.endpoint
            .post_no_response(&format!("api/services/{domain}/{action}"), &body)
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn parses_brightness_attribute() {
        let state: EntityState = serde_json::from_value(serde_json::json!({
            "entity_id": "light.kitchen",
            "state": "on",
            "attributes": { "brightness": 127.6, "friendly_name": "Kitchen" }
        }))
        .unwrap();

        assert!(state.is_on());
        assert_eq!(state.brightness(), Some(128));
    }

    #[test]
    fn missing_attributes_default_to_empty() {
        let state: EntityState =
            serde_json::from_value(serde_json::json!({ "state": "off" })).unwrap();
        assert!(!state.is_on());
        assert_eq!(state.brightness(), None);
    }
}
