// Notification service client.
//
// List:    GET    {url}
// Dismiss: DELETE {url}/{id}
// Push:    WebSocket, see `crate::push`

use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;
use crate::http::Endpoint;
use crate::transport::TransportConfig;

/// Notification as delivered by the REST list and by push frames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNotification {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub target_time: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
}

/// Async client for the notification REST surface.
pub struct NotificationClient {
    endpoint: Endpoint,
}

impl NotificationClient {
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            endpoint: Endpoint::new(base_url, transport.build_client()?)?,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            endpoint: Endpoint::new(base_url, http)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        self.endpoint.base_url()
    }

    /// Fetch every active notification.
    pub async fn list(&self) -> Result<Vec<RawNotification>, Error> {
        self.endpoint.get("").await
    }

    /// Delete one notification by id.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.endpoint.delete_item(id).await
    }
}

/// Derive the push endpoint from the REST URL: `http` becomes `ws`,
/// `https` becomes `wss`, same host, port + 1, path `/`.
pub fn derive_push_url(rest: &Url) -> Result<Url, Error> {
    let scheme = match rest.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    let host = rest
        .host_str()
        .ok_or_else(|| Error::WebSocketConnect(format!("no host in {rest}")))?;
    let port = rest
        .port_or_known_default()
        .map_or(81, |p| p.saturating_add(1));

    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_owned()
    };

    Ok(Url::parse(&format!("{scheme}://{host}:{port}/"))?)
}
