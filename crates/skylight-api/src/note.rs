// Shared note service client.
//
// GET  {url}  ->  { "html": "..." }
// POST {url}      { "html": "..." }

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::http::Endpoint;
use crate::transport::TransportConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NoteBody {
    #[serde(default, alias = "content")]
    html: String,
}

/// Async client for the note service.
pub struct NoteClient {
    endpoint: Endpoint,
}

impl NoteClient {
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            endpoint: Endpoint::new(base_url, transport.build_client()?)?,
        })
    }

    /// Fetch the current note markup.
    pub async fn get(&self) -> Result<String, Error> {
        let body: NoteBody = self.endpoint.get("").await?;
        Ok(body.html)
    }

    /// Replace the note markup.
    pub async fn replace(&self, html: &str) -> Result<(), Error> {
        let body = NoteBody {
            html: html.to_owned(),
        };
        self.endpoint.post_no_response("", &body).await
    }
}
