// ── Note source ──

use skylight_api::{NoteClient, TransportConfig};
use tracing::info;

use crate::config::{Configuration, endpoint};
use crate::error::CoreError;
use crate::model::Note;
use crate::sync::{FailurePolicy, Source, Synchronizer};

pub struct NoteSource {
    client: NoteClient,
}

impl NoteSource {
    pub fn from_config(
        config: &Configuration,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let url = config
            .api_url(endpoint::NOTE)
            .ok_or_else(|| CoreError::not_configured("No note service configured"))?;
        Ok(Self {
            client: NoteClient::new(url, transport)?,
        })
    }

    /// Replace the remote markup.
    pub async fn save(&self, html: &str) -> Result<(), CoreError> {
        self.client.replace(html).await?;
        info!(bytes = html.len(), "note saved");
        Ok(())
    }
}

impl Source for NoteSource {
    type Output = Note;
    const NAME: &'static str = "note";
    const FAILURE_POLICY: FailurePolicy = FailurePolicy::KeepStale;

    async fn fetch(&self) -> Result<Note, CoreError> {
        Ok(Note::from_html(self.client.get().await?))
    }
}

impl Synchronizer<NoteSource> {
    /// Save new markup, then refresh so the tile shows what the service
    /// actually stored.
    pub async fn save(&self, html: &str) -> Result<(), CoreError> {
        let source = self
            .source()
            .ok_or_else(|| CoreError::not_configured("No note service configured"))?;
        source.save(html).await?;
        self.fetch_and_publish().await;
        Ok(())
    }
}
