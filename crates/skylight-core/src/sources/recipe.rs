// ── Recipe source ──

use skylight_api::{RecipeClient, TransportConfig};

use crate::config::{Configuration, endpoint};
use crate::error::CoreError;
use crate::model::Recipe;
use crate::sync::{FailurePolicy, Source};

pub struct RecipeSource {
    client: RecipeClient,
}

impl RecipeSource {
    pub fn from_config(
        config: &Configuration,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let url = config
            .api_url(endpoint::RECIPE)
            .ok_or_else(|| CoreError::not_configured("No recipe service configured"))?;
        Ok(Self {
            client: RecipeClient::new(url, transport)?,
        })
    }
}

impl Source for RecipeSource {
    type Output = Recipe;
    const NAME: &'static str = "recipe";
    const FAILURE_POLICY: FailurePolicy = FailurePolicy::KeepStale;

    async fn fetch(&self) -> Result<Recipe, CoreError> {
        Ok(Recipe::from(self.client.get().await?))
    }
}
