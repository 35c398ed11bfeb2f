pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod scraper;

use std::sync::Arc;
use config::Config;
use error::Result;
use llm::LlmClient;
use scraper::ScrapeClient;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scraper: Arc<ScrapeClient>,
    pub llm: Arc<LlmClient>,
}

impl AppState {
    /// Builds both outbound clients from the configuration.
    pub fn new(config: Config) -> Result<Self> {
        let scraper = ScrapeClient::new(
            &config.firecrawl_api_url,
            config.firecrawl_api_key.as_deref(),
        )?;
        let llm = LlmClient::new(
            &config.openrouter_base_url,
            &config.openrouter_api_key,
            &config.llm_model,
            &config.project_name,
        )?;

        Ok(Self {
            config: Arc::new(config),
            scraper: Arc::new(scraper),
            llm: Arc::new(llm),
        })
    }
}
