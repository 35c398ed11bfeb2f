use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;
use crate::error::{AppError, Result};

const SERVICE: &str = "scraping engine";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Options forwarded to the engine's `/v1/scrape` endpoint.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub formats: Vec<String>,
    pub only_main_content: bool,
    /// Milliseconds the engine waits before capturing the page.
    pub wait_for: Option<u64>,
    pub include_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            formats: vec!["markdown".to_string()],
            only_main_content: true,
            wait_for: None,
            include_tags: Vec::new(),
            exclude_tags: Vec::new(),
        }
    }
}

impl ScrapeOptions {
    fn payload(&self, url: &str) -> Value {
        let mut payload = json!({
            "url": url,
            "formats": self.formats,
            "onlyMainContent": self.only_main_content,
        });

        if let Some(wait_for) = self.wait_for.filter(|ms| *ms > 0) {
            payload["waitFor"] = json!(wait_for);
        }
        if !self.include_tags.is_empty() {
            payload["includeTags"] = json!(self.include_tags);
        }
        if !self.exclude_tags.is_empty() {
            payload["excludeTags"] = json!(self.exclude_tags);
        }

        payload
    }
}

/// The parts of a scrape result the handlers care about.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapedPage {
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl ScrapedPage {
    /// Markdown if the engine produced any, otherwise HTML.
    pub fn content(&self) -> Option<&str> {
        self.markdown
            .as_deref()
            .filter(|md| !md.is_empty())
            .or(self.html.as_deref())
    }

    pub fn markdown_or_empty(&self) -> &str {
        self.markdown.as_deref().unwrap_or("")
    }
}

/// Thin wrapper over a Firecrawl-compatible scraping engine.
pub struct ScrapeClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ScrapeClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()).map(String::from),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("Content-Type", "application/json");
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let endpoint = format!("{}{}", self.base_url, path);
        debug!(endpoint = %endpoint, "calling scraping engine");

        let resp = self
            .authorized(self.client.post(&endpoint))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json::<Value>().await?)
    }

    /// Scrapes a single URL. The engine nests results under `data`; the
    /// envelope is removed when present.
    pub async fn scrape(&self, url: &str, options: &ScrapeOptions) -> Result<ScrapedPage> {
        let reply = self.post("/v1/scrape", &options.payload(url)).await?;

        let page = match reply {
            Value::Object(mut envelope) if envelope.contains_key("data") => {
                envelope.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };

        if page.is_null() {
            return Ok(ScrapedPage::default());
        }

        serde_json::from_value(page)
            .map_err(|e| AppError::Fetch(format!("Unexpected scrape payload: {}", e)))
    }

    pub async fn batch_scrape(
        &self,
        urls: &[String],
        formats: &[String],
        only_main_content: bool,
    ) -> Result<Value> {
        let payload = json!({
            "urls": urls,
            "formats": formats,
            "onlyMainContent": only_main_content,
        });
        self.post("/v1/batch/scrape", &payload).await
    }

    pub async fn map_site(&self, url: &str, limit: u32, include_subdomains: bool) -> Result<Value> {
        let payload = json!({
            "url": url,
            "limit": limit,
            "includeSubdomains": include_subdomains,
        });
        self.post("/v1/map", &payload).await
    }

    /// Engine-side structured extraction. The API routes use the LLM client
    /// instead; this stays available for deployments on the hosted engine.
    pub async fn extract(
        &self,
        urls: &[String],
        prompt: &str,
        schema: Option<&Map<String, Value>>,
    ) -> Result<Value> {
        let mut payload = json!({
            "urls": urls,
            "prompt": prompt,
        });
        if let Some(schema) = schema.filter(|s| !s.is_empty()) {
            payload["schema"] = Value::Object(schema.clone());
        }
        self.post("/v1/extract", &payload).await
    }

    pub async fn health_check(&self) -> bool {
        let endpoint = format!("{}/health", self.base_url);
        match self.client.get(&endpoint).timeout(HEALTH_TIMEOUT).send().await {
            Ok(resp) => resp.status() == StatusCode::OK,
            Err(e) => {
                debug!(error = %e, "scraping engine health check failed");
                false
            }
        }
    }
}
