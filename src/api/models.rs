use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

/// An absolute `http`/`https` URL. Anything else is rejected while the
/// request body is being deserialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpUrl(Url);

impl HttpUrl {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for HttpUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let url = Url::deserialize(deserializer)?;
        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(HttpUrl(url)),
            scheme => Err(serde::de::Error::custom(format!(
                "URL scheme should be 'http' or 'https', got '{}'",
                scheme
            ))),
        }
    }
}

fn default_formats() -> Vec<String> {
    vec!["markdown".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_auto() -> String {
    "auto".to_string()
}

fn default_summary() -> String {
    "summary".to_string()
}

fn default_side_by_side() -> String {
    "side_by_side".to_string()
}

fn default_executive() -> String {
    "executive".to_string()
}

fn default_language() -> String {
    "ko".to_string()
}

fn default_map_limit() -> u32 {
    100
}

// Scraping

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: HttpUrl,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    #[serde(default = "default_true")]
    pub only_main_content: bool,
    /// Milliseconds.
    #[serde(default)]
    pub wait_for: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub url: String,
    pub content: Option<String>,
    pub metadata: Option<Map<String, Value>>,
    pub scraped_at: DateTime<Utc>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: HttpUrl,
    pub prompt: String,
    #[serde(default)]
    pub schema: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub url: String,
    pub data: Option<Map<String, Value>>,
    pub raw_content: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuickScrapeRequest {
    pub url: HttpUrl,
    #[serde(default = "default_auto")]
    pub data_type: String,
}

#[derive(Debug, Serialize)]
pub struct QuickScrapeResponse {
    pub success: bool,
    pub url: String,
    pub extracted_data: Option<Map<String, Value>>,
    pub insights: Option<Map<String, Value>>,
    pub raw_content: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MapRequest {
    pub url: HttpUrl,
    #[serde(default = "default_map_limit")]
    pub limit: u32,
    #[serde(default)]
    pub include_subdomains: bool,
}

#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub success: bool,
    pub url: String,
    pub result: Option<Value>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchScrapeRequest {
    pub urls: Vec<HttpUrl>,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    #[serde(default = "default_true")]
    pub only_main_content: bool,
}

#[derive(Debug, Serialize)]
pub struct BatchScrapeResponse {
    pub success: bool,
    pub result: Option<Value>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionTest {
    pub status: &'static str,
    pub firecrawl: &'static str,
    pub sample_length: usize,
}

#[derive(Debug, Serialize)]
pub struct ServicesHealth {
    pub scraping_engine: bool,
    pub llm: bool,
}

// Insights

#[derive(Debug, Deserialize)]
pub struct InsightRequest {
    pub data: Map<String, Value>,
    #[serde(default = "default_auto")]
    pub data_type: String,
    #[serde(default = "default_summary")]
    pub analysis_type: String,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub success: bool,
    pub analysis_type: String,
    pub insights: Option<Map<String, Value>>,
    pub summary: Option<String>,
    pub recommendations: Option<Vec<String>>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub data_sets: Vec<Map<String, Value>>,
    pub labels: Vec<String>,
    #[serde(default = "default_side_by_side")]
    pub comparison_type: String,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub success: bool,
    pub comparison: Option<Map<String, Value>>,
    pub highlights: Option<Vec<String>>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub data: Map<String, Value>,
    #[serde(default = "default_executive")]
    pub report_type: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub success: bool,
    pub report: Option<String>,
    pub sections: Option<IndexMap<String, String>>,
    pub error: Option<String>,
}

/// Reads `key` from a model reply as a string, if it is one.
pub fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}

/// Reads `key` as a list, keeping only its string items.
pub fn string_list(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    map.get(key).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect()
    })
}
