pub mod parse;
pub mod prompts;

use indexmap::IndexMap;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;
use crate::error::{AppError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOKENS: u32 = 4000;
const REPORT_TEMPERATURE: f32 = 0.5;
const REFERER: &str = "https://webscraping.app";

#[derive(Serialize, Debug, Clone)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// A generated markdown report and its `## ` sections.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub full_report: String,
    pub sections: IndexMap<String, String>,
}

/// Client for an OpenAI-compatible chat completion API (OpenRouter by default).
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    app_title: String,
}

impl LlmClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, app_title: &str) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            app_title: app_title.to_string(),
        })
    }

    /// One chat completion round trip; returns the first choice's text.
    pub async fn chat(&self, messages: &[Message], temperature: f32, max_tokens: u32) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens,
        };
        let endpoint = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, temperature, max_tokens, "calling LLM");

        let res = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", REFERER)
            .header("X-Title", &self.app_title)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                service: "LLM provider",
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = res
            .json()
            .await
            .map_err(|_| AppError::Llm("Invalid response format from LLM".to_string()))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Llm("Invalid response format from LLM".to_string()))
    }

    async fn ask(&self, system: &str, prompt: String, temperature: f32) -> Result<String> {
        let messages = [Message::system(system), Message::user(prompt)];
        self.chat(&messages, temperature, DEFAULT_MAX_TOKENS).await
    }

    pub async fn extract_structured_data(
        &self,
        content: &str,
        prompt: &str,
        schema: Option<&Map<String, Value>>,
    ) -> Result<Map<String, Value>> {
        let prompt = prompts::extraction(content, prompt, schema);
        let reply = self.ask(prompts::EXTRACTION_SYSTEM, prompt, DEFAULT_TEMPERATURE).await?;
        Ok(parse::parse_json_response(&reply))
    }

    /// Lets the model detect what kind of data the page holds and extract it.
    pub async fn auto_extract(&self, content: &str, data_type: &str) -> Result<Map<String, Value>> {
        let prompt = prompts::auto_extract(content, data_type);
        let reply = self.ask(prompts::AUTO_EXTRACT_SYSTEM, prompt, DEFAULT_TEMPERATURE).await?;
        Ok(parse::parse_json_response(&reply))
    }

    pub async fn generate_insights(
        &self,
        data: &Map<String, Value>,
        data_type: &str,
        analysis_type: &str,
    ) -> Result<Map<String, Value>> {
        let prompt = prompts::insight(data, data_type, analysis_type);
        let reply = self.ask(prompts::INSIGHT_SYSTEM, prompt, DEFAULT_TEMPERATURE).await?;
        Ok(parse::parse_json_response(&reply))
    }

    pub async fn compare_data(
        &self,
        data_sets: &[Map<String, Value>],
        labels: &[String],
        comparison_type: &str,
    ) -> Result<Map<String, Value>> {
        let prompt = prompts::comparison(data_sets, labels, comparison_type);
        let reply = self.ask(prompts::COMPARE_SYSTEM, prompt, DEFAULT_TEMPERATURE).await?;
        Ok(parse::parse_json_response(&reply))
    }

    pub async fn generate_report(
        &self,
        data: &Map<String, Value>,
        report_type: &str,
        language: &str,
    ) -> Result<Report> {
        let prompt = prompts::report(data, report_type, language);
        let full_report = self.ask(prompts::REPORT_SYSTEM, prompt, REPORT_TEMPERATURE).await?;
        let sections = parse::split_sections(&full_report);
        Ok(Report { full_report, sections })
    }

    pub async fn health_check(&self) -> bool {
        match self.chat(&[Message::user("Hello")], DEFAULT_TEMPERATURE, 10).await {
            Ok(reply) => !reply.is_empty(),
            Err(e) => {
                debug!(error = %e, "LLM health check failed");
                false
            }
        }
    }
}
