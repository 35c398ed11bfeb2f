//! Scraping routes: single page scrape, LLM extraction, and the
//! scrape → extract → insight "quick" chain.

use axum::extract::{Json, State};
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::api::models::{
    BatchScrapeRequest, BatchScrapeResponse, ConnectionTest, ExtractRequest, ExtractResponse,
    MapRequest, MapResponse, QuickScrapeRequest, QuickScrapeResponse, ScrapeRequest,
    ScrapeResponse, ServicesHealth,
};
use crate::error::{AppError, Result};
use crate::llm::prompts::truncate_chars;
use crate::scraper::ScrapeOptions;
use crate::AppState;

const EXTRACT_PREVIEW_CHARS: usize = 1000;
const QUICK_PREVIEW_CHARS: usize = 500;
const CONNECTION_TEST_URL: &str = "https://example.com";

fn preview(content: &str, max_chars: usize) -> Option<String> {
    if content.is_empty() {
        None
    } else {
        Some(truncate_chars(content, max_chars).to_string())
    }
}

pub async fn scrape_handler(
    State(state): State<AppState>,
    Json(req): Json<ScrapeRequest>,
) -> Json<ScrapeResponse> {
    info!(url = %req.url, formats = ?req.formats, "scrape requested");

    let options = ScrapeOptions {
        formats: req.formats,
        only_main_content: req.only_main_content,
        wait_for: req.wait_for,
        ..ScrapeOptions::default()
    };
    let url = req.url.to_string();

    let response = match state.scraper.scrape(&url, &options).await {
        Ok(page) => ScrapeResponse {
            success: true,
            content: page.content().map(String::from),
            metadata: page.metadata,
            url,
            scraped_at: Utc::now(),
            error: None,
        },
        Err(err) => {
            warn!(url = %url, error = %err, "scrape failed");
            ScrapeResponse {
                success: false,
                url,
                content: None,
                metadata: None,
                scraped_at: Utc::now(),
                error: Some(err.to_string()),
            }
        }
    };

    Json(response)
}

async fn process_extract(state: &AppState, req: &ExtractRequest) -> Result<(Map<String, Value>, String)> {
    let page = state
        .scraper
        .scrape(req.url.as_str(), &ScrapeOptions::default())
        .await?;
    let raw_content = page.markdown.unwrap_or_default();

    let data = state
        .llm
        .extract_structured_data(&raw_content, &req.prompt, req.schema.as_ref())
        .await?;

    Ok((data, raw_content))
}

pub async fn extract_handler(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Json<ExtractResponse> {
    info!(url = %req.url, "extract requested");
    let url = req.url.to_string();

    let response = match process_extract(&state, &req).await {
        Ok((data, raw_content)) => ExtractResponse {
            success: true,
            data: Some(data),
            raw_content: preview(&raw_content, EXTRACT_PREVIEW_CHARS),
            url,
            scraped_at: Utc::now(),
            error: None,
        },
        Err(err) => {
            warn!(url = %url, error = %err, "extract failed");
            ExtractResponse {
                success: false,
                url,
                data: None,
                raw_content: None,
                scraped_at: Utc::now(),
                error: Some(err.to_string()),
            }
        }
    };

    Json(response)
}

struct QuickResult {
    extracted: Map<String, Value>,
    insights: Map<String, Value>,
    raw_content: String,
}

/// Runs the three steps in order; the first failure abandons the chain.
async fn process_quick(state: &AppState, req: &QuickScrapeRequest) -> Result<QuickResult> {
    let page = state
        .scraper
        .scrape(req.url.as_str(), &ScrapeOptions::default())
        .await?;
    let raw_content = page.markdown.unwrap_or_default();

    let extracted = state.llm.auto_extract(&raw_content, &req.data_type).await?;
    let insights = state
        .llm
        .generate_insights(&extracted, &req.data_type, "summary")
        .await?;

    Ok(QuickResult {
        extracted,
        insights,
        raw_content,
    })
}

pub async fn quick_handler(
    State(state): State<AppState>,
    Json(req): Json<QuickScrapeRequest>,
) -> Json<QuickScrapeResponse> {
    info!(url = %req.url, data_type = %req.data_type, "quick scrape requested");
    let start_time = std::time::Instant::now();
    let url = req.url.to_string();

    let response = match process_quick(&state, &req).await {
        Ok(result) => {
            info!(url = %url, elapsed = ?start_time.elapsed(), "quick scrape finished");
            QuickScrapeResponse {
                success: true,
                extracted_data: Some(result.extracted),
                insights: Some(result.insights),
                raw_content: preview(&result.raw_content, QUICK_PREVIEW_CHARS),
                url,
                scraped_at: Utc::now(),
                error: None,
            }
        }
        Err(err) => {
            warn!(url = %url, error = %err, "quick scrape failed");
            QuickScrapeResponse {
                success: false,
                url,
                extracted_data: None,
                insights: None,
                raw_content: None,
                scraped_at: Utc::now(),
                error: Some(err.to_string()),
            }
        }
    };

    Json(response)
}

/// Scrapes a known page to prove the engine is reachable. Unlike the other
/// routes a failure here is a 503.
pub async fn connection_test_handler(State(state): State<AppState>) -> Result<Json<ConnectionTest>> {
    let page = state
        .scraper
        .scrape(CONNECTION_TEST_URL, &ScrapeOptions::default())
        .await
        .map_err(|err| {
            warn!(error = %err, "scraping engine connection test failed");
            AppError::Unavailable(format!("Scraping engine connection failed: {}", err))
        })?;

    Ok(Json(ConnectionTest {
        status: "connected",
        firecrawl: "ok",
        sample_length: page.markdown_or_empty().chars().count(),
    }))
}

pub async fn services_health_handler(State(state): State<AppState>) -> Json<ServicesHealth> {
    let (scraping_engine, llm) = tokio::join!(state.scraper.health_check(), state.llm.health_check());
    Json(ServicesHealth {
        scraping_engine,
        llm,
    })
}

pub async fn map_handler(
    State(state): State<AppState>,
    Json(req): Json<MapRequest>,
) -> Json<MapResponse> {
    info!(url = %req.url, limit = req.limit, "site map requested");
    let url = req.url.to_string();

    let response = match state
        .scraper
        .map_site(&url, req.limit, req.include_subdomains)
        .await
    {
        Ok(result) => MapResponse {
            success: true,
            url,
            result: Some(result),
            error: None,
        },
        Err(err) => {
            warn!(url = %url, error = %err, "site map failed");
            MapResponse {
                success: false,
                url,
                result: None,
                error: Some(err.to_string()),
            }
        }
    };

    Json(response)
}

pub async fn batch_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchScrapeRequest>,
) -> Json<BatchScrapeResponse> {
    info!(count = req.urls.len(), "batch scrape requested");
    let urls: Vec<String> = req.urls.iter().map(ToString::to_string).collect();

    let response = match state
        .scraper
        .batch_scrape(&urls, &req.formats, req.only_main_content)
        .await
    {
        Ok(result) => BatchScrapeResponse {
            success: true,
            result: Some(result),
            error: None,
        },
        Err(err) => {
            warn!(error = %err, "batch scrape failed");
            BatchScrapeResponse {
                success: false,
                result: None,
                error: Some(err.to_string()),
            }
        }
    };

    Json(response)
}
