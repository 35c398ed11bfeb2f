use axum::extract::{Json, State};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::models::{
    string_field, string_list, CompareRequest, CompareResponse, InsightRequest, InsightResponse,
    ReportRequest, ReportResponse,
};
use crate::AppState;

pub async fn analyze_handler(
    State(state): State<AppState>,
    Json(req): Json<InsightRequest>,
) -> Json<InsightResponse> {
    info!(data_type = %req.data_type, analysis_type = %req.analysis_type, "insight analysis requested");

    let result = state
        .llm
        .generate_insights(&req.data, &req.data_type, &req.analysis_type)
        .await;

    let response = match result {
        Ok(insights) => InsightResponse {
            success: true,
            analysis_type: req.analysis_type,
            summary: string_field(&insights, "summary"),
            recommendations: string_list(&insights, "recommendations"),
            insights: Some(insights),
            error: None,
        },
        Err(err) => {
            warn!(error = %err, "insight analysis failed");
            InsightResponse {
                success: false,
                analysis_type: req.analysis_type,
                insights: None,
                summary: None,
                recommendations: None,
                error: Some(err.to_string()),
            }
        }
    };

    Json(response)
}

pub async fn compare_handler(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> Json<CompareResponse> {
    info!(
        datasets = req.data_sets.len(),
        labels = req.labels.len(),
        comparison_type = %req.comparison_type,
        "comparison requested"
    );

    let result = state
        .llm
        .compare_data(&req.data_sets, &req.labels, &req.comparison_type)
        .await;

    let response = match result {
        Ok(comparison) => CompareResponse {
            success: true,
            highlights: string_list(&comparison, "highlights"),
            comparison: Some(comparison),
            error: None,
        },
        Err(err) => {
            warn!(error = %err, "comparison failed");
            CompareResponse {
                success: false,
                comparison: None,
                highlights: None,
                error: Some(err.to_string()),
            }
        }
    };

    Json(response)
}

pub async fn report_handler(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Json<ReportResponse> {
    info!(report_type = %req.report_type, language = %req.language, "report requested");

    let result = state
        .llm
        .generate_report(&req.data, &req.report_type, &req.language)
        .await;

    let response = match result {
        Ok(report) => ReportResponse {
            success: true,
            report: Some(report.full_report),
            sections: Some(report.sections),
            error: None,
        },
        Err(err) => {
            warn!(error = %err, "report generation failed");
            ReportResponse {
                success: false,
                report: None,
                sections: None,
                error: Some(err.to_string()),
            }
        }
    };

    Json(response)
}

#[derive(Debug, Serialize)]
pub struct TemplateOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TemplateCatalog {
    pub data_types: &'static [TemplateOption],
    pub analysis_types: &'static [TemplateOption],
    pub report_types: &'static [TemplateOption],
}

const fn option(id: &'static str, name: &'static str, description: &'static str) -> TemplateOption {
    TemplateOption { id, name, description }
}

pub static TEMPLATES: TemplateCatalog = TemplateCatalog {
    data_types: &[
        option("products", "Product data", "E-commerce product information analysis"),
        option("articles", "Articles/Blogs", "News and content analysis"),
        option("competitors", "Competitors", "Competitor analysis and comparison"),
        option("reviews", "Reviews", "Customer review sentiment analysis"),
        option("pricing", "Pricing", "Price trends and comparison analysis"),
    ],
    analysis_types: &[
        option("summary", "Summary", "Summary of the key content"),
        option("trends", "Trends", "Pattern and trend analysis"),
        option("recommendations", "Recommendations", "Recommended action items"),
        option("sentiment", "Sentiment analysis", "Positive/negative sentiment analysis"),
    ],
    report_types: &[
        option("executive", "Executive report", "Focused on key insights"),
        option("detailed", "Detailed report", "Includes the full analysis"),
        option("technical", "Technical report", "Data-centric analysis"),
    ],
};

/// Static catalog; never touches an external service.
pub async fn templates_handler() -> Json<&'static TemplateCatalog> {
    Json(&TEMPLATES)
}
