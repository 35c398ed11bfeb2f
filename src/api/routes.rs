use axum::{
    extract::{Json, State},
    http::{HeaderValue, Request},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::api::{auth, insights, scraping};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/scraping", scraping_routes())
        .nest("/insights", insights_routes());

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest(&app_state.config.api_prefix, api)
        .layer(cors_layer(&app_state.config.cors_origins))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .with_state(app_state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler))
        .route("/me", get(auth::me_handler))
}

fn scraping_routes() -> Router<AppState> {
    Router::new()
        .route("/scrape", post(scraping::scrape_handler))
        .route("/extract", post(scraping::extract_handler))
        .route("/quick", post(scraping::quick_handler))
        .route("/test", get(scraping::connection_test_handler))
        .route("/health", get(scraping::services_health_handler))
        .route("/map", post(scraping::map_handler))
        .route("/batch", post(scraping::batch_handler))
}

fn insights_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(insights::analyze_handler))
        .route("/compare", post(insights::compare_handler))
        .route("/report", post(insights::report_handler))
        .route("/templates", get(insights::templates_handler))
}

/// Credentialed CORS for the configured origins. A `*` entry mirrors the
/// request origin, since a wildcard cannot be combined with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": state.config.project_name,
        "version": state.config.version,
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
