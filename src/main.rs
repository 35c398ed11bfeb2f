use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use scrape_insights::{
    config::Config,
    api::routes::create_router,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    let default_filter = if config.debug {
        "scrape_insights=debug,tower_http=debug"
    } else {
        "scrape_insights=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let server_addr = config.server_addr;
    info!(
        service = %config.project_name,
        version = %config.version,
        scraping_engine = %config.firecrawl_api_url,
        model = %config.llm_model,
        "starting server"
    );

    let app_state = AppState::new(config)?;
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    info!("listening on {}", server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
