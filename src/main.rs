use anyhow::{Context, Result};
use faq_translate::config::{Config, TranslatorKind};
use faq_translate::db::Database;
use faq_translate::retry::RetryConfig;
use faq_translate::routes::{self, AppState};
use faq_translate::translation::{MockTranslator, OpenAiTranslator, Translator};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("faq_translate=info".parse()?),
        )
        .init();

    info!("Starting FAQ translation service");

    // Load configuration from environment
    let config = Config::from_env()?;
    let languages = config.languages();
    info!(
        "Original language '{}', translating into {:?}",
        languages.original(),
        languages.targets().iter().map(|c| c.as_str()).collect::<Vec<_>>()
    );

    let db = Database::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;

    let translator = build_translator(&config)?;
    info!("Using translator: {}", translator.provider_name());

    let state = Arc::new(AppState::new(
        db,
        translator,
        languages,
        config.cache_ttl,
        config.translation_timeout,
        RetryConfig::translation(),
    ));

    // One fill pass for languages added since records were written
    if config.backfill_on_start {
        let store = state.store.clone();
        tokio::spawn(async move {
            match store.backfill().await {
                Ok(written) => info!("Startup backfill complete ({} translation(s))", written),
                Err(e) => error!("Startup backfill failed: {}", e),
            }
        });
    }

    let app = routes::router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

fn build_translator(config: &Config) -> Result<Arc<dyn Translator>> {
    match config.translator {
        TranslatorKind::Mock => {
            warn!("TRANSLATOR=mock: translations are placeholders");
            Ok(Arc::new(MockTranslator::suffix()))
        }
        TranslatorKind::OpenAi => {
            let api_key = config
                .openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY not set")?;
            let client = reqwest::Client::builder()
                .build()
                .context("Failed to create HTTP client")?;
            Ok(Arc::new(OpenAiTranslator::new(
                client,
                &config.openai_api_url,
                api_key,
                &config.openai_model,
            )))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
