//! Memory Keeper Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memory_keeper_engine::{
    api,
    infrastructure::{
        clock::{SystemClock, SystemRandom},
        config::AppConfig,
        gemini::GeminiClient,
        ports::{ClockPort, LlmPort},
        record_store::SqliteRecordRepo,
    },
    use_cases::{LlmStatusProbe, MockNavigator, NarrativeGenerator, StoryNavigator},
    App,
};

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be started from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memory_keeper_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Memory Keeper Engine");

    let config = AppConfig::from_env();
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    // Open record storage
    tracing::info!(path = %config.database_path, "Opening record database");
    let record_repo = Arc::new(SqliteRecordRepo::new(&config.database_path, clock.clone()).await?);

    // Pick the story navigator
    let live_key = config.live_api_key().map(str::to_string);
    if !config.mock_mode && live_key.is_none() {
        tracing::warn!(
            "MOCK_MODE=false but GEMINI_API_KEY is missing or a placeholder, falling back to mock mode"
        );
    }
    let mock_mode = live_key.is_none();

    let (navigator, llm_status): (Arc<dyn StoryNavigator>, LlmStatusProbe) = match live_key {
        Some(key) => {
            let gemini = match config.llm_timeout_secs {
                Some(secs) => GeminiClient::with_timeout(
                    &config.gemini_base_url,
                    &config.gemini_model,
                    &key,
                    secs,
                ),
                None => GeminiClient::new(&config.gemini_base_url, &config.gemini_model, &key),
            };
            tracing::info!(model = %gemini.model(), "Using Gemini for story generation");
            let llm: Arc<dyn LlmPort> = Arc::new(gemini);
            (
                Arc::new(NarrativeGenerator::new(llm.clone(), clock.clone())),
                LlmStatusProbe::live(llm, config.gemini_model.clone()),
            )
        }
        None => {
            tracing::info!("No usable GEMINI_API_KEY, serving canned responses (mock mode)");
            (
                Arc::new(MockNavigator::new(Arc::new(SystemRandom::new()), clock.clone())),
                LlmStatusProbe::mock(config.gemini_model.clone()),
            )
        }
    };

    // Create application
    let app = Arc::new(App::new(
        navigator,
        record_repo,
        llm_status,
        clock,
        mock_mode,
        config.session_ttl,
    ));

    // Spawn idle session cleanup
    let sessions = app.sessions.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(SESSION_CLEANUP_INTERVAL).await;
            let removed = sessions.cleanup_expired().await;
            if removed > 0 {
                let remaining = sessions.len().await;
                tracing::debug!(removed, remaining, "Cleaned up idle sessions");
            }
        }
    });

    let mut router = api::router(app).layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
