//! Health-SOS: emergency-healthcare landing page and assistant.
//!
//! This is the application entry point. It initializes tracing, loads configuration
//! from a TOML file, loads theme templates, sets up the Axum router with all routes,
//! and starts the HTTP server.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use health_sos::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use health_sos::http::start_server;
use health_sos::templates::init_templates;
use health_sos::{create_router, AppState};

/// Health-SOS: emergency-healthcare landing page and the Dr. Masuka assistant
#[derive(Parser, Debug)]
#[command(name = "health-sos", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "health_sos=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration first so the log format can be chosen
    let config = AppConfig::load(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(config = %args.config, "Loaded configuration");

    let tera = init_templates(&config.theme)?;
    tracing::info!(theme = %config.theme.name, "Initialized templates");

    let state = AppState::new(config.clone(), tera);
    tracing::info!(
        facilities = state.facilities.len(),
        builtin = config.facilities.is_empty(),
        "Facility directory ready"
    );
    tracing::info!(
        idle_timeout_secs = config.session.idle_timeout_seconds,
        max_sessions = config.session.max_sessions,
        "Initialized assistant session store"
    );

    let app = create_router(state);

    start_server(app, &config).await?;

    Ok(())
}
