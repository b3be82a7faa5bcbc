use anyhow::Context;
use axum::http::HeaderValue;
use clap::Parser;
use rewind_server::{AppState, Config, handlers::videos::CreateVideoRequest, routes};
use std::path::PathBuf;
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "rewind-server")]
#[command(about = "Watch-progress tracking server with resume positions and completion state")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "REWIND_CONFIG")]
    config: Option<PathBuf>,

    /// Bind host, overriding the config file
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overriding the config file
    #[arg(long)]
    port: Option<u16>,

    /// JSON file of videos to register in the catalog at startup
    #[arg(long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("initializing tracing")?;

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let state = AppState::in_memory();
    if let Some(seed) = cli.seed.as_deref() {
        let raw = std::fs::read_to_string(seed)
            .with_context(|| format!("reading seed file {}", seed.display()))?;
        let entries: Vec<CreateVideoRequest> =
            serde_json::from_str(&raw).context("parsing seed file")?;
        let count = entries.len();
        for entry in entries {
            let mut video =
                rewind_model::Video::new(entry.title, entry.url, entry.duration_seconds);
            video.description = entry.description;
            video.thumbnail = entry.thumbnail;
            state.catalog.insert(video).await.map_err(|err| {
                anyhow::anyhow!("seeding catalog: {err}")
            })?;
        }
        info!(count, "seeded catalog from {}", seed.display());
    }

    let cors = match config.cors_origin.as_deref() {
        Some(origin) => CorsLayer::new().allow_origin(
            origin
                .parse::<HeaderValue>()
                .context("invalid cors_origin")?,
        ),
        None => CorsLayer::permissive(),
    };

    let app = routes::create_app(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {addr}");
    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}
