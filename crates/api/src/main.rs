//! ResearchBot API server binary.
//!
//! Usage:
//!   researchbot-api --config researchbot.toml
//!   researchbot-api --port 8080
//!   researchbot-api --port 8080 --bind 0.0.0.0
//!   researchbot-api --documents ./documents
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY` - Completion provider key (a `.env` file is honoured)
//! - `RESEARCHBOT_BIND_ADDR` - Server bind address (default: 127.0.0.1)
//! - `RUST_LOG` - Log filter

use researchbot_api::{AppState, serve};
use researchbot_coordinator::BotConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,researchbot_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut port: u16 = 8080;
    let mut config_path: Option<String> = None;
    let mut bind_addr: Option<String> = None;
    let mut documents_dir: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    port = args[i + 1]
                        .parse()
                        .map_err(|_| anyhow::anyhow!("Invalid port number: {}", args[i + 1]))?;
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--bind" | "-b" => {
                if i + 1 < args.len() {
                    bind_addr = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--documents" | "-d" => {
                if i + 1 < args.len() {
                    documents_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("ResearchBot API Server");
                println!();
                println!("Usage: researchbot-api [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --port <PORT>        Port to listen on (default: 8080)");
                println!(
                    "  -b, --bind <ADDR>        Bind address (default: 127.0.0.1, env: RESEARCHBOT_BIND_ADDR)"
                );
                println!("  -c, --config <FILE>      Path to researchbot.toml");
                println!("  -d, --documents <DIR>    Directory indexed at startup (default: ./documents)");
                println!("  -h, --help               Show this help message");
                println!();
                println!("Environment variables:");
                println!("  OPENAI_API_KEY           Completion provider API key");
                println!("  RESEARCHBOT_BIND_ADDR    Server bind address (overridden by --bind flag)");
                return Ok(());
            }
            other => {
                tracing::warn!(argument = %other, "Ignoring unknown argument");
            }
        }
        i += 1;
    }

    let host = bind_addr
        .or_else(|| std::env::var("RESEARCHBOT_BIND_ADDR").ok())
        .unwrap_or_else(|| "127.0.0.1".to_string());

    if host == "0.0.0.0" {
        tracing::warn!(
            "Server binding to 0.0.0.0. This exposes the API to all network interfaces; \
             make sure a firewall or reverse proxy is in place."
        );
    }

    let mut config = if let Some(path) = config_path {
        tracing::info!(path = %path, "Loading configuration");
        BotConfig::from_file(&path)?
    } else {
        tracing::info!("Using default configuration");
        BotConfig::default()
    };
    if let Some(dir) = documents_dir {
        config.knowledge.documents_dir = dir;
    }

    let state = AppState::from_config(config)?;

    match state.bot.index_configured_documents().await {
        Ok(report) => tracing::info!(
            files = report.files_indexed,
            chunks = report.chunks_indexed,
            "Indexed documents at startup"
        ),
        Err(e) => tracing::warn!(error = %e, "Startup indexing failed, continuing with an empty knowledge base"),
    }

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    serve(Arc::new(state), addr).await?;

    Ok(())
}
