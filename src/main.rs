//! kex - knowledge extraction API server.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tokio::net::TcpListener;

use kex::agent::{AgentCli, AgentCliConfig};
use kex::api::{self, AppState};
use kex::config::AppConfig;
use kex::db::Database;
use kex::project::ProjectRepository;
use kex::session::SessionManager;

#[derive(Debug, Parser)]
#[command(name = "kex", about = "Knowledge extraction API server.", version)]
struct Cli {
    /// Host to bind (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides config).
    #[arg(long)]
    port: Option<u16>,

    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long)]
    json: bool,
}

fn init_logging(json: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kex=info,tower_http=info"));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .ok();
    }

    // Also init env_logger for compatibility with log crate users.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .ok();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json);

    let config = AppConfig::load(cli.config.as_deref())?;
    let host = cli.host.unwrap_or_else(|| config.server.host.clone());
    let port = cli.port.unwrap_or(config.server.port);

    let database = Database::new(Path::new(&config.database.path)).await?;
    let projects = Arc::new(ProjectRepository::new(database.pool().clone()));

    let agent = Arc::new(AgentCli::new(AgentCliConfig {
        executable: config.agent.executable.clone(),
        allowed_tools: config.agent.allowed_tools.clone(),
    }));

    let sessions = Arc::new(SessionManager::with_config(
        Duration::from_secs(config.session.timeout_minutes * 60),
        Duration::from_secs(config.session.cleanup_interval_seconds),
    ));
    sessions.clone().start_cleanup_task();

    let state = AppState::new(sessions.clone(), projects, agent);
    let app = api::create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("invalid address")?;

    info!("Listening on http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .context("binding to address")?;

    // Stop the reaper first, then drain the registry.
    let shutdown_sessions = sessions.clone();
    let shutdown_signal = async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        info!("Shutdown signal received, draining sessions...");
        shutdown_sessions.stop_cleanup_task().await;
        shutdown_sessions.close_all_sessions();
        info!("Shutdown complete");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("running server")?;

    Ok(())
}
