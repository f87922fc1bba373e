use clap::Parser;
use dotenv::dotenv;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crondeck::db;
use crondeck::server::config::ServerConfig;
use crondeck::services::auth_service;
use crondeck::services::crontab_file::CrontabPublisher;
use crondeck::services::crontab_sync_service::CrontabSyncManager;
use crondeck::web;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an env-format configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging() {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily("logs", "crondeck.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    init_logging();
    info!("Starting crondeck");

    match &args.config {
        Some(path) => {
            dotenv::from_path(path)?;
        }
        None => {
            dotenv().ok();
        }
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Failed to load server configuration: {}", e);
            return Err(e.into());
        }
    };

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(5);
    let db_pool: DatabaseConnection = Database::connect(opt).await?;

    db::init_schema(&db_pool).await?;
    auth_service::ensure_default_user(
        &db_pool,
        &config.default_admin_username,
        &config.default_admin_password,
    )
    .await?;

    let publisher = CrontabPublisher::new(config.crontab_file.clone());
    let crontab_sync = CrontabSyncManager::new(db_pool.clone(), publisher, config.logs_dir.clone());

    // The file is a disposable projection of the store, so bring it up to
    // date at boot as well as after each mutation.
    if let Err(e) = crontab_sync.resync().await {
        warn!(error = %e, "Initial crontab regeneration failed; will retry on next mutation.");
    }

    let app = web::create_axum_router(db_pool, crontab_sync, config.clone());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(address = %config.listen_addr, "crondeck HTTP server listening");

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
