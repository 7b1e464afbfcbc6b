use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use reqcollector::api::routes;
use reqcollector::capture::manager::CaptureManager;
use reqcollector::capture::session::SessionHandle;
use reqcollector::models::config::AppConfig;
use reqcollector::models::filter::{FilterConfig, DEFAULT_FILE_TYPES};
use reqcollector::utils::logging;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Collects, filters and exports captured HTTP exchanges")]
struct Args {
    /// Address for the REST API server
    #[clap(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port for the REST API server
    #[clap(short, long, default_value = "3000")]
    port: u16,

    /// Default directory for exported .http files
    #[clap(short, long, default_value = "exports")]
    export_dir: PathBuf,

    /// File extensions enabled in the initial file-type filter
    #[clap(long, value_delimiter = ',')]
    file_types: Option<Vec<String>>,

    /// Capacity of the action queue feeding the session thread
    #[clap(long, default_value = "64")]
    queue_size: usize,

    /// Log level (trace, debug, info, warn, error, off)
    #[clap(long, default_value = "info")]
    log_level: String,
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger with specified level
    logging::init_logger(logging::get_log_level(&args.log_level));

    info!("Starting reqcollector v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig {
        bind: args.bind,
        port: args.port,
        export_dir: args.export_dir,
        file_types: args
            .file_types
            .unwrap_or_else(|| DEFAULT_FILE_TYPES.iter().map(|ext| ext.to_string()).collect()),
        queue_size: args.queue_size,
    };

    let filter = FilterConfig::with_file_types(&config.file_types)
        .context("invalid --file-types")?;

    // The session thread owns all capture state
    let manager = CaptureManager::new(config.clone(), filter);
    let (session, _session_thread) = SessionHandle::spawn(manager, config.queue_size)
        .context("failed to start session thread")?;

    let app_state = web::Data::new(session);

    info!(
        "Starting reqcollector API server on {}:{} (exports go to {})",
        config.bind,
        config.port,
        config.export_dir.display()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((config.bind.as_str(), config.port))?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
