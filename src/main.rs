use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod chat;
mod config;
mod db;
mod error;
mod llm;
mod query;
mod schema;
mod util;
mod web;

use crate::config::{AppConfig, CliArgs};
use crate::db::PostgresConnector;
use crate::llm::Translator;
use crate::schema::{preset_schemas, SchemaRegistry};
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Credentials usually come from a local .env during development
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(args.log_format.unwrap_or_default());
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging
    init_tracing(config.logging.format);
    info!("Loaded configuration: {:?}", config);

    let registry = Arc::new(SchemaRegistry::new(preset_schemas())?);
    info!("Loaded {} preset schemas", registry.len());

    let connector = Arc::new(PostgresConnector::from_config(&config.database)?);

    info!("Initializing translator with backend: {}", config.llm.backend);
    let translator = Translator::new(&config.llm)?;

    let web_config = config.web.clone();
    let app_state = Arc::new(AppState::new(config, registry, connector, translator)?);

    // Start the web server
    info!("Starting NL2SQL chat on {}:{}", web_config.host, web_config.port);
    match web::run_server(web_config, app_state).await {
        Ok(()) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
