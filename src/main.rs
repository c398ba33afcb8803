use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use mailpilot::api::{routes, AppState};
use mailpilot::config::Settings;
use mailpilot::services::ai::Orchestrator;

#[derive(Debug, Parser)]
#[command(name = "mailpilot-server", about = "Email backend with LLM assistance")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, env = "MAILPILOT_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address, overrides configuration
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides configuration
    #[arg(long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }

    let orchestrator = Orchestrator::from_settings(&settings.ai, reqwest::Client::new());
    let state = web::Data::new(AppState::new(orchestrator));

    info!("Starting server at http://{}:{}", settings.server.host, settings.server.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((settings.server.host.as_str(), settings.server.port))?
    .run()
    .await
}
