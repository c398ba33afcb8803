//! Layered configuration: built-in defaults, an optional TOML file, then
//! `MAILPILOT_`-prefixed environment variables (double underscore as the
//! section separator, e.g. `MAILPILOT_SERVER__PORT=8080`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiSettings {
    pub mistral_api_key: Option<String>,
    pub mistral_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub ai: AiSettings,
}

impl Settings {
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5001)?
            .set_default("ai.mistral_api_key", None::<String>)?
            .set_default("ai.mistral_model", "mistral-small-latest")?
            .set_default("ai.openai_api_key", None::<String>)?
            .set_default("ai.openai_model", "gpt-4o-mini")?;

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path.to_path_buf())),
            None => builder.add_source(File::with_name("mailpilot").required(false)),
        };

        builder
            .add_source(Environment::with_prefix("MAILPILOT").separator("__"))
            .build()?
            .try_deserialize()
    }
}
