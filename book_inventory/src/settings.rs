use anyhow::Context;
use config::{Config, Environment};
use serde::Deserialize;

use crate::books_repository::PostgresBooksRepositoryConfig;

/// Process settings, read from environment variables (optionally from `.env` file)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub use_in_memory_db: bool,
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_pass: String,
    pub db_name: String,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::info!("Loaded environment from {}", path.display());
        }
        Self::from_source(Environment::default().try_parsing(true))
    }

    fn from_source(source: Environment) -> anyhow::Result<Self> {
        Config::builder()
            .set_default("port", 8888)?
            .set_default("use_in_memory_db", false)?
            .set_default("db_host", "127.0.0.1")?
            .set_default("db_port", 5432)?
            .set_default("db_user", "postgres")?
            .set_default("db_pass", "postgres")?
            .set_default("db_name", "postgres")?
            .add_source(source)
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn postgres_config(&self) -> PostgresBooksRepositoryConfig {
        PostgresBooksRepositoryConfig {
            hostname: self.db_host.clone(),
            port: self.db_port,
            username: self.db_user.clone(),
            password: self.db_pass.clone(),
            database: self.db_name.clone(),
        }
    }
}
