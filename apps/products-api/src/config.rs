//! Configuration for Products API

use core_config::{AppInfo, FromEnv, app_info, audit::AuditConfig, env_flag, server::ServerConfig};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub audit: AuditConfig,
    /// Apply pending migrations before serving (`RUN_MIGRATIONS`, default on)
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            database: PostgresConfig::from_env()?,
            audit: AuditConfig::from_env()?,
            run_migrations: env_flag("RUN_MIGRATIONS", true)?,
        })
    }
}
