// Database configuration from the process environment.
//
// Responsibilities
// - Load an optional .env file, then read DB_HOST, DB_PORT, DB_USER, DB_PASS and DB_NAME.
// - Fall back to the local defaults for every variable that is unset.
//
// Testing guidance
// - Use db_config_from_lookup with a map-backed closure instead of mutating the process environment.

use crate::adapters::mysql::mysql_config::DbConfig;
use anyhow::Context;

pub const DB_HOST: &str = "DB_HOST";
pub const DB_PORT: &str = "DB_PORT";
pub const DB_USER: &str = "DB_USER";
pub const DB_PASS: &str = "DB_PASS";
pub const DB_NAME: &str = "DB_NAME";

pub fn db_config_from_env() -> anyhow::Result<DbConfig> {
    dotenvy::dotenv().ok();
    db_config_from_lookup(|key| std::env::var(key).ok())
}

pub fn db_config_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<DbConfig> {
    let defaults = DbConfig::default();

    let port = match lookup(DB_PORT) {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .with_context(|| format!("{DB_PORT} must be a port number, got {raw:?}"))?,
        None => defaults.port,
    };

    Ok(DbConfig {
        host: lookup(DB_HOST).unwrap_or(defaults.host),
        port,
        user: lookup(DB_USER).unwrap_or(defaults.user),
        password: lookup(DB_PASS).unwrap_or(defaults.password),
        database: lookup(DB_NAME).unwrap_or(defaults.database),
    })
}
