//! Runtime parameters, read once from the environment.

use log::warn;
use std::{str::FromStr, sync::OnceLock, time::Duration};

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_DB_MAX_CONNECTIONS: &str = "CATALOGD_DB_MAX_CONNECTIONS";
pub const ENV_UPDATE_TIMEOUT_MS: &str = "CATALOGD_UPDATE_TIMEOUT_MS";

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;

#[derive(Debug, Clone)]
pub struct Configurables {
    /// Postgres connection string, required unless the memory backend is used
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Upper bound on how long the action boundary waits for an update.
    /// [`None`] waits for the coordinator to settle.
    pub update_timeout: Option<Duration>,
}

impl Default for Configurables {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            update_timeout: None,
        }
    }
}

impl Configurables {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_url: lookup(ENV_DATABASE_URL).filter(|v| !v.trim().is_empty()),
            db_max_connections: parse_or(
                ENV_DB_MAX_CONNECTIONS,
                lookup(ENV_DB_MAX_CONNECTIONS),
                defaults.db_max_connections,
            ),
            update_timeout: lookup(ENV_UPDATE_TIMEOUT_MS)
                .and_then(|v| parse::<u64>(ENV_UPDATE_TIMEOUT_MS, &v))
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
        }
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Option<T> {
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        warn!("ignoring invalid value `{}` for {}", value, key);
    }
    parsed
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> T {
    value.and_then(|v| parse(key, &v)).unwrap_or(default)
}

static CONFIGURABLES: OnceLock<Configurables> = OnceLock::new();

/// Process-wide parameters, read from the environment on first access.
pub fn configurables() -> &'static Configurables {
    CONFIGURABLES.get_or_init(Configurables::from_env)
}
