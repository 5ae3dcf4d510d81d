use crate::Result;

use serde::{Deserialize, Deserializer};
use std::{str::FromStr, time::Duration};

/// Engine settings. Durations are expressed in milliseconds when
/// deserialized or read from the environment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hard cap on the rows a single query returns, whatever a view allows.
    pub max_rows: u64,

    /// Most clauses a view or an ad-hoc filter may carry.
    pub max_filters: usize,

    /// Applied to each store query.
    #[serde(deserialize_with = "millis")]
    pub query_timeout: Duration,

    /// How long a cached metadata snapshot is served before reloading.
    #[serde(deserialize_with = "millis")]
    pub cache_ttl: Duration,

    /// Per snapshot kind.
    pub cache_max_entries: usize,

    /// Defaults to the pool's own sizing.
    pub pool_max_size: Option<usize>,
}

impl Config {
    /// Reads `WARDEN_*` environment variables on top of the defaults.
    pub fn from_env() -> Result<Config> {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let mut config = Config::default();

        if let Some(value) = parse(&lookup, "WARDEN_MAX_ROWS")? {
            config.max_rows = value;
        }

        if let Some(value) = parse(&lookup, "WARDEN_MAX_FILTERS")? {
            config.max_filters = value;
        }

        if let Some(value) = parse(&lookup, "WARDEN_QUERY_TIMEOUT_MS")? {
            config.query_timeout = Duration::from_millis(value);
        }

        if let Some(value) = parse(&lookup, "WARDEN_CACHE_TTL_MS")? {
            config.cache_ttl = Duration::from_millis(value);
        }

        if let Some(value) = parse(&lookup, "WARDEN_CACHE_MAX_ENTRIES")? {
            config.cache_max_entries = value;
        }

        if let Some(value) = parse(&lookup, "WARDEN_POOL_MAX_SIZE")? {
            config.pool_max_size = Some(value);
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_rows: 1000,
            max_filters: 20,
            query_timeout: Duration::from_millis(5000),
            cache_ttl: Duration::from_millis(30_000),
            cache_max_entries: 1024,
            pool_max_size: None,
        }
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };

    raw.trim()
        .parse()
        .map(Some)
        .map_err(|err| warden_core::err!("invalid value for {name}: {err}"))
}

fn millis<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> core::result::Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}
