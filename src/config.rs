use std::{env, path::PathBuf};
use tracing::warn;

/// What a store does when its persisted payload cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptPolicy {
    /// Log the failure and behave as if nothing was stored.
    #[default]
    UseDefault,
    /// Surface `StoreError::Corrupt` to the caller.
    Fail,
}

impl CorruptPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" | "use_default" => Some(Self::UseDefault),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub minimum_duration_secs: u64,
    pub on_corrupt: CorruptPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("data"),
            minimum_duration_secs: 1,
            on_corrupt: CorruptPolicy::UseDefault,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source; unparsable values
    /// fall back to the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = parse_or("PORT", lookup("PORT"), defaults.port, |v| v.parse().ok());
        let data_dir = lookup("APP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let minimum_duration_secs = parse_or(
            "MIN_DURATION_SECS",
            lookup("MIN_DURATION_SECS"),
            defaults.minimum_duration_secs,
            |v| v.parse().ok(),
        );
        let on_corrupt = parse_or(
            "ON_CORRUPT",
            lookup("ON_CORRUPT"),
            defaults.on_corrupt,
            CorruptPolicy::parse,
        );

        Self {
            port,
            data_dir,
            minimum_duration_secs,
            on_corrupt,
        }
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T, parse: impl Fn(&str) -> Option<T>) -> T {
    match raw {
        None => default,
        Some(value) => parse(value.trim()).unwrap_or_else(|| {
            warn!("ignoring invalid {name}={value:?}");
            default
        }),
    }
}
