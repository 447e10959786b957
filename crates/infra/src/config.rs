//! Runtime configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `FULFILMENT_LOG` | `info` |
//! | `FULFILMENT_LOCATIONS` | built-in catalogue, format `ID=MAX,ID=MAX` |
//! | `FULFILMENT_DEFAULT_PAGE_SIZE` | `10` |
//! | `FULFILMENT_MAX_PAGE_SIZE` | `100` |
//! | `FULFILMENT_NOTIFIER_TICK_MS` | `250` |

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use fulfilment_warehouses::{Location, StaticLocationPolicy};

use crate::search::PageLimits;

pub const LOG_VAR: &str = "FULFILMENT_LOG";
pub const LOCATIONS_VAR: &str = "FULFILMENT_LOCATIONS";
pub const DEFAULT_PAGE_SIZE_VAR: &str = "FULFILMENT_DEFAULT_PAGE_SIZE";
pub const MAX_PAGE_SIZE_VAR: &str = "FULFILMENT_MAX_PAGE_SIZE";
pub const NOTIFIER_TICK_VAR: &str = "FULFILMENT_NOTIFIER_TICK_MS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfilmentConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub log_filter: String,
    pub locations: StaticLocationPolicy,
    pub page_limits: PageLimits,
    pub notifier_tick: Duration,
}

impl Default for FulfilmentConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            locations: StaticLocationPolicy::default_catalogue(),
            page_limits: PageLimits::default(),
            notifier_tick: Duration::from_millis(250),
        }
    }
}

impl FulfilmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(filter) = get(LOG_VAR) {
            config.log_filter = filter.trim().to_string();
        }
        if let Some(raw) = get(LOCATIONS_VAR) {
            config.locations = parse_locations(&raw)?;
        }
        if let Some(raw) = get(DEFAULT_PAGE_SIZE_VAR) {
            config.page_limits.default_page_size = parse_positive(DEFAULT_PAGE_SIZE_VAR, &raw)?;
        }
        if let Some(raw) = get(MAX_PAGE_SIZE_VAR) {
            config.page_limits.max_page_size = parse_positive(MAX_PAGE_SIZE_VAR, &raw)?;
        }
        if let Some(raw) = get(NOTIFIER_TICK_VAR) {
            config.notifier_tick = Duration::from_millis(parse_positive(NOTIFIER_TICK_VAR, &raw)?);
        }

        if config.page_limits.default_page_size > config.page_limits.max_page_size {
            return Err(ConfigError::invalid(
                DEFAULT_PAGE_SIZE_VAR,
                &config.page_limits.default_page_size.to_string(),
                format!("exceeds {MAX_PAGE_SIZE_VAR} ({})", config.page_limits.max_page_size),
            ));
        }

        Ok(config)
    }
}

/// Parse `ID=MAX,ID=MAX` into a location catalogue.
pub fn parse_locations(raw: &str) -> Result<StaticLocationPolicy, ConfigError> {
    let mut locations = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (id, max) = entry
            .split_once('=')
            .ok_or_else(|| ConfigError::invalid(LOCATIONS_VAR, entry, "expected ID=MAX"))?;
        let id = id.trim();
        if id.is_empty() {
            return Err(ConfigError::invalid(LOCATIONS_VAR, entry, "empty location id"));
        }
        let max: i64 = max
            .trim()
            .parse()
            .map_err(|e| ConfigError::invalid(LOCATIONS_VAR, entry, format!("{e}")))?;
        if max < 0 {
            return Err(ConfigError::invalid(LOCATIONS_VAR, entry, "max capacity must be non-negative"));
        }
        locations.push(Location::new(id, max));
    }

    if locations.is_empty() {
        return Err(ConfigError::invalid(LOCATIONS_VAR, raw, "no locations"));
    }
    Ok(StaticLocationPolicy::new(locations))
}

fn parse_positive<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let value: T = raw
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(var, raw, e.to_string()))?;
    if value <= T::default() {
        return Err(ConfigError::invalid(var, raw, "must be greater than zero"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use fulfilment_warehouses::LocationPolicy;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = FulfilmentConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, FulfilmentConfig::default());
        assert_eq!(config.locations.resolve("VETSBY-001").unwrap().max_capacity, 90);
        assert_eq!(config.notifier_tick, Duration::from_millis(250));
    }

    #[test]
    fn every_variable_is_read() {
        let config = FulfilmentConfig::from_lookup(lookup(&[
            (LOG_VAR, "fulfilment_infra=debug"),
            (LOCATIONS_VAR, "DEPOT-1=10, DEPOT-2 = 25"),
            (DEFAULT_PAGE_SIZE_VAR, "5"),
            (MAX_PAGE_SIZE_VAR, "20"),
            (NOTIFIER_TICK_VAR, "50"),
        ]))
        .unwrap();

        assert_eq!(config.log_filter, "fulfilment_infra=debug");
        assert_eq!(config.locations.len(), 2);
        assert_eq!(config.locations.resolve("DEPOT-2").unwrap().max_capacity, 25);
        assert!(config.locations.resolve("ZWOLLE-001").is_none());
        assert_eq!(config.page_limits, PageLimits { default_page_size: 5, max_page_size: 20 });
        assert_eq!(config.notifier_tick, Duration::from_millis(50));
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let cases = [
            (LOCATIONS_VAR, "DEPOT-1"),
            (LOCATIONS_VAR, "DEPOT-1=lots"),
            (LOCATIONS_VAR, "=10"),
            (LOCATIONS_VAR, "DEPOT-1=-4"),
            (DEFAULT_PAGE_SIZE_VAR, "0"),
            (MAX_PAGE_SIZE_VAR, "many"),
            (NOTIFIER_TICK_VAR, "-1"),
        ];
        for (var, value) in cases {
            let err = FulfilmentConfig::from_lookup(lookup(&[(var, value)])).unwrap_err();
            assert!(err.to_string().starts_with(var), "{var}={value}: {err}");
        }
    }

    #[test]
    fn default_page_size_cannot_exceed_max() {
        let err = FulfilmentConfig::from_lookup(lookup(&[
            (DEFAULT_PAGE_SIZE_VAR, "50"),
            (MAX_PAGE_SIZE_VAR, "20"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(MAX_PAGE_SIZE_VAR));
    }

    #[test]
    fn blank_values_keep_defaults() {
        let config = FulfilmentConfig::from_lookup(lookup(&[(LOCATIONS_VAR, "  ")])).unwrap();
        assert_eq!(config.locations, StaticLocationPolicy::default_catalogue());
    }
}
