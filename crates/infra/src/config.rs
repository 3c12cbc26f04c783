//! Configuration loading and representation.
//!
//! Settings come from environment variables with safe defaults:
//!
//! - `BOOKSTORE_STOCK_GUARD`: `conditional` (default) or `read-check-write`
//! - `BOOKSTORE_LOG_FORMAT`: `json` (default) or `pretty`

use core::str::FromStr;

use thiserror::Error;

use bookstore_observability::LogFormat;

pub const STOCK_GUARD_VAR: &str = "BOOKSTORE_STOCK_GUARD";
pub const LOG_FORMAT_VAR: &str = "BOOKSTORE_LOG_FORMAT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} (expected one of: {expected})")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// How the stock decrement is protected against concurrent orders.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StockGuard {
    /// Atomic "subtract where stock >= quantity"; a no-op means not enough stock.
    #[default]
    ConditionalUpdate,
    /// Read, compare, write. Only race-free inside a serializable unit of work.
    ReadCheckWrite,
}

impl FromStr for StockGuard {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conditional" | "conditional-update" => Ok(Self::ConditionalUpdate),
            "read-check-write" => Ok(Self::ReadCheckWrite),
            _ => Err(ConfigError::InvalidValue {
                var: STOCK_GUARD_VAR,
                value: s.to_string(),
                expected: "conditional, read-check-write",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceConfig {
    pub stock_guard: StockGuard,
    pub log_format: LogFormat,
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let stock_guard = match lookup(STOCK_GUARD_VAR) {
            Some(raw) => raw.parse::<StockGuard>()?,
            None => StockGuard::default(),
        };

        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => raw.parse::<LogFormat>().map_err(|_| ConfigError::InvalidValue {
                var: LOG_FORMAT_VAR,
                value: raw,
                expected: "json, pretty",
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            stock_guard,
            log_format,
        })
    }

    /// Install the process-wide tracing subscriber in the configured format.
    pub fn init_observability(&self) {
        bookstore_observability::init_with(self.log_format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.stock_guard, StockGuard::ConditionalUpdate);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn values_are_parsed_case_insensitively() {
        let cfg = ServiceConfig::from_lookup(lookup_from(&[
            (STOCK_GUARD_VAR, "Read-Check-Write"),
            (LOG_FORMAT_VAR, "PRETTY"),
        ]))
        .unwrap();
        assert_eq!(cfg.stock_guard, StockGuard::ReadCheckWrite);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn unknown_stock_guard_is_rejected() {
        let err = ServiceConfig::from_lookup(lookup_from(&[(STOCK_GUARD_VAR, "optimistic")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: STOCK_GUARD_VAR,
                value: "optimistic".to_string(),
                expected: "conditional, read-check-write",
            }
        );
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err =
            ServiceConfig::from_lookup(lookup_from(&[(LOG_FORMAT_VAR, "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: LOG_FORMAT_VAR, .. }));
    }
}
