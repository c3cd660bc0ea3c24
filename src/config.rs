//! Node configuration.
//!
//! Every field has a default so `StorageConfig::default()` yields a usable node.
//! Values can be loaded from JSON or from `USER_STORAGE_*` environment variables.

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// How the master reacts when replaying a write onto a replica fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplicationPolicy {
    /// Count and log the failure, keep fanning out to the replica.
    #[default]
    BestEffort,
    /// Mark the replica diverged and skip it until it is re-synced.
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Initial state of the logging decorator switch.
    pub logging_enabled: bool,
    pub replication: ReplicationPolicy,
    /// Smallest accepted age.
    pub min_age: i32,
    /// Largest accepted age, unbounded when `None`.
    pub max_age: Option<i32>,
    /// Refuse every write on the master.
    pub read_only: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            logging_enabled: true,
            replication: ReplicationPolicy::BestEffort,
            min_age: 1,
            max_age: None,
            read_only: false,
        }
    }
}

pub const ENV_LOGGING: &str = "USER_STORAGE_LOGGING";
pub const ENV_REPLICATION: &str = "USER_STORAGE_REPLICATION";
pub const ENV_MIN_AGE: &str = "USER_STORAGE_MIN_AGE";
pub const ENV_MAX_AGE: &str = "USER_STORAGE_MAX_AGE";
pub const ENV_READ_ONLY: &str = "USER_STORAGE_READ_ONLY";

impl StorageConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self =
            serde_json::from_str(json).context("invalid storage configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by whichever `USER_STORAGE_*` variables are set.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_LOGGING) {
            config.logging_enabled = parse_switch(&raw)
                .with_context(|| format!("{} must be a boolean, got {:?}", ENV_LOGGING, raw))?;
        }
        if let Some(raw) = lookup(ENV_REPLICATION) {
            config.replication = match raw.trim().to_ascii_lowercase().as_str() {
                "best_effort" | "best-effort" => ReplicationPolicy::BestEffort,
                "strict" => ReplicationPolicy::Strict,
                other => anyhow::bail!("unknown replication policy {:?}", other),
            };
        }
        if let Some(raw) = lookup(ENV_MIN_AGE) {
            config.min_age = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be an integer", ENV_MIN_AGE))?;
        }
        if let Some(raw) = lookup(ENV_MAX_AGE) {
            config.max_age = Some(
                raw.trim()
                    .parse()
                    .with_context(|| format!("{} must be an integer", ENV_MAX_AGE))?,
            );
        }
        if let Some(raw) = lookup(ENV_READ_ONLY) {
            config.read_only = parse_switch(&raw)
                .with_context(|| format!("{} must be a boolean, got {:?}", ENV_READ_ONLY, raw))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects age bounds that would admit ages below 1 or admit nothing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.min_age < 1 {
            anyhow::bail!("min_age must be at least 1, got {}", self.min_age);
        }
        if let Some(max) = self.max_age
            && max < self.min_age
        {
            anyhow::bail!("max_age {} is below min_age {}", max, self.min_age);
        }
        Ok(())
    }
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::default();
        assert!(config.logging_enabled);
        assert_eq!(config.replication, ReplicationPolicy::BestEffort);
        assert_eq!(config.min_age, 1);
        assert_eq!(config.max_age, None);
        assert!(!config.read_only);
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let config = StorageConfig::from_json(r#"{"replication": "strict", "max_age": 120}"#)
            .unwrap();
        assert_eq!(config.replication, ReplicationPolicy::Strict);
        assert_eq!(config.max_age, Some(120));
        assert!(config.logging_enabled);
        assert_eq!(config.min_age, 1);
    }

    #[test]
    fn test_from_json_rejects_unknown_policy() {
        assert!(StorageConfig::from_json(r#"{"replication": "eventual"}"#).is_err());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_LOGGING, "off"),
            (ENV_REPLICATION, "strict"),
            (ENV_MIN_AGE, "18"),
        ]);
        let config =
            StorageConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert!(!config.logging_enabled);
        assert_eq!(config.replication, ReplicationPolicy::Strict);
        assert_eq!(config.min_age, 18);
        assert_eq!(config.max_age, None);
    }

    #[test]
    fn test_from_json_rejects_age_below_one() {
        assert!(StorageConfig::from_json(r#"{"min_age": 0}"#).is_err());
        assert!(StorageConfig::from_json(r#"{"min_age": -5}"#).is_err());
    }

    #[test]
    fn test_from_json_rejects_inverted_age_bounds() {
        let err = StorageConfig::from_json(r#"{"min_age": 50, "max_age": 10}"#).unwrap_err();
        assert!(err.to_string().contains("max_age"), "{:#}", err);

        // A single admissible age is fine
        let config = StorageConfig::from_json(r#"{"min_age": 18, "max_age": 18}"#).unwrap();
        assert_eq!(config.max_age, Some(18));
    }

    #[test]
    fn test_from_lookup_rejects_invalid_age_bounds() {
        let zero: HashMap<&str, &str> = HashMap::from([(ENV_MIN_AGE, "0")]);
        assert!(StorageConfig::from_lookup(|key| zero.get(key).map(|v| v.to_string())).is_err());

        let inverted: HashMap<&str, &str> =
            HashMap::from([(ENV_MIN_AGE, "30"), (ENV_MAX_AGE, "20")]);
        assert!(
            StorageConfig::from_lookup(|key| inverted.get(key).map(|v| v.to_string())).is_err()
        );
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let result = StorageConfig::from_lookup(|key| {
            (key == ENV_LOGGING).then(|| "maybe".to_string())
        });
        assert!(result.is_err());
    }
}
