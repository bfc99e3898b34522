//! Engine configuration
//!
//! Layered with figment, later layers winning:
//! 1. Built-in defaults
//! 2. An optional TOML file
//! 3. `SKIRMISH_*` environment variables, `__` separating nested keys
//!    (e.g. `SKIRMISH_RULES__NATURAL_TWENTY_ALWAYS_HITS=true`)

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::combat::CombatRules;
use crate::dice::{entropy_source, seeded_source, Dice, DEFAULT_HISTORY_CAPACITY};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "SKIRMISH_";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("history_capacity must be at least 1")]
    ZeroHistoryCapacity,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How many rolls the dice log keeps
    pub history_capacity: usize,
    /// Seed for reproducible fights; OS entropy when unset
    pub seed: Option<u64>,
    /// Attack house rules
    pub rules: CombatRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            seed: None,
            rules: CombatRules::default(),
        }
    }
}

impl Config {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            debug!("loading config from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and validate a configuration from any figment
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        Ok(())
    }

    /// Build the dice engine this configuration describes
    pub fn dice(&self) -> Dice {
        match self.seed {
            Some(seed) => Dice::with_source(seeded_source(seed), self.history_capacity),
            None => Dice::with_source(entropy_source(), self.history_capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_figment(Figment::from(Serialized::defaults(Config::default())))
            .unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.history_capacity, 1000);
        assert_eq!(config.seed, None);
        assert!(!config.rules.natural_twenty_always_hits);
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "history_capacity = 50\nseed = 42\n\n[rules]\nnatural_one_always_misses = true"
        )
        .unwrap();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file.path()));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.seed, Some(42));
        assert!(config.rules.natural_one_always_misses);
        assert!(!config.rules.critical_hits_double_dice, "unset rules keep defaults");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string("history_capacity = 0"));
        let err = Config::from_figment(figment).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroHistoryCapacity));
    }

    #[test]
    fn test_bad_type_rejected() {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string("seed = \"lots\""));
        assert!(matches!(
            Config::from_figment(figment),
            Err(ConfigError::Figment(_))
        ));
    }

    #[test]
    fn test_seeded_dice_repeat() {
        let config = Config {
            seed: Some(7),
            history_capacity: 5,
            ..Config::default()
        };
        let a = config.dice();
        let b = config.dice();
        for _ in 0..20 {
            assert_eq!(a.roll(20).unwrap(), b.roll(20).unwrap());
        }
        assert_eq!(a.history_capacity(), 5);
        assert_eq!(a.history_size(), 5);
    }
}
