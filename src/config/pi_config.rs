// src/config/pi_config.rs

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiConfig {
    /// Number of threads for parallel computation
    pub threads: Option<usize>,

    /// Logging level (error, warn, info, debug, trace)
    pub log_level: String,

    /// Track factorizations and cancel common factors between P and G
    pub factorization: bool,

    /// Series evaluation tuning
    pub tuning: TuningConfig,
}

/// Empirically tuned evaluation parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TuningConfig {
    /// Fraction of a term range given to the left half of a split
    pub split_ratio: f64,

    /// Recursion level (counted from the reduction root) at or beyond
    /// which common-factor cancellation runs
    pub gcd_min_level: u64,
}

impl Default for PiConfig {
    fn default() -> Self {
        PiConfig {
            threads: None, // Use Rayon's default
            log_level: "info".to_string(),
            factorization: true,
            tuning: TuningConfig::default(),
        }
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        TuningConfig {
            split_ratio: 0.5224,
            gcd_min_level: 4,
        }
    }
}

impl PiConfig {
    /// Load configuration with precedence: config file → env vars → defaults
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // Start with defaults
            .set_default("log_level", "info")?
            .set_default("factorization", true)?
            .set_default("tuning.split_ratio", 0.5224)?
            .set_default("tuning.gcd_min_level", 4)?;

        // Try to load from config files (TOML preferred, YAML fallback)
        if Path::new("pi.toml").exists() {
            builder = builder.add_source(File::with_name("pi.toml"));
        } else if Path::new("pi.yaml").exists() {
            builder = builder.add_source(File::with_name("pi.yaml"));
        }

        // Override with environment variables. Nested keys take a double
        // underscore (PI_TUNING__SPLIT_RATIO) so the single underscore in
        // flat keys like PI_LOG_LEVEL survives; the prefix keeps one.
        builder = builder.add_source(
            Environment::with_prefix("PI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: PiConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the tuning values against the ranges the evaluator supports.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.tuning.split_ratio;
        if !(0.5..=0.9).contains(&ratio) {
            return Err(ConfigError::Message(format!(
                "tuning.split_ratio {} outside the supported range [0.5, 0.9]",
                ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Tests that touch PI_* variables share the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = PiConfig::default();
        assert_eq!(config.threads, None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.factorization, true);
        assert_eq!(config.tuning.split_ratio, 0.5224);
        assert_eq!(config.tuning.gcd_min_level, 4);
    }

    #[test]
    fn test_load_without_file() {
        // Should successfully load defaults when no config file exists
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = PiConfig::load().unwrap_or_else(|_| PiConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides_apply() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("PI_LOG_LEVEL", "debug");
        env::set_var("PI_FACTORIZATION", "false");
        env::set_var("PI_TUNING__SPLIT_RATIO", "0.62");
        env::set_var("PI_TUNING__GCD_MIN_LEVEL", "7");

        let loaded = PiConfig::load();

        env::remove_var("PI_LOG_LEVEL");
        env::remove_var("PI_FACTORIZATION");
        env::remove_var("PI_TUNING__SPLIT_RATIO");
        env::remove_var("PI_TUNING__GCD_MIN_LEVEL");

        let config = loaded.unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(!config.factorization);
        assert_eq!(config.tuning.gcd_min_level, 7);
        assert!((config.tuning.split_ratio - 0.62).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_degenerate_ratio() {
        let mut config = PiConfig::default();
        config.tuning.split_ratio = 0.05;
        assert!(config.validate().is_err());
        config.tuning.split_ratio = 0.99;
        assert!(config.validate().is_err());
    }
}
