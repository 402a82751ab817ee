//! Configuration management for vigil
//!
//! Handles loading and validation of vigil.toml configuration files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::logging::LogConfig;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Sampling settings
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a toml file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.sampling.validate()?;
        Ok(config)
    }
}

/// Sampling probabilities for the session decision.
///
/// Both rates are probabilities in `[0,1]`. `sample_rate` is the fraction of
/// sessions tracked at all; `resource_sample_rate` is the fraction of
/// *tracked* sessions that also collect resource telemetry. Validation
/// happens at load time only; the decision engine itself does not defend
/// against out-of-range values (below 0 never succeeds, above 1 always
/// succeeds).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Fraction of sessions tracked at all.
    #[serde(default = "default_rate")]
    pub sample_rate: f64,

    /// Fraction of tracked sessions that also collect resource telemetry.
    #[serde(default = "default_rate")]
    pub resource_sample_rate: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_rate(),
            resource_sample_rate: default_rate(),
        }
    }
}

fn default_rate() -> f64 {
    1.0
}

impl SamplingConfig {
    /// Check that both rates are within `[0,1]`.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for (name, value) in [
            ("sample_rate", self.sample_rate),
            ("resource_sample_rate", self.resource_sample_rate),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_track_everything() {
        let config = SamplingConfig::default();
        assert!((config.sample_rate - 1.0).abs() < f64::EPSILON);
        assert!((config.resource_sample_rate - 1.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_rates() {
        let config = SamplingConfig {
            sample_rate: 1.5,
            resource_sample_rate: 0.5,
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sample_rate"));

        let config = SamplingConfig {
            sample_rate: 0.5,
            resource_sample_rate: -0.1,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_nan() {
        let config = SamplingConfig {
            sample_rate: f64::NAN,
            resource_sample_rate: 0.5,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn boundary_rates_are_valid() {
        let config = SamplingConfig {
            sample_rate: 0.0,
            resource_sample_rate: 1.0,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[sampling]\nsample_rate = 0.25\nresource_sample_rate = 0.75\n"
        )
        .unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert!((config.sampling.sample_rate - 0.25).abs() < f64::EPSILON);
        assert!((config.sampling.resource_sample_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# empty config").unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert!((config.sampling.sample_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_file_value_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sampling]\nsample_rate = 2.0\n").unwrap();

        assert!(Config::load_from_path(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load_from_path("/nonexistent/vigil.toml").unwrap_err();
        assert!(err.to_string().contains("vigil.toml"));
    }
}
