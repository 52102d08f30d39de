//! configuration handed to the projection engine and the package writers
//!
//! Nothing in the crate reads module-level defaults: every tolerance, unit number
//! and heading comes from one of these structs. All of them can be read from a
//! JSON document with `serde_json`; missing fields take their defaults.

use crate::error::ConfigError;

use serde::{Deserialize, Serialize};

/// tolerance used for every coincidence and collinearity decision
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Settings for a single cross-section projection.
///
/// Deserializing checks the tolerance the same way [`ProjectionConfig::new`] does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProjectionConfig")]
pub struct ProjectionConfig {
    /// Distance (in model length units) below which two points are treated as
    /// coincident, and below which an intersection is treated as a single
    /// touching point rather than an overlap. Finite and positive.
    pub tolerance: f64,
}

impl ProjectionConfig {
    pub fn new(tolerance: f64) -> Result<Self, ConfigError> {
        let config = Self { tolerance };
        config.validate()?;
        Ok(config)
    }

    /// `tolerance` is a public field, so a config built by hand is checked again
    /// before it is used
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance.is_finite() && self.tolerance > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidTolerance(self.tolerance))
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawProjectionConfig {
    tolerance: f64,
}

impl Default for RawProjectionConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl TryFrom<RawProjectionConfig> for ProjectionConfig {
    type Error = ConfigError;

    fn try_from(raw: RawProjectionConfig) -> Result<Self, Self::Error> {
        Self::new(raw.tolerance)
    }
}

/// File level settings of a package: what it is called, which unit it is
/// written to, and the heading comment placed at the top of the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// short package type, e.g. `RCH`
    pub name: String,
    pub extension: String,
    pub unit_number: u32,
    pub heading: String,
}

impl PackageConfig {
    /// defaults for the recharge package
    pub fn recharge() -> Self {
        Self {
            name: "RCH".into(),
            extension: "rch".into(),
            unit_number: 19,
            heading: "# RCH package for MODFLOW-2005 generated by aquigrid".into(),
        }
    }

    /// file name for a model called `model_name`
    pub fn file_name(&self, model_name: &str) -> String {
        format!("{model_name}.{}", self.extension)
    }
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self::recharge()
    }
}

/// Bounds on the ratio of mean recharge to mean transmissivity. Ratios outside
/// of these bounds are flagged by [`Recharge::check`](`crate::package::Recharge::check`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckThresholds {
    pub rt_min: f64,
    pub rt_max: f64,
}

impl Default for CheckThresholds {
    fn default() -> Self {
        Self {
            rt_min: 2e-8,
            rt_max: 2e-4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config: ProjectionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ProjectionConfig::default());

        let thresholds: CheckThresholds = serde_json::from_str(r#"{"rt_max": 1e-3}"#).unwrap();
        assert_eq!(thresholds.rt_min, 2e-8);
        assert_eq!(thresholds.rt_max, 1e-3);
    }

    #[test]
    fn bad_tolerance_is_rejected() {
        for tolerance in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(ProjectionConfig::new(tolerance), Err(ConfigError::InvalidTolerance(_))),
                "{tolerance} was accepted"
            );
        }

        let result: Result<ProjectionConfig, _> = serde_json::from_str(r#"{"tolerance": -1.0}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("tolerance must be finite and positive"));

        let config: ProjectionConfig = serde_json::from_str(r#"{"tolerance": 1e-6}"#).unwrap();
        assert_eq!(config, ProjectionConfig::new(1e-6).unwrap());
    }

    #[test]
    fn package_file_name() {
        let config = PackageConfig::recharge();
        assert_eq!(config.file_name("model"), "model.rch");
        assert_eq!(config.unit_number, 19);
    }
}
