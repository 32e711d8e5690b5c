//! Engine configuration: tolerances, pick radii and tool defaults.

use crate::kernel::EpsPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Tunables for the interactive engine.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Kernel tolerances.
    pub eps: EpsPolicy,
    /// Spatial grid cell size in world units.
    pub cell_size: f64,
    /// Pick radius in screen pixels.
    pub hit_radius_px: f64,
    /// Optional snap capture radius in screen pixels; `None` snaps at any distance.
    pub snap_radius_px: Option<f64>,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom multiplier per wheel step.
    pub wheel_zoom_factor: f64,
    /// Angle increment used by Shift-snapping and angle locks, in degrees.
    pub angle_snap_degrees: f64,
    pub default_offset_distance: f64,
    pub default_fillet_radius: f64,
    pub default_chamfer_distance: f64,
    /// Total instances created by the pattern tool when no count is typed.
    pub default_pattern_count: u32,
    /// Largest total instance count the pattern tool accepts.
    pub max_pattern_count: u32,
    /// Step between pattern instances, in world units.
    pub pattern_step: (f64, f64),
    /// Number of kernel failure messages retained.
    pub reason_log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            eps: EpsPolicy::default(),
            cell_size: 64.0,
            hit_radius_px: 8.0,
            snap_radius_px: None,
            min_zoom: 0.05,
            max_zoom: 100.0,
            wheel_zoom_factor: 1.1,
            angle_snap_degrees: 15.0,
            default_offset_distance: 10.0,
            default_fillet_radius: 5.0,
            default_chamfer_distance: 5.0,
            default_pattern_count: 3,
            max_pattern_count: 1000,
            pattern_step: (10.0, 0.0),
            reason_log_capacity: 200,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("cell_size", self.cell_size),
            ("hit_radius_px", self.hit_radius_px),
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("angle_snap_degrees", self.angle_snap_degrees),
            ("eps.eq_dist", self.eps.eq_dist),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.default_pattern_count < 2 || self.default_pattern_count > self.max_pattern_count {
            return Err(ConfigError::Invalid(format!(
                "default_pattern_count {} must be between 2 and max_pattern_count {}",
                self.default_pattern_count, self.max_pattern_count
            )));
        }
        if !self.wheel_zoom_factor.is_finite() || self.wheel_zoom_factor <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "wheel_zoom_factor must be greater than 1, got {}",
                self.wheel_zoom_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!((config.cell_size - 64.0).abs() < f64::EPSILON);
        assert!((config.hit_radius_px - 8.0).abs() < f64::EPSILON);
        assert_eq!(config.default_pattern_count, 3);
        assert_eq!(config.reason_log_capacity, 200);
        assert!(config.snap_radius_px.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json(r#"{"hit_radius_px": 12, "eps": {"eq_dist": 0.001}}"#).unwrap();
        assert!((config.hit_radius_px - 12.0).abs() < f64::EPSILON);
        assert!((config.eps.eq_dist - 0.001).abs() < f64::EPSILON);
        assert!((config.eps.intersect_tol - 1e-6).abs() < f64::EPSILON);
        assert!((config.max_zoom - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"cell_size": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"min_zoom": 5, "max_zoom": 1}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"wheel_zoom_factor": 1.0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"default_pattern_count": 5, "max_pattern_count": 4}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(EngineConfig::from_json("{not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
