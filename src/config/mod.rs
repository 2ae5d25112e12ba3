use crate::ght::{MarkerColors, TemplateOrientation};
use crate::logging::LoggingConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub ght: GhtConfig,
    pub template: TemplateConfig,
    pub edge_detection: EdgeDetectionConfig,
    pub detection: DetectionConfig,
    pub logging: LoggingConfig,
}

/// Search ranges and quantization of the Hough accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhtConfig {
    /// Lowest template rotation searched, radians
    pub angle_min: f64,
    /// Highest template rotation searched, radians
    pub angle_max: f64,
    /// Smallest matched template width, pixels
    pub width_min: f64,
    /// Largest matched template width, pixels
    pub width_max: f64,
    pub width_step: f64,
    /// Side of one accumulator cell, pixels
    pub cell_size: u32,
    /// Orientation buckets over [-π/2, π/2]; rotation steps are π / intervals
    pub intervals: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TemplateConfig {
    pub markers: MarkerColors,
    pub orientation: TemplateOrientation,
}

/// Thresholds of the external edge detector that produces the edge image.
/// Stored and serialized with the rest of the configuration, never read by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeDetectionConfig {
    pub low_threshold: f64,
    pub high_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Detections below this vote fraction are reported as not found
    pub min_confidence: f64,
}

impl Default for GhtConfig {
    fn default() -> Self {
        Self {
            angle_min: -PI / 8.0,
            angle_max: PI / 8.0,
            width_min: 500.0,
            width_max: 2000.0,
            width_step: 50.0,
            cell_size: 4,
            intervals: 16,
        }
    }
}

impl Default for EdgeDetectionConfig {
    fn default() -> Self {
        Self {
            low_threshold: 30.0,
            high_threshold: 90.0,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { min_confidence: 0.05 }
    }
}

impl GhtConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.intervals == 0 {
            errors.push("intervals must be positive".to_string());
        }

        if self.cell_size == 0 {
            errors.push("cell_size must be positive".to_string());
        }

        if !(self.width_step > 0.0) {
            errors.push("width_step must be positive".to_string());
        }

        if !(self.width_min > 0.0) {
            errors.push("width_min must be positive".to_string());
        }

        if !(self.width_max >= self.width_min) {
            errors.push("width_max must not be below width_min".to_string());
        }

        for (name, angle) in [("angle_min", self.angle_min), ("angle_max", self.angle_max)] {
            if !(-PI..=PI).contains(&angle) {
                errors.push(format!("{} must lie in [-π, π], got {}", name, angle));
            }
        }

        if !(self.angle_max >= self.angle_min) {
            errors.push("angle_max must not be below angle_min".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Config {
    /// Load a JSON (content starting with `{`) or TOML configuration.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        if content.trim_start().starts_with('{') {
            serde_json::from_str(&content).with_context(|| format!("Invalid JSON config {}", path.display()))
        } else {
            toml::from_str(&content).with_context(|| format!("Invalid TOML config {}", path.display()))
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, format: ConfigFormat) -> crate::Result<()> {
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = self.ght.validate().err().unwrap_or_default();

        if let Err(e) = self.logging.validate() {
            errors.push(e);
        }

        if !(0.0..=1.0).contains(&self.detection.min_confidence) {
            errors.push("min_confidence must lie in [0, 1]".to_string());
        }

        if self.edge_detection.low_threshold > self.edge_detection.high_threshold {
            errors.push("edge low_threshold must not exceed high_threshold".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension; anything but `.json` is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

/// Load and validate `config_path`, falling back to defaults.
///
/// Runs before logging is set up, so problems go to stderr.
pub fn load_config_or_default(config_path: Option<&Path>) -> Config {
    let Some(path) = config_path else {
        return Config::default();
    };

    match Config::load_from_file(path) {
        Ok(config) => match config.validate() {
            Ok(()) => config,
            Err(errors) => {
                eprintln!("Configuration validation errors:");
                for error in errors {
                    eprintln!("  - {}", error);
                }
                eprintln!("Using default configuration instead.");
                Config::default()
            }
        },
        Err(e) => {
            eprintln!("Failed to load config from '{}': {:#}", path.display(), e);
            eprintln!("Using default configuration.");
            Config::default()
        }
    }
}
