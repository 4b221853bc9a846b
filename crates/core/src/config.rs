//! Session configuration
//!
//! Zoom bounds, symbol sizing and upload rules. Configuration can be loaded
//! from a JSON file, from environment variables, or built programmatically.

use std::fs;
use std::io;
use std::path::Path;

/// Configuration for a takeoff session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TakeoffConfig {
    /// Smallest zoom factor
    pub min_scale: f32,
    /// Largest zoom factor
    pub max_scale: f32,
    /// Zoom factor added or removed per zoom step
    pub zoom_step: f32,
    /// Marker size in pixels used when a symbol is created without one
    pub default_symbol_size: f32,
    /// Smallest marker size in pixels
    pub min_symbol_size: f32,
    /// Largest marker size in pixels
    pub max_symbol_size: f32,
    /// Longest accepted symbol name, in characters
    pub max_symbol_name_len: usize,
    /// MIME types accepted as documents
    pub accepted_mime_types: Vec<String>,
}

impl Default for TakeoffConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 2.5,
            zoom_step: 0.1,
            default_symbol_size: 24.0,
            min_symbol_size: 12.0,
            max_symbol_size: 48.0,
            max_symbol_name_len: 50,
            accepted_mime_types: vec!["application/pdf".to_string()],
        }
    }
}

impl TakeoffConfig {
    /// Sets the zoom bounds.
    pub fn with_scale_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_scale = min;
        self.max_scale = max;
        self
    }

    /// Sets the zoom step.
    pub fn with_zoom_step(mut self, step: f32) -> Self {
        self.zoom_step = step;
        self
    }

    /// Sets the marker size bounds.
    pub fn with_symbol_size_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_symbol_size = min;
        self.max_symbol_size = max;
        self
    }

    /// Sets the default marker size.
    pub fn with_default_symbol_size(mut self, size: f32) -> Self {
        self.default_symbol_size = size;
        self
    }

    /// Clamps a zoom factor to the configured bounds.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        if scale.is_nan() {
            return self.min_scale;
        }
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Clamps a marker size to the configured bounds.
    pub fn clamp_symbol_size(&self, size: f32) -> f32 {
        if size.is_nan() {
            return self.default_symbol_size;
        }
        size.clamp(self.min_symbol_size, self.max_symbol_size)
    }

    /// Returns true if documents of this MIME type may be loaded.
    ///
    /// Comparison ignores case and any parameters after `;`.
    pub fn accepts_mime_type(&self, mime_type: &str) -> bool {
        let essence = mime_type.split(';').next().unwrap_or("").trim();
        self.accepted_mime_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(essence))
    }

    /// Checks that bounds are ordered and positive.
    ///
    /// # Errors
    /// Returns the name of the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
            return Err(ConfigError::InvalidValue("min_scale".to_string()));
        }
        if !(self.zoom_step > 0.0) {
            return Err(ConfigError::InvalidValue("zoom_step".to_string()));
        }
        if !(self.min_symbol_size > 0.0 && self.min_symbol_size <= self.max_symbol_size) {
            return Err(ConfigError::InvalidValue("min_symbol_size".to_string()));
        }
        if !(self.default_symbol_size >= self.min_symbol_size
            && self.default_symbol_size <= self.max_symbol_size)
        {
            return Err(ConfigError::InvalidValue("default_symbol_size".to_string()));
        }
        if self.max_symbol_name_len == 0 {
            return Err(ConfigError::InvalidValue("max_symbol_name_len".to_string()));
        }
        Ok(())
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TAKEOFF_MIN_SCALE`: smallest zoom factor (default: 0.5)
    /// - `TAKEOFF_MAX_SCALE`: largest zoom factor (default: 2.5)
    /// - `TAKEOFF_ZOOM_STEP`: zoom step (default: 0.1)
    /// - `TAKEOFF_DEFAULT_SYMBOL_SIZE`: default marker size (default: 24)
    ///
    /// # Errors
    /// Returns an error if any variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = env_f32("TAKEOFF_MIN_SCALE")? {
            config.min_scale = value;
        }
        if let Some(value) = env_f32("TAKEOFF_MAX_SCALE")? {
            config.max_scale = value;
        }
        if let Some(value) = env_f32("TAKEOFF_ZOOM_STEP")? {
            config.zoom_step = value;
        }
        if let Some(value) = env_f32("TAKEOFF_DEFAULT_SYMBOL_SIZE")? {
            config.default_symbol_size = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(ConfigError::IoError)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json).map_err(ConfigError::IoError)
    }
}

fn env_f32(key: &str) -> Result<Option<f32>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<f32>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(None),
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for configuration key: {0}")]
    InvalidValue(String),

    #[error("I/O error: {0}")]
    IoError(#[source] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
