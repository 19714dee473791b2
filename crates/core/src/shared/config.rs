use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::liveness::domain::ssim::WINDOW_SIZE;
use crate::shared::constants::CANONICAL_FACE_SIZE;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the verification pipeline.
///
/// Missing keys in a config file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Counter-clockwise rotations tried during OCR, in degrees.
    pub rotation_angles: Vec<i32>,
    /// Score bonus for the 0° candidate.
    pub canonical_orientation_bias: f64,
    pub bilateral_diameter: u32,
    pub bilateral_sigma_color: f64,
    pub bilateral_sigma_space: f64,
    pub face_canonical_size: u32,
    pub face_min_size: u32,
    /// Extra pixels kept around faces found in video frames.
    pub video_face_margin: u32,
    pub face_confidence: f64,
    pub max_hands: usize,
    pub hand_confidence: f64,
    pub max_digit: u8,
    pub pin_length: usize,
    pub liveness_threshold: f64,
    pub ocr_language: String,
    pub tessdata_dir: Option<PathBuf>,
    pub models_dir: Option<PathBuf>,
    pub model_base_url: Option<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            rotation_angles: vec![0, 90],
            canonical_orientation_bias: 10.0,
            bilateral_diameter: 9,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_space: 75.0,
            face_canonical_size: CANONICAL_FACE_SIZE,
            face_min_size: 50,
            video_face_margin: 50,
            face_confidence: 0.5,
            max_hands: 2,
            hand_confidence: 0.5,
            max_digit: 9,
            pin_length: 4,
            liveness_threshold: 0.1,
            ocr_language: "eng".to_string(),
            tessdata_dir: None,
            models_dir: None,
            model_base_url: None,
        }
    }
}

impl VerificationConfig {
    /// Platform config location: `<config_dir>/IdVerify/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("IdVerify").join("config.json"))
    }

    /// Loads configuration from `path`, or from the platform location when
    /// no path is given. Only an explicit path is required to exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(p) => Self::read(p)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => Self::read(&p)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rotation_angles.is_empty() {
            return Err(ConfigError::Invalid(
                "rotation_angles must not be empty".into(),
            ));
        }
        if (self.face_canonical_size as usize) < WINDOW_SIZE {
            return Err(ConfigError::Invalid(format!(
                "face_canonical_size must be at least {WINDOW_SIZE}, got {}",
                self.face_canonical_size
            )));
        }
        if self.bilateral_diameter == 0 {
            return Err(ConfigError::Invalid(
                "bilateral_diameter must be positive".into(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.liveness_threshold) {
            return Err(ConfigError::Invalid(format!(
                "liveness_threshold must be between -1.0 and 1.0, got {}",
                self.liveness_threshold
            )));
        }
        if self.max_digit > 9 {
            return Err(ConfigError::Invalid(format!(
                "max_digit must be at most 9, got {}",
                self.max_digit
            )));
        }
        if self.pin_length == 0 {
            return Err(ConfigError::Invalid("pin_length must be positive".into()));
        }
        if self.max_hands == 0 {
            return Err(ConfigError::Invalid("max_hands must be positive".into()));
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
