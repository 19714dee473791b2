use std::path::PathBuf;

use thiserror::Error;

use crate::shared::config::ConfigError;
use crate::shared::model_resolver::ModelResolveError;

/// Failures that abort a verification request.
///
/// A missing face is not represented here: face location reports absence
/// through `Option`, and liveness or PIN mismatches are ordinary results.
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("image {path} could not be read: {reason}")]
    ImageUnreadable { path: PathBuf, reason: String },
    #[error("no meaningful text found in document")]
    NoTextFound,
    #[error("video {path} could not be opened: {reason}")]
    VideoUnreadable { path: PathBuf, reason: String },
    #[error("reference face {0} is missing or unreadable")]
    ReferenceFaceUnavailable(PathBuf),
    #[error("invalid PIN: {0}")]
    InvalidPin(String),
    #[error("text recognition failed: {0}")]
    Recognition(String),
    #[error("model inference failed: {0}")]
    Inference(String),
    #[error("face comparison failed: {0}")]
    FaceComparison(String),
    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Model(#[from] ModelResolveError),
}

impl VerificationError {
    /// Short machine-readable tag used in serialized failure outcomes.
    pub fn kind(&self) -> &'static str {
        match self {
            VerificationError::ImageUnreadable { .. } => "image_unreadable",
            VerificationError::NoTextFound => "no_text_found",
            VerificationError::VideoUnreadable { .. } => "video_unreadable",
            VerificationError::ReferenceFaceUnavailable(_) => "reference_face_unavailable",
            VerificationError::InvalidPin(_) => "invalid_pin",
            VerificationError::Recognition(_) => "recognition",
            VerificationError::Inference(_) => "inference",
            VerificationError::FaceComparison(_) => "face_comparison",
            VerificationError::Write { .. } => "write",
            VerificationError::Io(_) => "io",
            VerificationError::Config(_) => "config",
            VerificationError::Model(_) => "model",
        }
    }
}
