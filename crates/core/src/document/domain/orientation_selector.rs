use serde::Serialize;

use crate::document::domain::text_recognizer::TextRecognizer;
use crate::document::domain::transcript_scorer::score_transcript;
use crate::imaging::bilateral_filter::bilateral_filter;
use crate::imaging::rotation::rotate_without_cropping;
use crate::shared::config::VerificationConfig;
use crate::shared::error::VerificationError;
use crate::shared::frame::Frame;

/// OCR result for one attempted orientation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OcrCandidate {
    pub rotation_angle: i32,
    pub transcript: String,
    pub score: f64,
}

/// Winning orientation plus every candidate that was scored.
#[derive(Clone, Debug)]
pub struct OcrSelection {
    pub candidates: Vec<OcrCandidate>,
    pub best_angle: i32,
    pub transcript: String,
    /// The original (colour, unfiltered) image rotated by `best_angle`.
    pub corrected_image: Frame,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PreprocessParams {
    pub diameter: u32,
    pub sigma_color: f64,
    pub sigma_space: f64,
}

/// Picks the document orientation whose OCR transcript scores best.
///
/// Preprocessing (grayscale + bilateral smoothing) runs once; each angle
/// rotates the preprocessed image onto an uncropped canvas and is OCR'd
/// exactly once. Angle 0 receives `canonical_bias` so it wins exact ties.
pub struct OrientationSelector {
    recognizer: Box<dyn TextRecognizer>,
    angles: Vec<i32>,
    canonical_bias: f64,
    preprocess: PreprocessParams,
}

impl OrientationSelector {
    pub fn new(
        recognizer: Box<dyn TextRecognizer>,
        angles: Vec<i32>,
        canonical_bias: f64,
        preprocess: PreprocessParams,
    ) -> Self {
        Self {
            recognizer,
            angles,
            canonical_bias,
            preprocess,
        }
    }

    pub fn from_config(recognizer: Box<dyn TextRecognizer>, config: &VerificationConfig) -> Self {
        Self::new(
            recognizer,
            config.rotation_angles.clone(),
            config.canonical_orientation_bias,
            PreprocessParams {
                diameter: config.bilateral_diameter,
                sigma_color: config.bilateral_sigma_color,
                sigma_space: config.bilateral_sigma_space,
            },
        )
    }

    pub fn select_best(&mut self, image: &Frame) -> Result<OcrSelection, VerificationError> {
        let preprocessed = bilateral_filter(
            &image.to_gray(),
            self.preprocess.diameter,
            self.preprocess.sigma_color,
            self.preprocess.sigma_space,
        );

        let mut candidates = Vec::with_capacity(self.angles.len());
        for &angle in &self.angles {
            let rotated = rotate_without_cropping(&preprocessed, angle);
            let fragments = self
                .recognizer
                .recognize(&rotated)
                .map_err(|e| VerificationError::Recognition(e.to_string()))?;
            let transcript = fragments.join(" ");

            let mut score = score_transcript(&transcript);
            if is_upright(angle) {
                score += self.canonical_bias;
            }
            log::debug!("Rotation {angle}°: score {score:.2}, text {transcript:?}");

            candidates.push(OcrCandidate {
                rotation_angle: angle,
                transcript,
                score,
            });
        }

        let best = pick_best(&candidates).ok_or(VerificationError::NoTextFound)?;
        let best_angle = best.rotation_angle;
        let transcript = best.transcript.clone();
        log::info!("Best rotation {best_angle}° (score {:.2})", best.score);

        Ok(OcrSelection {
            corrected_image: rotate_without_cropping(image, best_angle),
            best_angle,
            transcript,
            candidates,
        })
    }
}

/// Candidate with the highest score. An exact tie goes to the upright (0°)
/// candidate wherever it sits in the list, otherwise to the earlier one.
/// `None` when nothing beats negative infinity.
pub fn pick_best(candidates: &[OcrCandidate]) -> Option<&OcrCandidate> {
    let mut best: Option<&OcrCandidate> = None;
    let mut best_score = f64::NEG_INFINITY;
    for candidate in candidates {
        let wins_tie = candidate.score == best_score
            && is_upright(candidate.rotation_angle)
            && best.is_some_and(|b| !is_upright(b.rotation_angle));
        if candidate.score > best_score || wins_tie {
            best_score = candidate.score;
            best = Some(candidate);
        }
    }
    best
}

fn is_upright(angle: i32) -> bool {
    angle.rem_euclid(360) == 0
}
