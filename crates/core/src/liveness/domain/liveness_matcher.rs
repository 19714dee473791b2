use serde::Serialize;

use crate::detection::domain::face_crop::{FaceCrop, FaceProvenance};
use crate::liveness::domain::ssim::structural_similarity;
use crate::shared::error::VerificationError;

/// Result of comparing the live video against the reference face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LivenessVerdict {
    Passed,
    Failed,
    /// No sampled frame contained a face. Reported separately but never a pass.
    NoFaceSampled,
}

impl LivenessVerdict {
    pub fn passed(self) -> bool {
        self == LivenessVerdict::Passed
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleScore {
    pub provenance: FaceProvenance,
    pub score: f64,
    pub passed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LivenessReport {
    pub verdict: LivenessVerdict,
    pub scores: Vec<SampleScore>,
}

/// Compares sampled video faces to the document face with SSIM.
///
/// Every sample must reach `threshold`; one failing sample fails the video.
pub struct LivenessMatcher {
    threshold: f64,
}

impl LivenessMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn verify(
        &self,
        document: &FaceCrop,
        samples: &[FaceCrop],
    ) -> Result<LivenessReport, VerificationError> {
        if samples.is_empty() {
            log::warn!("No face found in any sampled video frame");
            return Ok(LivenessReport {
                verdict: LivenessVerdict::NoFaceSampled,
                scores: Vec::new(),
            });
        }

        let reference = document.to_gray_matrix();
        let (width, height) = (document.pixels.width(), document.pixels.height());

        let mut scores = Vec::with_capacity(samples.len());
        for sample in samples {
            let pixels = if (sample.pixels.width(), sample.pixels.height()) == (width, height) {
                sample.pixels.to_gray_matrix()
            } else {
                sample.pixels.resized(width, height).to_gray_matrix()
            };
            let score = structural_similarity(&reference, &pixels)
                .map_err(|e| VerificationError::FaceComparison(e.to_string()))?;
            let passed = score >= self.threshold;
            log::debug!(
                "Liveness sample {:?}: ssim {score:.4} ({})",
                sample.provenance,
                if passed { "pass" } else { "fail" }
            );
            scores.push(SampleScore {
                provenance: sample.provenance,
                score,
                passed,
            });
        }

        let verdict = if scores.iter().all(|s| s.passed) {
            LivenessVerdict::Passed
        } else {
            LivenessVerdict::Failed
        };
        log::info!("Liveness {verdict:?} over {} samples", scores.len());
        Ok(LivenessReport { verdict, scores })
    }
}
