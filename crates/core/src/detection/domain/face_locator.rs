use crate::detection::domain::face_crop::{FaceCrop, FaceProvenance};
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::error::VerificationError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Finds the dominant face in an image and normalises it to a square crop.
///
/// Absence of a face is a routine outcome and is reported as `Ok(None)`;
/// only detector failures are errors.
pub struct FaceLocator {
    detector: Box<dyn FaceDetector>,
    min_size: u32,
    canonical_size: u32,
}

impl FaceLocator {
    pub fn new(detector: Box<dyn FaceDetector>, min_size: u32, canonical_size: u32) -> Self {
        Self {
            detector,
            min_size,
            canonical_size,
        }
    }

    /// Largest face in `frame` (first wins ties), grown by `margin` pixels,
    /// clamped to the frame and resized to `canonical_size²`.
    pub fn locate(
        &mut self,
        frame: &Frame,
        provenance: FaceProvenance,
        margin: u32,
    ) -> Result<Option<FaceCrop>, VerificationError> {
        let regions = self
            .detector
            .detect(frame)
            .map_err(|e| VerificationError::Inference(e.to_string()))?;

        let Some(largest) = largest_face(&regions, self.min_size) else {
            log::debug!("No face found ({provenance:?})");
            return Ok(None);
        };

        let bounds = largest.expanded(margin as i32, frame.width(), frame.height());
        if bounds.area() == 0 {
            return Ok(None);
        }

        let pixels = frame
            .crop(&bounds)
            .resized(self.canonical_size, self.canonical_size);
        Ok(Some(FaceCrop { pixels, provenance }))
    }
}

fn largest_face(regions: &[Region], min_size: u32) -> Option<Region> {
    let min = min_size as i32;
    let mut best: Option<Region> = None;
    for region in regions
        .iter()
        .filter(|r| r.width >= min && r.height >= min)
    {
        if best.map_or(true, |b| region.area() > b.area()) {
            best = Some(*region);
        }
    }
    best
}
