use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Finds candidate face boxes in a frame, in frame pixel coordinates.
///
/// `&mut self` because inference sessions need mutable access.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
