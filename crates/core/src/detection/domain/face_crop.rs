use ndarray::Array2;
use serde::Serialize;

use crate::shared::frame::Frame;

/// Where a face crop came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "frame", rename_all = "snake_case")]
pub enum FaceProvenance {
    Document,
    VideoFrame(usize),
}

/// A face normalised to the canonical square size.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceCrop {
    pub pixels: Frame,
    pub provenance: FaceProvenance,
}

impl FaceCrop {
    pub fn to_gray_matrix(&self) -> Array2<f64> {
        self.pixels.to_gray_matrix()
    }

    /// File name used when a sampled video crop is persisted.
    pub fn sample_file_name(&self) -> String {
        match self.provenance {
            FaceProvenance::Document => "face_document.jpg".to_string(),
            FaceProvenance::VideoFrame(index) => format!("face_{index}.jpg"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_file_name_uses_frame_index() {
        let crop = FaceCrop {
            pixels: Frame::new(vec![0; 4], 2, 2, 1, 42),
            provenance: FaceProvenance::VideoFrame(42),
        };
        assert_eq!(crop.sample_file_name(), "face_42.jpg");
    }

    #[test]
    fn test_provenance_serializes_tagged() {
        let json = serde_json::to_string(&FaceProvenance::VideoFrame(7)).unwrap();
        assert_eq!(json, r#"{"source":"video_frame","frame":7}"#);
        let json = serde_json::to_string(&FaceProvenance::Document).unwrap();
        assert_eq!(json, r#"{"source":"document"}"#);
    }
}
