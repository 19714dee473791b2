//! BlazeFace face detector using ONNX Runtime via `ort`.
//!
//! Runs the MediaPipe short-range model (128×128 input, 896 anchors) and
//! returns one region per face after NMS.

use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::math::{nms, preprocess_nchw, RawDetection, SsdDecoder};
use crate::detection::infrastructure::onnx_session::load_session;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

/// Regressor values per anchor: box (4) + six keypoints (12).
const VALUES_PER_ANCHOR: usize = 16;

const NMS_IOU_THRESH: f64 = 0.3;

pub struct OnnxBlazefaceDetector {
    session: ort::session::Session,
    confidence: f64,
    decoder: SsdDecoder,
}

impl OnnxBlazefaceDetector {
    /// Load a BlazeFace ONNX model.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: load_session(model_path)?,
            confidence,
            decoder: SsdDecoder::new(INPUT_SIZE, VALUES_PER_ANCHOR),
        })
    }
}

impl FaceDetector for OnnxBlazefaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let fw = frame.width();
        let fh = frame.height();

        let input_tensor = preprocess_nchw(frame, INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // regressors: [1, 896, 16], classificators: [1, 896, 1]
        if outputs.len() < 2 {
            return Err(
                format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }

        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        let mut raw_dets = self
            .decoder
            .decode(reg_data, score_data, self.confidence, fw, fh);
        let filtered = nms(&mut raw_dets, NMS_IOU_THRESH);

        Ok(filtered.iter().map(|d| to_region(d, fw, fh)).collect())
    }
}

/// Integer region for a decoded box. Coordinates are already clamped to
/// the frame during decoding.
fn to_region(det: &RawDetection, frame_width: u32, frame_height: u32) -> Region {
    let x = det.x1 as i32;
    let y = det.y1 as i32;
    Region {
        x,
        y,
        width: (det.width() as i32).min(frame_width as i32 - x),
        height: (det.height() as i32).min(frame_height as i32 - y),
    }
}
