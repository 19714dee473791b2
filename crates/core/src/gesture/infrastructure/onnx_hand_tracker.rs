//! Two-stage MediaPipe hand tracker on ONNX Runtime.
//!
//! Stage one runs the palm detector (192×192, 2016 anchors) over the whole
//! frame. Stage two crops an axis-aligned square around each palm, grown to
//! cover the fingers, and runs the 21-point hand-landmark model (224×224).

use std::path::Path;

use crate::detection::infrastructure::math::{nms, preprocess_nchw, RawDetection, SsdDecoder};
use crate::detection::infrastructure::onnx_session::load_session;
use crate::gesture::domain::hand_tracker::{HandLandmarks, HandTracker, Handedness, Landmark};
use crate::shared::constants::HAND_LANDMARK_COUNT;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

const PALM_INPUT_SIZE: u32 = 192;
/// Box (4) + seven palm keypoints (14).
const PALM_VALUES_PER_ANCHOR: usize = 18;
const PALM_NMS_IOU: f64 = 0.3;

const LANDMARK_INPUT_SIZE: u32 = 224;

/// The palm box covers only the palm; the hand crop is this much larger.
const HAND_CROP_SCALE: f64 = 2.6;
/// Fingers extend above the palm, so the crop centre moves up by this
/// fraction of the palm height.
const HAND_CROP_SHIFT_Y: f64 = 0.5;

pub struct OnnxHandTracker {
    palm_session: ort::session::Session,
    landmark_session: ort::session::Session,
    decoder: SsdDecoder,
    max_hands: usize,
    confidence: f64,
}

impl OnnxHandTracker {
    pub fn new(
        palm_model: &Path,
        landmark_model: &Path,
        max_hands: usize,
        confidence: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            palm_session: load_session(palm_model)?,
            landmark_session: load_session(landmark_model)?,
            decoder: SsdDecoder::new(PALM_INPUT_SIZE, PALM_VALUES_PER_ANCHOR),
            max_hands,
            confidence,
        })
    }

    fn detect_palms(&mut self, frame: &Frame) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
        let input = ort::value::Tensor::from_array(preprocess_nchw(frame, PALM_INPUT_SIZE))?;
        let outputs = self.palm_session.run(ort::inputs![input])?;
        if outputs.len() < 2 {
            return Err(format!("Palm model expected 2 outputs, got {}", outputs.len()).into());
        }

        let first: Vec<f32> = outputs[0].try_extract_array::<f32>()?.iter().copied().collect();
        let second: Vec<f32> = outputs[1].try_extract_array::<f32>()?.iter().copied().collect();
        // Scores carry one value per anchor, regressors eighteen.
        let (regressors, scores) = if first.len() == self.decoder.anchor_count() {
            (second, first)
        } else {
            (first, second)
        };

        let mut dets = self.decoder.decode(
            &regressors,
            &scores,
            self.confidence,
            frame.width(),
            frame.height(),
        );
        let mut palms = nms(&mut dets, PALM_NMS_IOU);
        palms.truncate(self.max_hands);
        Ok(palms)
    }

    fn landmarks_in(
        &mut self,
        frame: &Frame,
        crop: &Region,
    ) -> Result<Option<HandLandmarks>, Box<dyn std::error::Error>> {
        let pixels = frame.crop(crop);
        if pixels.width() == 0 || pixels.height() == 0 {
            return Ok(None);
        }
        let input = ort::value::Tensor::from_array(preprocess_nchw(&pixels, LANDMARK_INPUT_SIZE))?;
        let outputs = self.landmark_session.run(ort::inputs![input])?;

        let mut coords: Option<Vec<f32>> = None;
        let mut scalars = Vec::new();
        for i in 0..outputs.len() {
            let values: Vec<f32> = outputs[i].try_extract_array::<f32>()?.iter().copied().collect();
            match values.len() {
                n if n == HAND_LANDMARK_COUNT * 3 && coords.is_none() => coords = Some(values),
                1 => scalars.push(values[0]),
                _ => {}
            }
        }
        let coords = coords.ok_or("Hand landmark model produced no 63-value output")?;
        let &[presence, handedness_score] = scalars.as_slice() else {
            return Err(format!(
                "Hand landmark model expected presence and handedness scores, got {}",
                scalars.len()
            )
            .into());
        };

        if (presence as f64) < self.confidence {
            return Ok(None);
        }

        Ok(Some(HandLandmarks {
            handedness: handedness_from_score(handedness_score),
            points: landmarks_to_frame(&coords, crop, frame.width(), frame.height()),
        }))
    }
}

impl HandTracker for OnnxHandTracker {
    fn track(&mut self, frame: &Frame) -> Result<Vec<HandLandmarks>, Box<dyn std::error::Error>> {
        let palms = self.detect_palms(frame)?;
        let mut hands = Vec::with_capacity(palms.len());
        for palm in &palms {
            let crop = hand_crop(palm, frame.width(), frame.height());
            if let Some(hand) = self.landmarks_in(frame, &crop)? {
                hands.push(hand);
            }
        }
        Ok(hands)
    }
}

/// Square crop around a palm detection, clamped to the frame.
fn hand_crop(palm: &RawDetection, frame_width: u32, frame_height: u32) -> Region {
    let (cx, cy) = palm.center();
    let cy = cy - palm.height() * HAND_CROP_SHIFT_Y;
    let side = palm.width().max(palm.height()) * HAND_CROP_SCALE;

    let x1 = (cx - side / 2.0).max(0.0);
    let y1 = (cy - side / 2.0).max(0.0);
    let x2 = (cx + side / 2.0).min(frame_width as f64);
    let y2 = (cy + side / 2.0).min(frame_height as f64);
    let (x1, y1, x2, y2) = (x1.round(), y1.round(), x2.round(), y2.round());
    Region {
        x: x1 as i32,
        y: y1 as i32,
        width: (x2 - x1).max(0.0) as i32,
        height: (y2 - y1).max(0.0) as i32,
    }
}

/// Maps model-space landmark coordinates (pixels of the 224² input) back to
/// coordinates normalised by the full frame size.
fn landmarks_to_frame(
    coords: &[f32],
    crop: &Region,
    frame_width: u32,
    frame_height: u32,
) -> [Landmark; HAND_LANDMARK_COUNT] {
    let input = LANDMARK_INPUT_SIZE as f32;
    let (fw, fh) = (frame_width.max(1) as f32, frame_height.max(1) as f32);
    let mut points = [Landmark::default(); HAND_LANDMARK_COUNT];
    for (i, point) in points.iter_mut().enumerate() {
        let (lx, ly, lz) = (coords[i * 3], coords[i * 3 + 1], coords[i * 3 + 2]);
        *point = Landmark {
            x: (crop.x as f32 + lx / input * crop.width as f32) / fw,
            y: (crop.y as f32 + ly / input * crop.height as f32) / fh,
            z: lz / input,
        };
    }
    points
}

fn handedness_from_score(score: f32) -> Handedness {
    if score > 0.5 {
        Handedness::Right
    } else {
        Handedness::Left
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::{HAND_LANDMARK_MODEL_NAME, PALM_MODEL_NAME};
    use crate::shared::model_resolver;
    use approx::assert_relative_eq;

    fn palm(x1: f64, y1: f64, x2: f64, y2: f64) -> RawDetection {
        RawDetection {
            x1,
            y1,
            x2,
            y2,
            score: 0.9,
        }
    }

    #[test]
    fn test_hand_crop_is_square_and_shifted_up() {
        let crop = hand_crop(&palm(300.0, 300.0, 340.0, 340.0), 1000, 1000);
        // side = 40 * 2.6 = 104, centre (320, 300)
        assert_eq!(crop.width, 104);
        assert_eq!(crop.height, 104);
        assert_eq!(crop.x, 268);
        assert_eq!(crop.y, 248);
    }

    #[test]
    fn test_hand_crop_clamped_at_frame_edge() {
        let crop = hand_crop(&palm(0.0, 0.0, 40.0, 40.0), 200, 200);
        assert_eq!((crop.x, crop.y), (0, 0));
        assert!(crop.width < 104);
        assert!(crop.height < 104);
    }

    #[test]
    fn test_landmarks_mapped_into_frame_space() {
        let mut coords = vec![0.0f32; HAND_LANDMARK_COUNT * 3];
        // Landmark 0 at the centre of the model input, landmark 1 at its corner
        coords[0] = 112.0;
        coords[1] = 112.0;
        coords[3] = 224.0;
        coords[4] = 224.0;
        let crop = Region {
            x: 100,
            y: 50,
            width: 200,
            height: 100,
        };
        let points = landmarks_to_frame(&coords, &crop, 400, 200);
        assert_relative_eq!(points[0].x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(points[0].y, 0.5, epsilon = 1e-6);
        assert_relative_eq!(points[1].x, 0.75, epsilon = 1e-6);
        assert_relative_eq!(points[1].y, 0.75, epsilon = 1e-6);
        assert_relative_eq!(points[2].x, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_handedness_threshold() {
        assert_eq!(handedness_from_score(0.9), Handedness::Right);
        assert_eq!(handedness_from_score(0.5), Handedness::Left);
        assert_eq!(handedness_from_score(0.1), Handedness::Left);
    }

    #[test]
    #[ignore] // requires the palm and hand-landmark models to be resolvable
    fn test_blank_frame_has_no_hands() {
        let palm_path = model_resolver::resolve(PALM_MODEL_NAME, None, None, None).unwrap();
        let landmark_path =
            model_resolver::resolve(HAND_LANDMARK_MODEL_NAME, None, None, None).unwrap();
        let mut tracker = OnnxHandTracker::new(&palm_path, &landmark_path, 2, 0.5).unwrap();
        let frame = Frame::new(vec![0; 320 * 240 * 3], 320, 240, 3, 0);
        assert!(tracker.track(&frame).unwrap().is_empty());
    }
}
