//! Shared single-shot detector math.
//!
//! Both the BlazeFace face detector and the MediaPipe palm detector are
//! anchor-based SSD models with the same box encoding, so preprocessing,
//! anchor generation, decoding and NMS live here.

use crate::shared::frame::Frame;

/// Feature-map layout shared by the short-range face and palm models:
/// `(stride, anchors_per_cell)`.
pub const SSD_STRIDES: [(usize, usize); 2] = [(8, 2), (16, 6)];

/// A decoded detection in source-frame pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDetection {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub score: f64,
}

impl RawDetection {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

/// Resize an RGB frame to `size × size` and normalize to [0,1] NCHW float32.
///
/// Gray frames are replicated across the three input channels.
pub fn preprocess_nchw(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let channels = frame.channels() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));
    if src_w == 0 || src_h == 0 {
        return tensor;
    }

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c.min(channels - 1)]] as f32 / 255.0;
            }
        }
    }

    tensor
}

/// Anchor centres in normalised coordinates, one per `(cell, anchor)` pair,
/// in the order the model emits them.
pub fn generate_anchors(input_size: u32, strides: &[(usize, usize)]) -> Vec<[f32; 2]> {
    let mut anchors = Vec::new();
    for &(stride, num) in strides {
        let grid_size = input_size as usize / stride;
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cx = (x as f32 + 0.5) / grid_size as f32;
                let cy = (y as f32 + 0.5) / grid_size as f32;
                for _ in 0..num {
                    anchors.push([cx, cy]);
                }
            }
        }
    }
    anchors
}

/// Decodes the raw outputs of an anchor-based SSD model.
pub struct SsdDecoder {
    anchors: Vec<[f32; 2]>,
    input_size: u32,
    values_per_anchor: usize,
}

impl SsdDecoder {
    /// `values_per_anchor` is the regressor width: 16 for BlazeFace, 18 for
    /// the palm model. The first four values are `(dx, dy, w, h)` in input
    /// pixels.
    pub fn new(input_size: u32, values_per_anchor: usize) -> Self {
        Self {
            anchors: generate_anchors(input_size, &SSD_STRIDES),
            input_size,
            values_per_anchor,
        }
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    /// Frame-space boxes for every anchor whose score logit clears
    /// `confidence` after the sigmoid.
    pub fn decode(
        &self,
        regressors: &[f32],
        scores: &[f32],
        confidence: f64,
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<RawDetection> {
        let input = self.input_size as f32;
        let (fw, fh) = (frame_width as f32, frame_height as f32);
        let mut dets = Vec::new();

        for (i, &raw_score) in scores.iter().enumerate().take(self.anchors.len()) {
            let score = sigmoid(raw_score);
            if (score as f64) < confidence {
                continue;
            }
            let offset = i * self.values_per_anchor;
            if offset + 4 > regressors.len() {
                break;
            }

            let anchor = self.anchors[i];
            let cx = anchor[0] + regressors[offset] / input;
            let cy = anchor[1] + regressors[offset + 1] / input;
            let w = regressors[offset + 2] / input;
            let h = regressors[offset + 3] / input;

            dets.push(RawDetection {
                x1: ((cx - w / 2.0) * fw).max(0.0) as f64,
                y1: ((cy - h / 2.0) * fh).max(0.0) as f64,
                x2: ((cx + w / 2.0) * fw).min(fw) as f64,
                y2: ((cy + h / 2.0) * fh).min(fh) as f64,
                score: score as f64,
            });
        }
        dets
    }
}

/// Greedy non-maximum suppression, highest score first.
pub fn nms(dets: &mut [RawDetection], iou_thresh: f64) -> Vec<RawDetection> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if !suppressed[j] && bbox_iou(&dets[i], &dets[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

pub fn bbox_iou(a: &RawDetection, b: &RawDetection) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = a.width() * a.height();
    let area_b = b.width() * b.height();
    inter / (area_a + area_b - inter)
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
