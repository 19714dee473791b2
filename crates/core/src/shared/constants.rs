pub const FACE_MODEL_NAME: &str = "face_detection_short_range.onnx";
pub const PALM_MODEL_NAME: &str = "palm_detection.onnx";
pub const HAND_LANDMARK_MODEL_NAME: &str = "hand_landmark.onnx";

/// Side length, in pixels, that every face crop is normalised to.
pub const CANONICAL_FACE_SIZE: u32 = 200;

/// Landmarks per hand in the MediaPipe hand topology.
pub const HAND_LANDMARK_COUNT: usize = 21;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

// Per-user storage layout.
pub const DOCUMENT_IMAGE_FILE: &str = "id_proof.jpg";
pub const CORRECTED_IMAGE_FILE: &str = "Processed_ID_Card_Best_angle.jpg";
pub const DOCUMENT_FACE_FILE: &str = "Extracted_ID_Face.jpg";
pub const VIDEO_DIR: &str = "recorded_videos";
pub const VIDEO_FILE: &str = "live_recording.mp4";
pub const LIVENESS_SCRATCH_DIR: &str = "face_valid";
