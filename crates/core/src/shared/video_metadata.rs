use std::path::PathBuf;

/// Stream properties reported when a video or image source is opened.
///
/// `total_frames` is 0 when the container does not report a frame count.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    pub fn has_frame_count(&self) -> bool {
        self.total_frames > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let meta = VideoMetadata {
            width: 1280,
            height: 720,
            fps: 30.0,
            total_frames: 150,
            codec: "h264".to_string(),
            source_path: Some(PathBuf::from("/tmp/live_recording.mp4")),
        };
        assert_eq!(meta.total_frames, 150);
        assert!(meta.has_frame_count());
        assert_eq!(
            meta.source_path,
            Some(PathBuf::from("/tmp/live_recording.mp4"))
        );
    }

    #[test]
    fn test_unknown_frame_count() {
        let meta = VideoMetadata {
            width: 640,
            height: 480,
            fps: 0.0,
            total_frames: 0,
            codec: String::new(),
            source_path: None,
        };
        assert!(!meta.has_frame_count());
    }
}
