/// Which frames of a video are sampled for face liveness.
///
/// With a known frame count the first, middle and last frames are sampled.
/// When the container does not report a count, the first frame and the
/// final decoded frame are sampled instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SamplePlan {
    indices: Vec<usize>,
    sample_final_frame: bool,
}

impl SamplePlan {
    pub fn new(total_frames: usize) -> Self {
        if total_frames == 0 {
            return Self {
                indices: vec![0],
                sample_final_frame: true,
            };
        }
        let mut indices = vec![0, total_frames / 2, total_frames - 1];
        indices.dedup();
        Self {
            indices,
            sample_final_frame: false,
        }
    }

    pub fn is_sampled(&self, frame_index: usize) -> bool {
        self.indices.contains(&frame_index)
    }

    /// True when the last frame must be sampled once the stream ends.
    pub fn samples_final_frame(&self) -> bool {
        self.sample_final_frame
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}
