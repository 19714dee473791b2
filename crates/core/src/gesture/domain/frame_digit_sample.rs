use serde::Serialize;

/// Finger-count digit observed in one decoded frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FrameDigitSample {
    pub frame_index: usize,
    pub digit: u8,
}

impl FrameDigitSample {
    pub fn new(frame_index: usize, digit: u8) -> Self {
        Self { frame_index, digit }
    }
}

/// Samples for consecutive frames starting at 0.
pub fn samples_from_digits(digits: &[u8]) -> Vec<FrameDigitSample> {
    digits
        .iter()
        .enumerate()
        .map(|(i, &d)| FrameDigitSample::new(i, d))
        .collect()
}
