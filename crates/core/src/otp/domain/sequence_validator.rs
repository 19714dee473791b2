//! Reduces a per-frame digit stream to the order in which digits were
//! last shown, and checks it against the expected PIN.

use std::collections::HashMap;

use crate::gesture::domain::frame_digit_sample::FrameDigitSample;
use crate::otp::domain::expected_pin::ExpectedPin;

/// Distinct digits ordered by the frame index of their last occurrence.
pub fn reduce_digits(samples: &[FrameDigitSample]) -> Vec<u8> {
    let mut last_seen: HashMap<u8, usize> = HashMap::new();
    for sample in samples {
        last_seen.insert(sample.digit, sample.frame_index);
    }
    let mut ordered: Vec<(u8, usize)> = last_seen.into_iter().collect();
    ordered.sort_by_key(|&(_, index)| index);
    ordered.into_iter().map(|(digit, _)| digit).collect()
}

/// The reduced sequence restricted to digits that appear in the PIN.
pub fn candidate_sequence(samples: &[FrameDigitSample], pin: &ExpectedPin) -> Vec<u8> {
    reduce_digits(samples)
        .into_iter()
        .filter(|&d| pin.contains(d))
        .collect()
}

pub fn reduce_and_validate(samples: &[FrameDigitSample], pin: &ExpectedPin) -> bool {
    let candidate = candidate_sequence(samples, pin);
    let valid = candidate == pin.digits();
    log::info!(
        "Gesture sequence {:?} vs PIN {pin}: {}",
        candidate,
        if valid { "match" } else { "mismatch" }
    );
    valid
}
