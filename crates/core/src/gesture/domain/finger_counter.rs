use crate::gesture::domain::hand_tracker::{HandLandmarks, Handedness};

const THUMB_TIP: usize = 4;
const THUMB_MCP: usize = 2;
const FINGER_TIPS: [usize; 4] = [8, 12, 16, 20];

/// Raised fingers on one hand, 0 to 5.
///
/// A finger is up when its tip sits above the joint below it. The thumb
/// folds sideways, so it is compared horizontally against its MCP joint;
/// the direction depends on which hand it is.
pub fn count_fingers(hand: &HandLandmarks) -> u8 {
    let p = &hand.points;
    let thumb_up = match hand.handedness {
        Handedness::Right => p[THUMB_TIP].x < p[THUMB_MCP].x,
        Handedness::Left => p[THUMB_TIP].x > p[THUMB_MCP].x,
    };
    let fingers_up = FINGER_TIPS
        .iter()
        .filter(|&&tip| p[tip].y < p[tip - 1].y)
        .count() as u8;
    fingers_up + u8::from(thumb_up)
}

/// Digit shown in one frame: the sum over all hands, capped at `max_digit`.
pub fn frame_digit(hands: &[HandLandmarks], max_digit: u8) -> u8 {
    let total: u32 = hands.iter().map(|h| count_fingers(h) as u32).sum();
    total.min(max_digit as u32) as u8
}
