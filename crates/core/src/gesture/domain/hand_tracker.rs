use serde::Serialize;

use crate::shared::constants::HAND_LANDMARK_COUNT;
use crate::shared::frame::Frame;

/// A hand keypoint in normalised image coordinates (`x`, `y` in [0,1],
/// origin top-left; `z` is relative depth).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
}

/// The 21 MediaPipe hand keypoints of one detected hand.
///
/// Index 0 is the wrist; 1-4 thumb, 5-8 index, 9-12 middle, 13-16 ring,
/// 17-20 pinky, each finger ordered from base to tip.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    pub handedness: Handedness,
    pub points: [Landmark; HAND_LANDMARK_COUNT],
}

/// Finds hands in a frame and returns their landmarks.
///
/// Implementations return at most the number of hands they were
/// configured for, in no particular order.
pub trait HandTracker: Send {
    fn track(&mut self, frame: &Frame) -> Result<Vec<HandLandmarks>, Box<dyn std::error::Error>>;
}
