use serde::Serialize;

use crate::detection::domain::face_crop::{FaceCrop, FaceProvenance};
use crate::gesture::domain::gesture_video_decoder::GestureVideoDecoder;
use crate::liveness::domain::liveness_matcher::{LivenessMatcher, LivenessReport};
use crate::otp::domain::expected_pin::ExpectedPin;
use crate::otp::domain::sequence_validator::{candidate_sequence, reduce_digits};
use crate::pipeline::still_image::read_still_image;
use crate::pipeline::user_workspace::UserWorkspace;
use crate::shared::error::VerificationError;
use crate::video::domain::video_reader::VideoReader;

#[derive(Clone, Debug, Serialize)]
pub struct OtpReport {
    /// True only when liveness passed and the gestured sequence matches.
    pub valid: bool,
    pub sequence_matches: bool,
    pub liveness: LivenessReport,
    /// Distinct digits in last-occurrence order.
    pub reduced_sequence: Vec<u8>,
    /// `reduced_sequence` restricted to the PIN's digits.
    pub candidate_sequence: Vec<u8>,
    pub frames_decoded: usize,
}

/// OTP pipeline: load reference face → decode gesture video → liveness →
/// sequence validation.
pub struct VerifyOtpUseCase {
    reference_reader: Box<dyn VideoReader>,
    decoder: GestureVideoDecoder,
    matcher: LivenessMatcher,
    pin_length: usize,
    canonical_size: u32,
}

impl VerifyOtpUseCase {
    pub fn new(
        reference_reader: Box<dyn VideoReader>,
        decoder: GestureVideoDecoder,
        matcher: LivenessMatcher,
        pin_length: usize,
        canonical_size: u32,
    ) -> Self {
        Self {
            reference_reader,
            decoder,
            matcher,
            pin_length,
            canonical_size,
        }
    }

    pub fn execute(
        &mut self,
        workspace: &UserWorkspace,
        pin: &str,
    ) -> Result<OtpReport, VerificationError> {
        let pin = ExpectedPin::parse(pin, self.pin_length)?;
        let reference = self.load_reference(workspace)?;

        let decoding = self
            .decoder
            .decode(&workspace.video(), Some(&workspace.liveness_scratch_dir()))?;

        let liveness = self.matcher.verify(&reference, &decoding.faces)?;
        let reduced_sequence = reduce_digits(&decoding.samples);
        let candidate_sequence = candidate_sequence(&decoding.samples, &pin);
        let sequence_matches = candidate_sequence == pin.digits();
        let valid = liveness.verdict.passed() && sequence_matches;
        log::info!(
            "OTP for {}: sequence {:?} ({}), liveness {:?} => {}",
            workspace.user_id(),
            candidate_sequence,
            if sequence_matches { "match" } else { "mismatch" },
            liveness.verdict,
            if valid { "valid" } else { "invalid" }
        );

        Ok(OtpReport {
            valid,
            sequence_matches,
            liveness,
            reduced_sequence,
            candidate_sequence,
            frames_decoded: decoding.frames_decoded(),
        })
    }

    fn load_reference(&mut self, workspace: &UserWorkspace) -> Result<FaceCrop, VerificationError> {
        let path = workspace.document_face();
        let frame = read_still_image(self.reference_reader.as_mut(), &path).map_err(|e| {
            log::warn!("Reference face {} unavailable: {e}", path.display());
            VerificationError::ReferenceFaceUnavailable(path.clone())
        })?;
        let size = self.canonical_size;
        let pixels = if (frame.width(), frame.height()) == (size, size) {
            frame
        } else {
            frame.resized(size, size)
        };
        Ok(FaceCrop {
            pixels,
            provenance: FaceProvenance::Document,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::detection::domain::face_locator::FaceLocator;
    use crate::gesture::domain::finger_counter::fixtures::hand;
    use crate::gesture::domain::hand_tracker::{HandLandmarks, HandTracker, Handedness};
    use crate::liveness::domain::liveness_matcher::LivenessVerdict;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::frame::Frame;
    use crate::shared::region::Region;
    use crate::shared::video_metadata::VideoMetadata;
    use crate::video::domain::image_writer::ImageWriter;
    use std::path::Path;

    const SIZE: u32 = 32;

    fn textured(index: usize, first_byte: u8) -> Frame {
        let mut data = Vec::with_capacity((SIZE * SIZE * 3) as usize);
        for y in 0..SIZE {
            for x in 0..SIZE {
                let v = ((x * 7 + y * 13) % 250) as u8;
                data.extend_from_slice(&[v, v, v]);
            }
        }
        data[0] = first_byte;
        Frame::new(data, SIZE, SIZE, 3, index)
    }

    struct StubStillReader {
        frame: Option<Frame>,
    }

    impl VideoReader for StubStillReader {
        fn open(&mut self, _: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            self.frame.as_ref().ok_or("missing")?;
            Ok(VideoMetadata {
                width: SIZE,
                height: SIZE,
                fps: 0.0,
                total_frames: 1,
                codec: String::new(),
                source_path: None,
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            Box::new(self.frame.clone().into_iter().map(Ok))
        }

        fn close(&mut self) {}
    }

    /// Video whose frames' first byte is the digit being shown.
    struct StubVideoReader {
        digits: Vec<u8>,
        invert_faces: bool,
    }

    impl VideoReader for StubVideoReader {
        fn open(&mut self, _: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            Ok(VideoMetadata {
                width: SIZE,
                height: SIZE,
                fps: 30.0,
                total_frames: self.digits.len(),
                codec: "stub".into(),
                source_path: None,
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            let invert = self.invert_faces;
            Box::new(self.digits.iter().enumerate().map(move |(i, &d)| {
                let frame = textured(i, d);
                if !invert {
                    return Ok(frame);
                }
                let mut data: Vec<u8> = frame.data().iter().map(|v| 255 - v).collect();
                data[0] = d;
                Ok(Frame::new(data, SIZE, SIZE, 3, i))
            }))
        }

        fn close(&mut self) {}
    }

    struct DigitTracker;

    impl HandTracker for DigitTracker {
        fn track(&mut self, frame: &Frame) -> Result<Vec<HandLandmarks>, Box<dyn std::error::Error>> {
            let digit = frame.data()[0] as usize;
            if digit == 0 {
                return Ok(vec![]);
            }
            Ok(vec![hand(Handedness::Right, digit.min(4), digit >= 5)])
        }
    }

    /// Reports the whole frame as a face, or nothing.
    struct WholeFrameDetector {
        enabled: bool,
    }

    impl FaceDetector for WholeFrameDetector {
        fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            if !self.enabled {
                return Ok(vec![]);
            }
            Ok(vec![Region {
                x: 0,
                y: 0,
                width: frame.width() as i32,
                height: frame.height() as i32,
            }])
        }
    }

    struct NullWriter;

    impl ImageWriter for NullWriter {
        fn write(&self, _: &Path, _: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
    }

    fn use_case(
        reference: Option<Frame>,
        video: StubVideoReader,
        faces_visible: bool,
    ) -> VerifyOtpUseCase {
        let locator = FaceLocator::new(
            Box::new(WholeFrameDetector {
                enabled: faces_visible,
            }),
            8,
            SIZE,
        );
        let decoder = GestureVideoDecoder::new(
            Box::new(video),
            Box::new(DigitTracker),
            locator,
            Box::new(NullWriter),
            Box::new(NullPipelineLogger),
            0,
            9,
        );
        VerifyOtpUseCase::new(
            Box::new(StubStillReader { frame: reference }),
            decoder,
            LivenessMatcher::new(0.1),
            4,
            SIZE,
        )
    }

    fn video(digits: &[u8], invert_faces: bool) -> StubVideoReader {
        StubVideoReader {
            digits: digits.to_vec(),
            invert_faces,
        }
    }

    #[test]
    fn test_valid_when_sequence_and_liveness_pass() {
        let dir = tempfile::tempdir().unwrap();
        let ws = UserWorkspace::new(dir.path());
        let mut uc = use_case(
            Some(textured(0, 0)),
            video(&[0, 4, 4, 1, 2, 2, 3, 0], false),
            true,
        );

        let report = uc.execute(&ws, "4123").unwrap();
        assert_eq!(report.liveness.verdict, LivenessVerdict::Passed);
        assert!(report.sequence_matches);
        assert!(report.valid);
        assert_eq!(report.reduced_sequence, vec![4, 1, 2, 3, 0]);
        assert_eq!(report.candidate_sequence, vec![4, 1, 2, 3]);
        assert_eq!(report.frames_decoded, 8);
        assert!(ws.liveness_scratch_dir().is_dir());
    }

    #[test]
    fn test_liveness_failure_invalidates_correct_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let ws = UserWorkspace::new(dir.path());
        let mut uc = use_case(Some(textured(0, 0)), video(&[4, 1, 2, 3], true), true);

        let report = uc.execute(&ws, "4123").unwrap();
        assert!(report.sequence_matches);
        assert_eq!(report.liveness.verdict, LivenessVerdict::Failed);
        assert!(!report.valid);
    }

    #[test]
    fn test_no_face_sampled_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let ws = UserWorkspace::new(dir.path());
        let mut uc = use_case(Some(textured(0, 0)), video(&[4, 1, 2, 3], false), false);

        let report = uc.execute(&ws, "4123").unwrap();
        assert_eq!(report.liveness.verdict, LivenessVerdict::NoFaceSampled);
        assert!(!report.valid);
    }

    #[test]
    fn test_wrong_order_is_invalid_but_ok() {
        let dir = tempfile::tempdir().unwrap();
        let ws = UserWorkspace::new(dir.path());
        let mut uc = use_case(Some(textured(0, 0)), video(&[3, 2, 1, 4], false), true);

        let report = uc.execute(&ws, "4123").unwrap();
        assert!(!report.sequence_matches);
        assert!(!report.valid);
    }

    #[test]
    fn test_missing_reference_face() {
        let mut uc = use_case(None, video(&[1], false), true);
        let ws = UserWorkspace::new("/users/nobody");
        match uc.execute(&ws, "4123") {
            Err(VerificationError::ReferenceFaceUnavailable(path)) => {
                assert_eq!(path, ws.document_face())
            }
            other => panic!("expected ReferenceFaceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_pin_rejected_before_decoding() {
        let mut uc = use_case(None, video(&[1], false), true);
        let err = uc.execute(&UserWorkspace::new("/users/u"), "12a4").unwrap_err();
        assert_eq!(err.kind(), "invalid_pin");
    }
}
