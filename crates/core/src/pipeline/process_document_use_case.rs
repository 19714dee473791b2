use std::path::PathBuf;

use serde::Serialize;

use crate::detection::domain::face_crop::FaceProvenance;
use crate::detection::domain::face_locator::FaceLocator;
use crate::document::domain::field_extractor::{extract_fields, ExtractedFields};
use crate::document::domain::orientation_selector::{OcrCandidate, OrientationSelector};
use crate::pipeline::still_image::read_still_image;
use crate::pipeline::user_workspace::UserWorkspace;
use crate::shared::error::VerificationError;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

#[derive(Clone, Debug, Serialize)]
pub struct DocumentReport {
    pub transcript: String,
    pub fields: ExtractedFields,
    pub best_angle: i32,
    pub candidates: Vec<OcrCandidate>,
    pub corrected_image_path: PathBuf,
    /// `None` when no face was found on the corrected document.
    pub face_path: Option<PathBuf>,
}

/// Document pipeline: read → orient + OCR → extract fields → save corrected
/// image → locate and save the document face.
pub struct ProcessDocumentUseCase {
    reader: Box<dyn VideoReader>,
    selector: OrientationSelector,
    locator: FaceLocator,
    writer: Box<dyn ImageWriter>,
}

impl ProcessDocumentUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        selector: OrientationSelector,
        locator: FaceLocator,
        writer: Box<dyn ImageWriter>,
    ) -> Self {
        Self {
            reader,
            selector,
            locator,
            writer,
        }
    }

    pub fn execute(&mut self, workspace: &UserWorkspace) -> Result<DocumentReport, VerificationError> {
        let image_path = workspace.document_image();
        let image = read_still_image(self.reader.as_mut(), &image_path).map_err(|e| {
            VerificationError::ImageUnreadable {
                path: image_path.clone(),
                reason: e.to_string(),
            }
        })?;
        log::info!(
            "Processing document {} ({}x{})",
            image_path.display(),
            image.width(),
            image.height()
        );

        let selection = self.selector.select_best(&image)?;
        if selection.transcript.trim().is_empty() {
            return Err(VerificationError::NoTextFound);
        }
        let fields = extract_fields(&selection.transcript);

        let corrected_image_path = workspace.corrected_image();
        self.write(&corrected_image_path, &selection.corrected_image)?;

        let face_path = workspace.document_face();
        let face = self
            .locator
            .locate(&selection.corrected_image, FaceProvenance::Document, 0)?;
        let face_path = match face {
            Some(crop) => {
                self.write(&face_path, &crop.pixels)?;
                Some(face_path)
            }
            None => {
                log::warn!("No face found on document {}", image_path.display());
                // An old reference face must not outlive the document it came from
                if face_path.exists() {
                    std::fs::remove_file(&face_path)?;
                }
                None
            }
        };

        Ok(DocumentReport {
            transcript: selection.transcript,
            fields,
            best_angle: selection.best_angle,
            candidates: selection.candidates,
            corrected_image_path,
            face_path,
        })
    }

    fn write(&self, path: &std::path::Path, frame: &Frame) -> Result<(), VerificationError> {
        self.writer
            .write(path, frame)
            .map_err(|e| VerificationError::Write {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::document::domain::orientation_selector::PreprocessParams;
    use crate::document::domain::text_recognizer::TextRecognizer;
    use crate::shared::region::Region;
    use crate::shared::video_metadata::VideoMetadata;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubImageReader {
        frame: Option<Frame>,
    }

    impl VideoReader for StubImageReader {
        fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            let frame = self.frame.as_ref().ok_or("no such file")?;
            Ok(VideoMetadata {
                width: frame.width(),
                height: frame.height(),
                fps: 0.0,
                total_frames: 1,
                codec: String::new(),
                source_path: Some(path.to_path_buf()),
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            Box::new(self.frame.clone().into_iter().map(Ok))
        }

        fn close(&mut self) {}
    }

    /// Recognizes text only when the image is portrait, i.e. after a 90°
    /// rotation of the landscape fixture.
    struct PortraitOnlyRecognizer {
        text: Vec<String>,
    }

    impl TextRecognizer for PortraitOnlyRecognizer {
        fn recognize(&mut self, image: &Frame) -> Result<Vec<String>, Box<dyn std::error::Error>> {
            if image.height() > image.width() {
                Ok(self.text.clone())
            } else {
                Ok(vec!["~~".to_string()])
            }
        }
    }

    struct SilentRecognizer;

    impl TextRecognizer for SilentRecognizer {
        fn recognize(&mut self, _: &Frame) -> Result<Vec<String>, Box<dyn std::error::Error>> {
            Ok(Vec::new())
        }
    }

    struct StubDetector {
        faces: Vec<Region>,
    }

    impl FaceDetector for StubDetector {
        fn detect(&mut self, _: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            Ok(self.faces.clone())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingWriter {
        written: Arc<Mutex<HashMap<PathBuf, (u32, u32)>>>,
    }

    impl ImageWriter for RecordingWriter {
        fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.written
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), (frame.width(), frame.height()));
            Ok(())
        }
    }

    fn use_case(
        image: Option<Frame>,
        recognizer: Box<dyn TextRecognizer>,
        faces: Vec<Region>,
        writer: RecordingWriter,
    ) -> ProcessDocumentUseCase {
        let selector = OrientationSelector::new(
            recognizer,
            vec![0, 90],
            10.0,
            PreprocessParams {
                diameter: 3,
                sigma_color: 75.0,
                sigma_space: 75.0,
            },
        );
        ProcessDocumentUseCase::new(
            Box::new(StubImageReader { frame: image }),
            selector,
            FaceLocator::new(Box::new(StubDetector { faces }), 5, 200),
            Box::new(writer),
        )
    }

    fn landscape() -> Frame {
        Frame::new(vec![200; 40 * 20 * 3], 40, 20, 3, 0)
    }

    fn card_text() -> Vec<String> {
        vec![
            "Government of India".to_string(),
            "Asha Rao DOB: 01/02/1990".to_string(),
            "1234 5678 9012".to_string(),
        ]
    }

    #[test]
    fn test_rotated_document_processed_end_to_end() {
        let workspace = UserWorkspace::new("/users/u1");
        let writer = RecordingWriter::default();
        let written = writer.written.clone();
        let face = Region {
            x: 2,
            y: 2,
            width: 10,
            height: 10,
        };
        let mut uc = use_case(
            Some(landscape()),
            Box::new(PortraitOnlyRecognizer { text: card_text() }),
            vec![face],
            writer,
        );

        let report = uc.execute(&workspace).unwrap();
        assert_eq!(report.best_angle, 90);
        assert_eq!(report.candidates.len(), 2);
        assert_eq!(report.fields.name.as_deref(), Some("India Asha Rao"));
        assert_eq!(report.fields.date_of_birth.as_deref(), Some("01/02/1990"));
        assert_eq!(report.fields.id_number.as_deref(), Some("1234 5678 9012"));
        assert_eq!(report.face_path, Some(workspace.document_face()));

        let written = written.lock().unwrap();
        assert_eq!(written[&workspace.corrected_image()], (20, 40));
        assert_eq!(written[&workspace.document_face()], (200, 200));
    }

    #[test]
    fn test_missing_face_still_returns_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = UserWorkspace::new(dir.path());
        std::fs::write(workspace.document_face(), b"stale").unwrap();
        let mut uc = use_case(
            Some(landscape()),
            Box::new(PortraitOnlyRecognizer { text: card_text() }),
            vec![],
            RecordingWriter::default(),
        );

        let report = uc.execute(&workspace).unwrap();
        assert!(report.face_path.is_none());
        assert!(report.transcript.contains("Asha Rao"));
        assert!(!workspace.document_face().exists());
    }

    #[test]
    fn test_unreadable_image() {
        let mut uc = use_case(None, Box::new(SilentRecognizer), vec![], RecordingWriter::default());
        let err = uc.execute(&UserWorkspace::new("/users/u2")).unwrap_err();
        match err {
            VerificationError::ImageUnreadable { path, .. } => {
                assert_eq!(path, PathBuf::from("/users/u2/id_proof.jpg"))
            }
            other => panic!("expected ImageUnreadable, got {other:?}"),
        }
    }

    #[test]
    fn test_no_text_found() {
        let writer = RecordingWriter::default();
        let written = writer.written.clone();
        let mut uc = use_case(Some(landscape()), Box::new(SilentRecognizer), vec![], writer);

        let err = uc.execute(&UserWorkspace::new("/users/u3")).unwrap_err();
        assert_eq!(err.kind(), "no_text_found");
        assert!(written.lock().unwrap().is_empty());
    }
}
