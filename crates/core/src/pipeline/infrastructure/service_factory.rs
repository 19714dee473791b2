use std::path::{Path, PathBuf};

use crate::detection::domain::face_locator::FaceLocator;
use crate::detection::infrastructure::onnx_blazeface_detector::OnnxBlazefaceDetector;
use crate::document::domain::orientation_selector::OrientationSelector;
use crate::document::infrastructure::tesseract_recognizer::TesseractRecognizer;
use crate::gesture::domain::gesture_video_decoder::GestureVideoDecoder;
use crate::gesture::infrastructure::onnx_hand_tracker::OnnxHandTracker;
use crate::liveness::domain::liveness_matcher::LivenessMatcher;
use crate::pipeline::pipeline_logger::{LogPipelineLogger, NullPipelineLogger, PipelineLogger};
use crate::pipeline::process_document_use_case::ProcessDocumentUseCase;
use crate::pipeline::verification_request::VerificationServices;
use crate::pipeline::verify_otp_use_case::VerifyOtpUseCase;
use crate::shared::config::VerificationConfig;
use crate::shared::error::VerificationError;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crate::video::infrastructure::image_file_reader::ImageFileReader;
use crate::video::infrastructure::image_file_writer::ImageFileWriter;

/// Resolved model files.
#[derive(Clone, Debug)]
pub struct ModelPaths {
    pub face: PathBuf,
    pub palm: PathBuf,
    pub hand_landmark: PathBuf,
}

/// Wires the concrete adapters into both use cases.
///
/// `progress_logging` selects the `log`-backed decode logger; batch workers
/// pass `false` to keep per-frame progress out of interleaved output.
pub fn build_services(
    config: &VerificationConfig,
    models: &ModelPaths,
    users_dir: &Path,
    progress_logging: bool,
) -> Result<VerificationServices, VerificationError> {
    let document = build_document_use_case(config, models)?;
    let otp = build_otp_use_case(config, models, progress_logging)?;
    Ok(VerificationServices::new(users_dir.to_path_buf(), document, otp))
}

pub fn build_document_use_case(
    config: &VerificationConfig,
    models: &ModelPaths,
) -> Result<ProcessDocumentUseCase, VerificationError> {
    let recognizer = TesseractRecognizer::new(config.tessdata_dir.clone(), &config.ocr_language)
        .map_err(|e| VerificationError::Recognition(e.to_string()))?;
    let selector = OrientationSelector::from_config(Box::new(recognizer), config);

    Ok(ProcessDocumentUseCase::new(
        Box::new(ImageFileReader::new()),
        selector,
        face_locator(config, models)?,
        Box::new(ImageFileWriter::new()),
    ))
}

pub fn build_otp_use_case(
    config: &VerificationConfig,
    models: &ModelPaths,
    progress_logging: bool,
) -> Result<VerifyOtpUseCase, VerificationError> {
    let tracker = OnnxHandTracker::new(
        &models.palm,
        &models.hand_landmark,
        config.max_hands,
        config.hand_confidence,
    )
    .map_err(|e| VerificationError::Inference(e.to_string()))?;
    let logger: Box<dyn PipelineLogger> = if progress_logging {
        Box::new(LogPipelineLogger::default())
    } else {
        Box::new(NullPipelineLogger)
    };

    let decoder = GestureVideoDecoder::new(
        Box::new(FfmpegReader::new()),
        Box::new(tracker),
        face_locator(config, models)?,
        Box::new(ImageFileWriter::new()),
        logger,
        config.video_face_margin,
        config.max_digit,
    );

    Ok(VerifyOtpUseCase::new(
        Box::new(ImageFileReader::new()),
        decoder,
        LivenessMatcher::new(config.liveness_threshold),
        config.pin_length,
        config.face_canonical_size,
    ))
}

fn face_locator(
    config: &VerificationConfig,
    models: &ModelPaths,
) -> Result<FaceLocator, VerificationError> {
    let detector = OnnxBlazefaceDetector::new(&models.face, config.face_confidence)
        .map_err(|e| VerificationError::Inference(e.to_string()))?;
    Ok(FaceLocator::new(
        Box::new(detector),
        config.face_min_size,
        config.face_canonical_size,
    ))
}
