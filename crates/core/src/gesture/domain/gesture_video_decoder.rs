use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::detection::domain::face_crop::{FaceCrop, FaceProvenance};
use crate::detection::domain::face_locator::FaceLocator;
use crate::gesture::domain::finger_counter::frame_digit;
use crate::gesture::domain::frame_digit_sample::FrameDigitSample;
use crate::gesture::domain::hand_tracker::HandTracker;
use crate::gesture::domain::sample_plan::SamplePlan;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::error::VerificationError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

/// Everything one pass over a gesture video produces.
#[derive(Debug)]
pub struct GestureDecoding {
    /// One sample per decoded frame, in decode order.
    pub samples: Vec<FrameDigitSample>,
    /// Face crops from the sampled frames that contained a face.
    pub faces: Vec<FaceCrop>,
    pub metadata: VideoMetadata,
}

impl GestureDecoding {
    pub fn frames_decoded(&self) -> usize {
        self.samples.len()
    }
}

/// Reads a gesture video once, producing a finger-count digit per frame and
/// face crops at the sampled frames.
pub struct GestureVideoDecoder {
    reader: Box<dyn VideoReader>,
    tracker: Box<dyn HandTracker>,
    locator: FaceLocator,
    writer: Box<dyn ImageWriter>,
    logger: Box<dyn PipelineLogger>,
    face_margin: u32,
    max_digit: u8,
}

/// Closes the reader when dropped, whichever way decoding exits.
struct ReaderGuard<'a> {
    reader: &'a mut dyn VideoReader,
}

impl Drop for ReaderGuard<'_> {
    fn drop(&mut self) {
        self.reader.close();
    }
}

#[derive(Default)]
struct DecodeState {
    samples: Vec<FrameDigitSample>,
    faces: Vec<FaceCrop>,
    last: Option<Frame>,
}

/// Per-frame collaborators, borrowed from the decoder for one pass.
struct FrameStage<'a> {
    tracker: &'a mut dyn HandTracker,
    locator: &'a mut FaceLocator,
    writer: &'a dyn ImageWriter,
    logger: &'a mut dyn PipelineLogger,
    scratch_dir: Option<&'a Path>,
    face_margin: u32,
    max_digit: u8,
}

impl GestureVideoDecoder {
    pub fn new(
        reader: Box<dyn VideoReader>,
        tracker: Box<dyn HandTracker>,
        locator: FaceLocator,
        writer: Box<dyn ImageWriter>,
        logger: Box<dyn PipelineLogger>,
        face_margin: u32,
        max_digit: u8,
    ) -> Self {
        Self {
            reader,
            tracker,
            locator,
            writer,
            logger,
            face_margin,
            max_digit,
        }
    }

    /// Decodes `path`. Sampled face crops are also written as
    /// `face_<frame>.jpg` under `scratch_dir` when one is given; stale crops
    /// there are removed first.
    ///
    /// Fails with `VideoUnreadable` if the video cannot be opened. A decode
    /// error part-way through ends the stream early and is not an error.
    pub fn decode(
        &mut self,
        path: &Path,
        scratch_dir: Option<&Path>,
    ) -> Result<GestureDecoding, VerificationError> {
        if let Some(dir) = scratch_dir {
            purge_stale_crops(dir)?;
        }

        let metadata = self
            .reader
            .open(path)
            .map_err(|e| VerificationError::VideoUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let plan = SamplePlan::new(metadata.total_frames);
        log::info!(
            "Decoding {} ({}x{}, {} frames, samples at {:?}{})",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.total_frames,
            plan.indices(),
            if plan.samples_final_frame() { " + final" } else { "" }
        );

        let guard = ReaderGuard {
            reader: self.reader.as_mut(),
        };
        let mut stage = FrameStage {
            tracker: self.tracker.as_mut(),
            locator: &mut self.locator,
            writer: self.writer.as_ref(),
            logger: self.logger.as_mut(),
            scratch_dir,
            face_margin: self.face_margin,
            max_digit: self.max_digit,
        };

        let state = run_frames(guard, &plan, metadata.total_frames, &mut stage)?;

        let DecodeState {
            samples,
            mut faces,
            last,
        } = state;
        if let Some(frame) = last.filter(|f| !plan.is_sampled(f.index())) {
            if let Some(crop) = stage.sample_face(&frame)? {
                faces.push(crop);
            }
        }

        stage.logger.info(&format!(
            "Decoded {} frames, {} face samples",
            samples.len(),
            faces.len()
        ));
        stage.logger.summary();

        Ok(GestureDecoding {
            samples,
            faces,
            metadata,
        })
    }
}

/// Folds over the lazy frame stream. The guard is consumed here so the
/// reader is closed as soon as the stream is finished or abandoned.
fn run_frames(
    mut guard: ReaderGuard<'_>,
    plan: &SamplePlan,
    total_frames: usize,
    stage: &mut FrameStage<'_>,
) -> Result<DecodeState, VerificationError> {
    let mut frames = guard.reader.frames().map_while(|item| match item {
        Ok(frame) => Some(frame),
        Err(e) => {
            log::warn!("Video decoding stopped early: {e}");
            None
        }
    });

    let keep_last = plan.samples_final_frame();
    frames.try_fold(DecodeState::default(), |mut state, frame| {
        state.samples.push(stage.count_digit(&frame)?);
        if plan.is_sampled(frame.index()) {
            if let Some(crop) = stage.sample_face(&frame)? {
                state.faces.push(crop);
            }
        }
        stage.logger.progress(frame.index() + 1, total_frames);
        if keep_last {
            state.last = Some(frame);
        }
        Ok(state)
    })
}

impl FrameStage<'_> {
    fn count_digit(&mut self, frame: &Frame) -> Result<FrameDigitSample, VerificationError> {
        let started = Instant::now();
        let hands = self
            .tracker
            .track(frame)
            .map_err(|e| VerificationError::Inference(e.to_string()))?;
        self.logger
            .timing("track", started.elapsed().as_secs_f64() * 1000.0);
        self.logger.metric("hands", hands.len() as f64);

        let digit = frame_digit(&hands, self.max_digit);
        Ok(FrameDigitSample::new(frame.index(), digit))
    }

    fn sample_face(&mut self, frame: &Frame) -> Result<Option<FaceCrop>, VerificationError> {
        let started = Instant::now();
        let crop = self.locator.locate(
            frame,
            FaceProvenance::VideoFrame(frame.index()),
            self.face_margin,
        )?;
        self.logger
            .timing("face", started.elapsed().as_secs_f64() * 1000.0);

        let Some(crop) = crop else {
            log::info!("No face in sampled frame {}", frame.index());
            return Ok(None);
        };
        if let Some(dir) = self.scratch_dir {
            let path = dir.join(crop.sample_file_name());
            self.writer
                .write(&path, &crop.pixels)
                .map_err(|e| VerificationError::Write {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            log::debug!("Saved face sample {}", path.display());
        }
        Ok(Some(crop))
    }
}

/// Creates `dir` if needed and deletes image files left by earlier runs.
fn purge_stale_crops(dir: &Path) -> Result<(), VerificationError> {
    fs::create_dir_all(dir)?;
    let stale: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_image_extension(p))
        .collect();
    for path in stale {
        fs::remove_file(&path)?;
    }
    Ok(())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
