use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;

/// Reads a still image (ID document photo, stored reference face) as a
/// one-frame source with `fps=0` and `total_frames=1`.
///
/// The picture is decoded eagerly by [`FfmpegReader`] during `open`, so
/// phone-camera JPEGs and PNGs share the video decode path.
pub struct ImageFileReader {
    frame: Option<Frame>,
}

impl ImageFileReader {
    pub fn new() -> Self {
        Self { frame: None }
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for ImageFileReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        self.frame = None;
        let mut decoder = FfmpegReader::new();
        decoder.open(path)?;
        let first = decoder.frames().next();
        decoder.close();
        let frame = first.ok_or("Image contained no decodable frame")??;

        let (width, height) = (frame.width(), frame.height());
        self.frame = Some(frame);
        Ok(VideoMetadata {
            width,
            height,
            fps: 0.0,
            total_frames: 1,
            codec: String::new(),
            source_path: Some(path.to_path_buf()),
        })
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.frame.take() {
            Some(frame) => Box::new(std::iter::once(Ok(frame))),
            None => Box::new(std::iter::once(Err("ImageFileReader: not opened".into()))),
        }
    }

    fn close(&mut self) {
        self.frame = None;
    }
}
