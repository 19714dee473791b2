use std::path::Path;

use crate::shared::frame::Frame;
use crate::video::domain::video_reader::VideoReader;

/// Reads the single frame of a still image through a `VideoReader`.
pub fn read_still_image(
    reader: &mut dyn VideoReader,
    path: &Path,
) -> Result<Frame, Box<dyn std::error::Error>> {
    reader.open(path)?;
    let frame = reader.frames().next();
    reader.close();
    frame.ok_or("image contains no frames")?
}
