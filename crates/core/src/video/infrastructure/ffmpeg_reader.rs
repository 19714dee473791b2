use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

type DecodeError = Box<dyn std::error::Error>;

/// Decodes recorded gesture videos via ffmpeg-next (libavformat + libavcodec).
///
/// `open` sets up the demuxer, decoder and RGB24 scaler once; `frames` then
/// pulls pictures lazily, each tagged with its zero-based decode index.
pub struct FfmpegReader {
    stream: Option<OpenStream>,
}

struct OpenStream {
    input: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self { stream: None }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, DecodeError> {
        ffmpeg_next::init()?;
        self.stream = None;

        let input = ffmpeg_next::format::input(path)?;
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let stream_index = stream.index();
        let rate = stream.rate();
        // Containers without a frame count report 0 (or a negative value).
        let total_frames = usize::try_from(stream.frames()).unwrap_or(0);

        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg_next::format::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps: if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            },
            total_frames,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        self.stream = Some(OpenStream {
            input,
            decoder,
            scaler,
            stream_index,
        });
        Ok(metadata)
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, DecodeError>> + '_> {
        match self.stream.as_mut() {
            Some(stream) => Box::new(FrameIter {
                stream,
                next_index: 0,
                state: DrainState::Reading,
            }),
            None => Box::new(std::iter::once(Err("FfmpegReader: not opened".into()))),
        }
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

#[derive(Clone, Copy, PartialEq)]
enum DrainState {
    Reading,
    Flushing,
    Done,
}

struct FrameIter<'a> {
    stream: &'a mut OpenStream,
    next_index: usize,
    state: DrainState,
}

impl FrameIter<'_> {
    /// Next buffered picture from the decoder, converted to an RGB [`Frame`].
    fn receive(&mut self) -> Option<Result<Frame, DecodeError>> {
        let stream = &mut *self.stream;
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        stream.decoder.receive_frame(&mut decoded).ok()?;

        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = stream.scaler.run(&decoded, &mut rgb) {
            return Some(Err(Box::new(e)));
        }
        let (width, height) = (stream.decoder.width(), stream.decoder.height());
        let frame = Frame::new(packed_rgb(&rgb, width, height), width, height, 3, self.next_index);
        self.next_index += 1;
        Some(Ok(frame))
    }
}

impl Iterator for FrameIter<'_> {
    type Item = Result<Frame, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state == DrainState::Done {
                return None;
            }
            if let Some(result) = self.receive() {
                return Some(result);
            }
            if self.state == DrainState::Flushing {
                self.state = DrainState::Done;
                continue;
            }

            match self.stream.input.packets().next() {
                Some((packet_stream, packet)) => {
                    if packet_stream.index() != self.stream.stream_index {
                        continue;
                    }
                    if let Err(e) = self.stream.decoder.send_packet(&packet) {
                        log::warn!("Skipping undecodable packet: {e}");
                    }
                }
                None => {
                    let _ = self.stream.decoder.send_eof();
                    self.state = DrainState::Flushing;
                }
            }
        }
    }
}

/// Row-by-row copy that drops ffmpeg's per-row stride padding.
fn packed_rgb(rgb: &ffmpeg_next::util::frame::video::Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let row_bytes = width as usize * 3;
    rgb.data(0)
        .chunks(stride)
        .take(height as usize)
        .flat_map(|row| &row[..row_bytes])
        .copied()
        .collect()
}
