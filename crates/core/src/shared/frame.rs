use ndarray::{Array2, ArrayView3};

use crate::shared::region::Region;

/// A single decoded image: contiguous bytes in row-major order.
///
/// Colour frames are RGB (3 channels); preprocessing stages produce
/// single-channel grayscale frames with the same layout rules.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Converts to single-channel luma (BT.601 weights). Gray frames are
    /// returned unchanged.
    pub fn to_gray(&self) -> Frame {
        if self.channels == 1 {
            return self.clone();
        }
        let channels = self.channels as usize;
        let data = self
            .data
            .chunks_exact(channels)
            .map(|px| {
                let luma = 0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64;
                luma.round().clamp(0.0, 255.0) as u8
            })
            .collect();
        Frame::new(data, self.width, self.height, 1, self.index)
    }

    /// Copies the pixels inside `region`, clamped to the frame bounds.
    pub fn crop(&self, region: &Region) -> Frame {
        let fw = self.width as i32;
        let fh = self.height as i32;
        let x1 = region.x.clamp(0, fw) as usize;
        let y1 = region.y.clamp(0, fh) as usize;
        let x2 = (region.x + region.width).clamp(0, fw) as usize;
        let y2 = (region.y + region.height).clamp(0, fh) as usize;

        let channels = self.channels as usize;
        let row_bytes = self.width as usize * channels;
        let crop_w = x2.saturating_sub(x1);
        let crop_h = y2.saturating_sub(y1);

        let mut data = Vec::with_capacity(crop_w * crop_h * channels);
        for row in y1..y1 + crop_h {
            let start = row * row_bytes + x1 * channels;
            data.extend_from_slice(&self.data[start..start + crop_w * channels]);
        }
        Frame::new(data, crop_w as u32, crop_h as u32, self.channels, self.index)
    }

    /// Resamples to exactly `width × height` with a triangle filter.
    pub fn resized(&self, width: u32, height: u32) -> Frame {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let data = match self.channels {
            1 => {
                let img = image::GrayImage::from_raw(self.width, self.height, self.data.clone())
                    .expect("Frame data length must match dimensions");
                image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle)
                    .into_raw()
            }
            _ => {
                let img = image::RgbImage::from_raw(self.width, self.height, self.data.clone())
                    .expect("Frame data length must match dimensions");
                image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle)
                    .into_raw()
            }
        };
        Frame::new(data, width, height, self.channels, self.index)
    }

    /// Luma plane as a float matrix indexed `[row, col]`.
    pub fn to_gray_matrix(&self) -> Array2<f64> {
        let gray = self.to_gray();
        Array2::from_shape_fn((gray.height as usize, gray.width as usize), |(r, c)| {
            gray.data[r * gray.width as usize + c] as f64
        })
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
