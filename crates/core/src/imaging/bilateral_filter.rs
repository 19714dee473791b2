use crate::shared::frame::Frame;

/// Edge-preserving smoothing of a single-channel frame.
///
/// Each output pixel is a weighted mean over a circular window of the given
/// `diameter`; weights fall off with both spatial distance (`sigma_space`)
/// and intensity difference (`sigma_color`), so strong edges survive while
/// flat regions are denoised. Borders are handled by edge replication.
pub fn bilateral_filter(gray: &Frame, diameter: u32, sigma_color: f64, sigma_space: f64) -> Frame {
    debug_assert_eq!(gray.channels(), 1, "bilateral_filter expects a gray frame");
    let w = gray.width() as usize;
    let h = gray.height() as usize;
    let radius = (diameter / 2).max(1) as isize;
    if w == 0 || h == 0 {
        return gray.clone();
    }

    let color_weights = color_weight_table(sigma_color);
    let window = spatial_window(radius, sigma_space);

    let src = gray.data();
    let mut out = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let centre = src[y * w + x];
            let mut sum = 0.0f64;
            let mut norm = 0.0f64;
            for &(dx, dy, spatial) in &window {
                let sx = (x as isize + dx).clamp(0, w as isize - 1) as usize;
                let sy = (y as isize + dy).clamp(0, h as isize - 1) as usize;
                let value = src[sy * w + sx];
                let weight = spatial * color_weights[centre.abs_diff(value) as usize];
                sum += value as f64 * weight;
                norm += weight;
            }
            out[y * w + x] = (sum / norm).round().clamp(0.0, 255.0) as u8;
        }
    }
    Frame::new(out, gray.width(), gray.height(), 1, gray.index())
}

fn color_weight_table(sigma_color: f64) -> [f64; 256] {
    let coeff = -0.5 / (sigma_color * sigma_color);
    let mut table = [0.0f64; 256];
    for (diff, weight) in table.iter_mut().enumerate() {
        *weight = (coeff * (diff * diff) as f64).exp();
    }
    table
}

/// `(dx, dy, weight)` for every offset inside the circular window.
fn spatial_window(radius: isize, sigma_space: f64) -> Vec<(isize, isize, f64)> {
    let coeff = -0.5 / (sigma_space * sigma_space);
    let mut window = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let dist2 = (dx * dx + dy * dy) as f64;
            if dist2.sqrt() > radius as f64 {
                continue;
            }
            window.push((dx, dy, (coeff * dist2).exp()));
        }
    }
    window
}
