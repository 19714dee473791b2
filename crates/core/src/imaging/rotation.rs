use crate::shared::frame::Frame;

/// Rotates `frame` counter-clockwise by `degrees` about its centre.
///
/// The output canvas is enlarged so the whole rotated content fits
/// (`h·|sin| + w·|cos|` by `h·|cos| + w·|sin|`). Multiples of 90° are an exact
/// pixel permutation; other angles use bilinear sampling with black fill.
pub fn rotate_without_cropping(frame: &Frame, degrees: i32) -> Frame {
    match degrees.rem_euclid(360) {
        0 => frame.clone(),
        90 => rotate_right_angle(frame, Quarter::Ccw90),
        180 => rotate_right_angle(frame, Quarter::Half),
        270 => rotate_right_angle(frame, Quarter::Ccw270),
        other => rotate_bilinear(frame, other as f64),
    }
}

/// Output canvas size for a rotation of `degrees`.
pub fn rotated_canvas(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let (w, h) = (width as f64, height as f64);
    // Round away float noise before truncating (cos 90° is ~6e-17, not 0).
    let new_w = (h * sin + w * cos + 1e-9).floor() as u32;
    let new_h = (h * cos + w * sin + 1e-9).floor() as u32;
    (new_w, new_h)
}

#[derive(Clone, Copy)]
enum Quarter {
    Ccw90,
    Half,
    Ccw270,
}

fn rotate_right_angle(frame: &Frame, quarter: Quarter) -> Frame {
    let (width, height) = (frame.width(), frame.height());
    let data = frame.data().to_vec();
    let (new_w, new_h, data) = match frame.channels() {
        1 => {
            let img = image::GrayImage::from_raw(width, height, data)
                .expect("Frame data length must match dimensions");
            quarter_turn(&img, quarter)
        }
        _ => {
            let img = image::RgbImage::from_raw(width, height, data)
                .expect("Frame data length must match dimensions");
            quarter_turn(&img, quarter)
        }
    };
    Frame::new(data, new_w, new_h, frame.channels(), frame.index())
}

/// `imageops` turns clockwise, so a counter-clockwise quarter is `rotate270`.
fn quarter_turn<P>(img: &image::ImageBuffer<P, Vec<u8>>, quarter: Quarter) -> (u32, u32, Vec<u8>)
where
    P: image::Pixel<Subpixel = u8> + 'static,
{
    let turned = match quarter {
        Quarter::Ccw90 => image::imageops::rotate270(img),
        Quarter::Half => image::imageops::rotate180(img),
        Quarter::Ccw270 => image::imageops::rotate90(img),
    };
    (turned.width(), turned.height(), turned.into_raw())
}

fn rotate_bilinear(frame: &Frame, degrees: f64) -> Frame {
    let w = frame.width() as usize;
    let h = frame.height() as usize;
    let c = frame.channels() as usize;
    let src = frame.data();

    let (new_w, new_h) = rotated_canvas(frame.width(), frame.height(), degrees);
    let (new_w, new_h) = (new_w as usize, new_h as usize);

    let theta = degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let (src_cx, src_cy) = (w as f64 / 2.0, h as f64 / 2.0);
    let (dst_cx, dst_cy) = (new_w as f64 / 2.0, new_h as f64 / 2.0);

    let mut data = vec![0u8; new_w * new_h * c];
    for yd in 0..new_h {
        for xd in 0..new_w {
            let dx = xd as f64 + 0.5 - dst_cx;
            let dy = yd as f64 + 0.5 - dst_cy;
            // Inverse of the counter-clockwise forward map (y axis points down).
            let sx = cos * dx - sin * dy + src_cx - 0.5;
            let sy = sin * dx + cos * dy + src_cy - 0.5;
            if sx < -0.5 || sy < -0.5 || sx > w as f64 - 0.5 || sy > h as f64 - 0.5 {
                continue;
            }

            let x0 = sx.floor().max(0.0) as usize;
            let y0 = sy.floor().max(0.0) as usize;
            let x1 = (x0 + 1).min(w - 1);
            let y1 = (y0 + 1).min(h - 1);
            let fx = (sx - x0 as f64).clamp(0.0, 1.0);
            let fy = (sy - y0 as f64).clamp(0.0, 1.0);

            let d = (yd * new_w + xd) * c;
            for ch in 0..c {
                let p00 = src[(y0 * w + x0) * c + ch] as f64;
                let p10 = src[(y0 * w + x1) * c + ch] as f64;
                let p01 = src[(y1 * w + x0) * c + ch] as f64;
                let p11 = src[(y1 * w + x1) * c + ch] as f64;
                let top = p00 + (p10 - p00) * fx;
                let bottom = p01 + (p11 - p01) * fx;
                data[d + ch] = (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    Frame::new(data, new_w as u32, new_h as u32, frame.channels(), frame.index())
}
