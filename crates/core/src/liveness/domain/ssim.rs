//! Mean structural similarity between two grayscale images.
//!
//! Local statistics come from a 7×7 uniform window with sample covariance,
//! and the mean is taken only over window positions that lie fully inside
//! the image.

use ndarray::Array2;
use thiserror::Error;

pub const WINDOW_SIZE: usize = 7;
const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

#[derive(Error, Debug, PartialEq)]
pub enum SsimError {
    #[error("image shapes differ: {0:?} vs {1:?}")]
    ShapeMismatch((usize, usize), (usize, usize)),
    #[error("image {0:?} is smaller than the 7x7 comparison window")]
    TooSmall((usize, usize)),
}

pub fn structural_similarity(a: &Array2<f64>, b: &Array2<f64>) -> Result<f64, SsimError> {
    let shape_a = a.dim();
    let shape_b = b.dim();
    if shape_a != shape_b {
        return Err(SsimError::ShapeMismatch(shape_a, shape_b));
    }
    let (rows, cols) = shape_a;
    if rows < WINDOW_SIZE || cols < WINDOW_SIZE {
        return Err(SsimError::TooSmall(shape_a));
    }

    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);
    let n = (WINDOW_SIZE * WINDOW_SIZE) as f64;
    let cov_norm = n / (n - 1.0);

    let mut total = 0.0;
    let mut positions = 0usize;
    for top in 0..=rows - WINDOW_SIZE {
        for left in 0..=cols - WINDOW_SIZE {
            let (mut sa, mut sb, mut saa, mut sbb, mut sab) = (0.0, 0.0, 0.0, 0.0, 0.0);
            for r in top..top + WINDOW_SIZE {
                for c in left..left + WINDOW_SIZE {
                    let (x, y) = (a[[r, c]], b[[r, c]]);
                    sa += x;
                    sb += y;
                    saa += x * x;
                    sbb += y * y;
                    sab += x * y;
                }
            }
            let (ux, uy) = (sa / n, sb / n);
            let vx = cov_norm * (saa / n - ux * ux);
            let vy = cov_norm * (sbb / n - uy * uy);
            let vxy = cov_norm * (sab / n - ux * uy);

            let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
            let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            total += numerator / denominator;
            positions += 1;
        }
    }

    Ok(total / positions as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gradient(rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(r, c)| ((r * 7 + c * 3) % 256) as f64)
    }

    #[test]
    fn test_identical_images_score_one() {
        let img = gradient(20, 24);
        assert_relative_eq!(structural_similarity(&img, &img).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_constant_images_score_one() {
        let img = Array2::from_elem((10, 10), 80.0);
        assert_relative_eq!(structural_similarity(&img, &img).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inverted_image_scores_low() {
        let img = gradient(30, 30);
        let inverted = img.mapv(|v| 255.0 - v);
        let score = structural_similarity(&img, &inverted).unwrap();
        assert!(score < 0.1, "score {score}");
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = gradient(16, 16);
        let b = a.mapv(|v| (v * 0.8 + 10.0).min(255.0));
        let ab = structural_similarity(&a, &b).unwrap();
        let ba = structural_similarity(&b, &a).unwrap();
        assert_relative_eq!(ab, ba, epsilon = 1e-12);
        assert!(ab < 1.0);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = structural_similarity(&gradient(10, 10), &gradient(10, 12)).unwrap_err();
        assert_eq!(err, SsimError::ShapeMismatch((10, 10), (10, 12)));
    }

    #[test]
    fn test_too_small_rejected() {
        let img = gradient(6, 20);
        assert_eq!(
            structural_similarity(&img, &img).unwrap_err(),
            SsimError::TooSmall((6, 20))
        );
    }
}
