/// An axis-aligned bounding box in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    /// Grows the box by `margin` pixels on every side, clamped to a
    /// `frame_width × frame_height` canvas.
    pub fn expanded(&self, margin: i32, frame_width: u32, frame_height: u32) -> Region {
        let x1 = (self.x - margin).max(0);
        let y1 = (self.y - margin).max(0);
        let x2 = (self.x + self.width + margin).min(frame_width as i32);
        let y2 = (self.y + self.height + margin).min(frame_height as i32);
        Region {
            x: x1,
            y: y1,
            width: (x2 - x1).max(0),
            height: (y2 - y1).max(0),
        }
    }

    pub fn iou(&self, other: &Region) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.width as f64 * self.height as f64;
        let area_b = other.width as f64 * other.height as f64;
        inter / (area_a + area_b - inter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn region(x: i32, y: i32, w: i32, h: i32) -> Region {
        Region {
            x,
            y,
            width: w,
            height: h,
        }
    }

    #[test]
    fn test_area() {
        assert_eq!(region(5, 5, 20, 10).area(), 200);
        assert_eq!(region(0, 0, -3, 10).area(), 0);
    }

    #[test]
    fn test_expanded_inside_frame() {
        let r = region(100, 100, 50, 60).expanded(50, 640, 480);
        assert_eq!(r, region(50, 50, 150, 160));
    }

    #[test]
    fn test_expanded_clamps_at_edges() {
        // Face near the top-left corner of a 200x150 frame
        let r = region(10, 20, 80, 80).expanded(50, 200, 150);
        assert_eq!(r, region(0, 0, 140, 150));
    }

    #[test]
    fn test_iou_identical_regions() {
        let a = region(10, 10, 100, 100);
        assert_relative_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        // intersection 50*100, union 15000
        let a = region(0, 0, 100, 100);
        let b = region(50, 0, 100, 100);
        assert_relative_eq!(a.iou(&b), 5000.0 / 15000.0);
    }

    #[rstest]
    #[case::no_overlap(region(0, 0, 50, 50), region(100, 100, 50, 50))]
    #[case::touching_edges(region(0, 0, 50, 50), region(50, 0, 50, 50))]
    #[case::zero_width(region(0, 0, 0, 100), region(0, 0, 50, 50))]
    fn test_iou_disjoint_is_zero(#[case] a: Region, #[case] b: Region) {
        assert_relative_eq!(a.iou(&b), 0.0);
    }
}
