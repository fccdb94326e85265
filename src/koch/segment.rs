//! Koch generator step on a single segment

use super::point::Point;
use std::f64::consts::FRAC_PI_3;

/// Replace the segment `p0 -> p1` with four segments bulging outward on the middle third.
///
/// Returns `[p0, one_third, peak, two_thirds, p1]`. The peak is the apex of the
/// equilateral triangle erected on the middle third, on the left of the
/// direction of travel.
pub fn subdivide(p0: Point, p1: Point) -> [Point; 5] {
    let v = p1 - p0;
    let one_third = p0 + v / 3.0;
    let two_thirds = p0 + v * 2.0 / 3.0;
    let peak = one_third + (v / 3.0).rotate(FRAC_PI_3);
    [p0, one_third, peak, two_thirds, p1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_horizontal_segment() {
        let [a, b, c, d, e] = subdivide(Point::ORIGIN, Point::new(10.0, 0.0));
        assert_eq!(a, Point::ORIGIN);
        assert_eq!(e, Point::new(10.0, 0.0));
        assert_abs_diff_eq!(b.x, 10.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.x, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y, 10.0 / 3.0 * (3.0_f64).sqrt() / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.x, 20.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bump_is_equilateral() {
        let p0 = Point::new(-2.0, 1.0);
        let p1 = Point::new(4.0, 7.0);
        let [_, a, peak, b, _] = subdivide(p0, p1);
        let len = |v: Point| v.x.hypot(v.y);
        let third = len(p1 - p0) / 3.0;
        assert_abs_diff_eq!(len(peak - a), third, epsilon = 1e-12);
        assert_abs_diff_eq!(len(b - peak), third, epsilon = 1e-12);
        assert_abs_diff_eq!(len(b - a), third, epsilon = 1e-12);
    }

    #[test]
    fn test_reversed_segment_bulges_other_way() {
        let [_, _, peak, _, _] = subdivide(Point::new(10.0, 0.0), Point::ORIGIN);
        assert!(peak.y < 0.0);
    }
}
