//! 2-D point type used by the subdivision core

use std::ops::{Add, Div, Mul, Sub};

/// A point in the plane, also used as a displacement vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from the origin, `angle` radians counter-clockwise from +x
    pub fn from_polar(radius: f64, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(radius * cos, radius * sin)
    }

    /// Rotate around the origin by `angle` radians (counter-clockwise)
    #[must_use]
    pub fn rotate(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            self.x.mul_add(cos, -(self.y * sin)),
            self.x.mul_add(sin, self.y * cos),
        )
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, PI};

    #[test]
    fn test_vector_ops() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, -1.0);
        assert_eq!(a + b, Point::new(5.0, 1.0));
        assert_eq!(b - a, Point::new(3.0, -3.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0));
        assert_eq!(b / 2.0, Point::new(2.0, -0.5));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let p = Point::new(1.0, 0.0).rotate(FRAC_PI_2);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_sixty_degrees() {
        let p = Point::new(3.0, 0.0).rotate(FRAC_PI_3);
        assert_abs_diff_eq!(p.x, 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 3.0 * (3.0_f64).sqrt() / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_polar() {
        let p = Point::from_polar(10.0, PI);
        assert_abs_diff_eq!(p.x, -10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-12);
    }
}
