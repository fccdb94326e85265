//! Polyline type and the refinement passes applied to it

use super::error::{KochError, KochResult};
use super::point::Point;
use super::segment::subdivide;

/// Ordered path of at least two points
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> KochResult<Self> {
        if points.len() < 2 {
            return Err(KochError::DegeneratePolyline(points.len()));
        }
        Ok(Self { points })
    }

    /// Build from vertices already known to hold at least two points
    pub(super) fn from_vertices(points: Vec<Point>) -> Self {
        debug_assert!(points.len() >= 2);
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// A polyline is never empty
    pub const fn is_empty(&self) -> bool {
        false
    }

    pub fn first(&self) -> Point {
        self.points[0]
    }

    pub fn last(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    pub fn is_closed(&self) -> bool {
        self.first() == self.last()
    }

    /// Split into parallel x and y sequences
    pub fn into_xy(self) -> (Vec<f64>, Vec<f64>) {
        self.points.into_iter().map(|p| (p.x, p.y)).unzip()
    }

    /// One refinement pass: every edge becomes four edges.
    ///
    /// Each subdivision's leading point equals the previous edge's end, so it
    /// is skipped. First and last points are carried over untouched.
    #[must_use]
    pub fn refine_once(&self) -> Self {
        let mut refined = Vec::with_capacity(4 * (self.points.len() - 1) + 1);
        refined.push(self.points[0]);
        for edge in self.points.windows(2) {
            let seg = subdivide(edge[0], edge[1]);
            refined.extend_from_slice(&seg[1..]);
        }
        Self { points: refined }
    }

    /// Apply `order` refinement passes; order 0 returns the input unchanged
    #[must_use]
    pub fn refine(self, order: u32) -> Self {
        (0..order).fold(self, |poly, _| poly.refine_once())
    }
}

/// Number of points after refining a `base_len`-point polyline `order` times
pub fn point_count(base_len: usize, order: u32) -> KochResult<usize> {
    4_usize
        .checked_pow(order)
        .and_then(|factor| base_len.saturating_sub(1).checked_mul(factor))
        .and_then(|n| n.checked_add(1))
        .ok_or(KochError::PointCountOverflow(order))
}
