//! Base shapes of the Koch family and their refined output

use super::error::{KochError, KochResult};
use super::point::Point;
use super::polyline::Polyline;
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Which side of the triangle the half-snowflake is built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl FromStr for Side {
    type Err = KochError;

    fn from_str(s: &str) -> KochResult<Self> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(KochError::InvalidSide(other.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Single horizontal segment
    Curve,
    /// Closed equilateral triangle
    Snowflake,
    /// One or two sides of the snowflake triangle
    Half(Side),
}

impl Shape {
    /// Order-0 polyline for this shape at the given linear size
    pub fn base(self, scale: f64) -> Polyline {
        let points = match self {
            Self::Curve => vec![Point::ORIGIN, Point::new(scale, 0.0)],
            Self::Snowflake => {
                let [v0, v1, v2] = triangle(scale);
                vec![v0, v1, v2, v0]
            }
            // Left keeps one edge, right keeps two.
            Self::Half(Side::Left) => {
                let [v0, v1, _] = triangle(scale);
                vec![v0, v1]
            }
            Self::Half(Side::Right) => {
                let [v0, v1, v2] = triangle(scale);
                vec![v1, v2, v0]
            }
        };
        Polyline::from_vertices(points)
    }

    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Snowflake)
    }

    /// Base polyline refined `order` times
    pub fn generate(self, order: u32, scale: f64) -> Polyline {
        self.base(scale).refine(order)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Curve => f.write_str("curve"),
            Self::Snowflake => f.write_str("snowflake"),
            Self::Half(side) => write!(f, "half-{side}"),
        }
    }
}

/// Vertices at angles 0, 120 and 240 degrees on a circle of radius `scale`
fn triangle(scale: f64) -> [Point; 3] {
    [0.0, 2.0 * PI / 3.0, 4.0 * PI / 3.0].map(|angle| Point::from_polar(scale, angle))
}

/// Wire form of a polyline: index-aligned x and y arrays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coordinates {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl From<Polyline> for Coordinates {
    fn from(poly: Polyline) -> Self {
        let (x, y) = poly.into_xy();
        Self { x, y }
    }
}
