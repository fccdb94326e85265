//! Koch fractal geometry
//!
//! Pure computational core: segment subdivision, polyline refinement and the
//! base shapes of the curve family. Nothing here performs I/O.

mod error;
mod point;
mod polyline;
mod segment;
mod shape;

pub use error::{KochError, KochResult};
pub use point::Point;
pub use polyline::{point_count, Polyline};
pub use segment::subdivide;
pub use shape::{Coordinates, Shape, Side};
