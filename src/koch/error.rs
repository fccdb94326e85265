use thiserror::Error;

/// Errors produced while validating a fractal request or building geometry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KochError {
    #[error("{0}")]
    InvalidMode(String),

    #[error("side must be 'left' or 'right', got '{0}'")]
    InvalidSide(String),

    #[error("order must be a non-negative integer, got '{0}'")]
    InvalidOrder(String),

    #[error("order {order} exceeds the maximum of {max}")]
    OrderTooLarge { order: String, max: u32 },

    #[error("a polyline needs at least 2 points, got {0}")]
    DegeneratePolyline(usize),

    #[error("point count overflows at order {0}")]
    PointCountOverflow(u32),
}

pub type KochResult<T> = Result<T, KochError>;
