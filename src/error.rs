use thiserror::Error;

/// Errors that can occur while triangulating control points or mapping a
/// point through the resulting mesh.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TinError {
    /// Fewer than three distinct, non-collinear points.
    #[error("no triangulation exists for this input")]
    NoTriangulation,

    /// The advancing hull has no edge visible from the point being inserted.
    /// This only happens for ill-conditioned input.
    #[error("no visible hull edge for point {index}, something is wrong with the input points")]
    VisibleEdgeNotFound { index: usize },

    /// An input coordinate is NaN or infinite.
    #[error("point {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    /// The triangle holding the query point has no invertible affine map.
    #[error("triangle {triangle} is degenerate and has no affine inverse")]
    DegenerateTriangle { triangle: usize },

    /// A control point index that doesn't exist.
    #[error("control point {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type TinResult<T> = std::result::Result<T, TinError>;
