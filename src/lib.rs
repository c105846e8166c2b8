mod edge_hash;
pub mod error;
mod hull;
pub mod locator;
pub mod mesh;
pub mod point;
pub mod predicates;
mod sort;
pub mod tin;
pub mod triangulator;

pub use error::{TinError, TinResult};
pub use locator::{AffineLocator, AffineMap};
pub use mesh::{Mesh, EMPTY};
pub use point::{ControlPoint, Point};
pub use tin::{Bounds, RenderBuffers, Tin};
pub use triangulator::{triangulate, Triangulator};
