use crate::error::{TinError, TinResult};
use crate::mesh::Mesh;
use crate::point::{ControlPoint, Point};
use nalgebra::{Matrix3, Vector3};
use tracing::{trace, warn};

/// An affine map of the plane stored as a 3×3 matrix acting on homogeneous
/// column vectors `(x, y, 1)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AffineMap {
    matrix: Matrix3<f64>,
}

impl AffineMap {
    /// The map taking each point of `from` to the matching point of `to`.
    /// Returns `None` when `from` has no area, as then no such map exists.
    pub fn from_triangle(from: [Point; 3], to: [Point; 3]) -> Option<Self> {
        let from = homogeneous(from);
        let to = homogeneous(to);
        let inverse = from.try_inverse()?;
        let matrix = to * inverse;
        if matrix.iter().all(|v| v.is_finite()) {
            Some(Self { matrix })
        } else {
            None
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        let v = self.matrix * Vector3::new(p.x, p.y, 1.0);
        Point::new(v.x, v.y)
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }
}

/// Three points as the columns of a matrix, each with a trailing 1.
fn homogeneous([a, b, c]: [Point; 3]) -> Matrix3<f64> {
    Matrix3::from_columns(&[
        Vector3::new(a.x, a.y, 1.0),
        Vector3::new(b.x, b.y, 1.0),
        Vector3::new(c.x, c.y, 1.0),
    ])
}

/// z component of the cross product of two vectors.
fn cross(u: Point, v: Point) -> f64 {
    u.x * v.y - u.y * v.x
}

/// Finds the triangle holding a target-space point and maps it to source
/// space. Vertex ids in `mesh` index into `control_points`, and the mesh is
/// expected to have been built from the target coordinates.
#[derive(Copy, Clone, Debug)]
pub struct AffineLocator<'a> {
    mesh: &'a Mesh,
    control_points: &'a [ControlPoint],
}

impl<'a> AffineLocator<'a> {
    pub fn new(mesh: &'a Mesh, control_points: &'a [ControlPoint]) -> Self {
        Self {
            mesh,
            control_points,
        }
    }

    fn edge_products(&self, t: usize, q: Point) -> [f64; 3] {
        let [a, b, c] = self.mesh.triangle(t);
        let p1 = self.control_points[a].target;
        let p2 = self.control_points[b].target;
        let p3 = self.control_points[c].target;
        [
            cross(p2 - p1, q - p2),
            cross(p3 - p2, q - p3),
            cross(p1 - p3, q - p1),
        ]
    }

    /// The first triangle, in mesh order, that contains `q`. Triangles with
    /// `q` strictly inside are preferred; failing that, the first triangle
    /// with `q` on one of its edges or vertices.
    pub fn find_triangle(&self, q: Point) -> Option<usize> {
        let strict = (0..self.mesh.len()).find(|&t| {
            let products = self.edge_products(t, q);
            products.iter().all(|&c| c > 0.0) || products.iter().all(|&c| c < 0.0)
        });
        strict.or_else(|| {
            (0..self.mesh.len()).find(|&t| {
                let products = self.edge_products(t, q);
                let all_zero = products.iter().all(|&c| c == 0.0);
                !all_zero
                    && (products.iter().all(|&c| c >= 0.0) || products.iter().all(|&c| c <= 0.0))
            })
        })
    }

    /// The map from target space to source space over triangle `t`.
    pub fn affine_map(&self, t: usize) -> TinResult<AffineMap> {
        let vertices = self.mesh.triangle(t);
        let target = vertices.map(|v| self.control_points[v].target);
        let source = vertices.map(|v| self.control_points[v].source);
        AffineMap::from_triangle(target, source).ok_or_else(|| {
            warn!(triangle = t, "triangle has no affine inverse");
            TinError::DegenerateTriangle { triangle: t }
        })
    }

    /// The source-space position of the target-space point `q`, or `None`
    /// when `q` lies outside the mesh.
    pub fn locate(&self, q: Point) -> TinResult<Option<Point>> {
        let t = match self.find_triangle(q) {
            Some(t) => t,
            None => {
                trace!(%q, "query outside the mesh");
                return Ok(None);
            }
        };
        // Finite, since the map is finite and q is inside the triangle.
        let p = self.affine_map(t)?.apply(q);
        trace!(%q, triangle = t, source = %p, "located");
        Ok(Some(p))
    }
}
