use crate::error::{TinError, TinResult};
use crate::locator::AffineLocator;
use crate::mesh::Mesh;
use crate::point::{ControlPoint, Point};
use crate::triangulator::triangulate;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use tracing::debug;

/// A triangulated irregular network over a set of ground control points.
///
/// The mesh is built from the target coordinates and every edit rebuilds it
/// from scratch. If an edit leaves points that can't be triangulated the
/// `Tin` keeps its previous state. Only the control points are serialized.
///
/// ```
/// use tinwarp::{ControlPoint, Point, Tin};
///
/// let tin = Tin::new(vec![
///     ControlPoint::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0)),
///     ControlPoint::new(Point::new(256.0, 0.0), Point::new(20.0, 10.0)),
///     ControlPoint::new(Point::new(256.0, 256.0), Point::new(20.0, 20.0)),
///     ControlPoint::new(Point::new(0.0, 256.0), Point::new(10.0, 20.0)),
/// ])?;
/// let pixel = tin.target_to_source(Point::new(15.0, 12.5))?.unwrap();
/// assert!((pixel.x - 128.0).abs() < 1e-9);
/// assert!((pixel.y - 64.0).abs() < 1e-9);
/// # Ok::<(), tinwarp::TinError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialize",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<ControlPoint>", into = "Vec<ControlPoint>")
)]
pub struct Tin {
    control_points: Vec<ControlPoint>,
    mesh: Mesh,
}

impl Tin {
    pub fn new(control_points: Vec<ControlPoint>) -> TinResult<Self> {
        let mesh = build_mesh(&control_points)?;
        Ok(Self {
            control_points,
            mesh,
        })
    }

    pub fn control_points(&self) -> &[ControlPoint] {
        &self.control_points
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn locator(&self) -> AffineLocator<'_> {
        AffineLocator::new(&self.mesh, &self.control_points)
    }

    /// Map a target-space point to source space. `None` if the point is
    /// outside the convex hull of the control points.
    pub fn target_to_source(&self, q: Point) -> TinResult<Option<Point>> {
        self.locator().locate(q)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.control_points.iter().map(|cp| cp.target))
    }

    /// Flat vertex buffers with three entries per triangle, ready to upload
    /// for piecewise-affine rendering of the source image.
    pub fn render_buffers(&self) -> RenderBuffers {
        let n = self.mesh.triangles.len();
        let mut buffers = RenderBuffers {
            positions: Vec::with_capacity(2 * n),
            tex_coords: Vec::with_capacity(2 * n),
        };
        for &v in &self.mesh.triangles {
            let cp = self.control_points[v];
            buffers.positions.push(cp.target.x as f32);
            buffers.positions.push(cp.target.y as f32);
            buffers.tex_coords.push(cp.source.x as f32);
            buffers.tex_coords.push(cp.source.y as f32);
        }
        buffers
    }

    /// Pin the current mapping at `q`: add a control point with target `q`
    /// and the source `q` maps to now. Does nothing and returns `None` when
    /// `q` is outside the mesh.
    pub fn add_at_target(&mut self, q: Point) -> TinResult<Option<ControlPoint>> {
        let source = match self.target_to_source(q)? {
            Some(source) => source,
            None => return Ok(None),
        };
        let control_point = ControlPoint::new(source, q);
        self.add_control_point(control_point)?;
        Ok(Some(control_point))
    }

    pub fn add_control_point(&mut self, control_point: ControlPoint) -> TinResult<()> {
        let mut control_points = self.control_points.clone();
        control_points.push(control_point);
        self.replace(control_points)
    }

    /// Move the target of an existing control point, keeping its source.
    pub fn move_target(&mut self, index: usize, target: Point) -> TinResult<()> {
        self.check_index(index)?;
        let mut control_points = self.control_points.clone();
        control_points[index].target = target;
        self.replace(control_points)
    }

    /// Remove a control point. The ids of the control points after it shift
    /// down by one.
    pub fn remove_control_point(&mut self, index: usize) -> TinResult<ControlPoint> {
        self.check_index(index)?;
        let mut control_points = self.control_points.clone();
        let removed = control_points.remove(index);
        self.replace(control_points)?;
        Ok(removed)
    }

    fn check_index(&self, index: usize) -> TinResult<()> {
        let len = self.control_points.len();
        if index < len {
            Ok(())
        } else {
            Err(TinError::IndexOutOfRange { index, len })
        }
    }

    fn replace(&mut self, control_points: Vec<ControlPoint>) -> TinResult<()> {
        let mesh = build_mesh(&control_points)?;
        self.control_points = control_points;
        self.mesh = mesh;
        Ok(())
    }
}

impl TryFrom<Vec<ControlPoint>> for Tin {
    type Error = TinError;

    fn try_from(control_points: Vec<ControlPoint>) -> TinResult<Self> {
        Tin::new(control_points)
    }
}

impl From<Tin> for Vec<ControlPoint> {
    fn from(tin: Tin) -> Self {
        tin.control_points
    }
}

fn build_mesh(control_points: &[ControlPoint]) -> TinResult<Mesh> {
    if let Some(index) = control_points.iter().position(|cp| !cp.source.is_finite()) {
        return Err(TinError::NonFiniteCoordinate { index });
    }
    let targets: Vec<Point> = control_points.iter().map(|cp| cp.target).collect();
    let mesh = triangulate(&targets)?;
    debug!(
        control_points = control_points.len(),
        triangles = mesh.len(),
        "rebuilt tin"
    );
    Ok(mesh)
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// The smallest box holding all of `points`. With no points the box is
    /// inverted (min at +inf, max at -inf) and contains nothing.
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Self {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self { min, max }
    }

    /// Inclusive of the edges.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderBuffers {
    /// Target-space x, y per vertex.
    pub positions: Vec<f32>,
    /// Source-space x, y per vertex.
    pub tex_coords: Vec<f32>,
}

impl RenderBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn cp(sx: f64, sy: f64, tx: f64, ty: f64) -> ControlPoint {
        ControlPoint::new(Point::new(sx, sy), Point::new(tx, ty))
    }

    fn unit_square() -> Tin {
        Tin::new(vec![
            ControlPoint::identity(Point::new(0.0, 0.0)),
            ControlPoint::identity(Point::new(1.0, 0.0)),
            ControlPoint::identity(Point::new(1.0, 1.0)),
            ControlPoint::identity(Point::new(0.0, 1.0)),
        ])
        .unwrap()
    }

    /// An image of 640 by 480 pixels pinned to a rotated, scaled and shifted
    /// quadrilateral, with a few interior control points that bend it.
    fn warped() -> Tin {
        Tin::new(vec![
            cp(0.0, 0.0, 10.0, 20.0),
            cp(640.0, 0.0, 70.0, 15.0),
            cp(640.0, 480.0, 75.0, 62.0),
            cp(0.0, 480.0, 8.0, 66.0),
            cp(320.0, 240.0, 43.0, 40.0),
            cp(100.0, 400.0, 20.0, 59.0),
            cp(500.0, 100.0, 58.0, 25.0),
        ])
        .unwrap()
    }

    #[test]
    fn unit_square_identity() {
        let tin = unit_square();
        assert_eq!(tin.mesh().len(), 2);
        let p = tin.target_to_source(Point::new(0.5, 0.5)).unwrap().unwrap();
        assert_relative_eq!(p.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn minimal_triangle() {
        let tin = Tin::new(vec![
            cp(0.0, 0.0, 0.0, 0.0),
            cp(1.0, 0.0, 2.0, 0.0),
            cp(0.0, 1.0, 0.0, 2.0),
        ])
        .unwrap();
        assert_eq!(tin.mesh().len(), 1);
        let p = tin.target_to_source(Point::new(0.5, 0.5)).unwrap().unwrap();
        assert_relative_eq!(p.x, 0.25, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn collinear_control_points() {
        let result = Tin::new(vec![
            ControlPoint::identity(Point::new(0.0, 0.0)),
            ControlPoint::identity(Point::new(1.0, 1.0)),
            ControlPoint::identity(Point::new(2.0, 2.0)),
        ]);
        assert_eq!(result, Err(TinError::NoTriangulation));
    }

    #[test]
    fn non_finite_source() {
        let result = Tin::new(vec![
            cp(0.0, 0.0, 0.0, 0.0),
            cp(f64::INFINITY, 0.0, 1.0, 0.0),
            cp(0.0, 1.0, 0.0, 1.0),
        ]);
        assert_eq!(result, Err(TinError::NonFiniteCoordinate { index: 1 }));
    }

    #[test]
    fn vertex_round_trip() {
        let tin = warped();
        for cp in tin.control_points() {
            let p = tin.target_to_source(cp.target).unwrap().unwrap();
            assert_relative_eq!(p.x, cp.source.x, epsilon = 1e-6);
            assert_relative_eq!(p.y, cp.source.y, epsilon = 1e-6);
        }
    }

    #[test]
    fn random_vertex_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        let control_points: Vec<ControlPoint> = (0..40)
            .map(|_| {
                cp(
                    rng.gen_range(0.0..1024.0),
                    rng.gen_range(0.0..1024.0),
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                )
            })
            .collect();
        let tin = Tin::new(control_points).unwrap();
        for cp in tin.control_points() {
            let p = tin.target_to_source(cp.target).unwrap().unwrap();
            assert_relative_eq!(p.x, cp.source.x, epsilon = 1e-6);
            assert_relative_eq!(p.y, cp.source.y, epsilon = 1e-6);
        }
    }

    #[test]
    fn outside_hull() {
        let tin = warped();
        assert_eq!(tin.target_to_source(Point::new(0.0, 0.0)), Ok(None));
        assert_eq!(tin.target_to_source(Point::new(100.0, 40.0)), Ok(None));
        // Inside the bounding box but outside the hull.
        let bounds = tin.bounds();
        let corner = Point::new(bounds.min.x, bounds.min.y);
        assert!(bounds.contains(corner));
        assert_eq!(tin.target_to_source(corner), Ok(None));
    }

    #[test]
    fn bounds_cover_targets() {
        let tin = warped();
        let bounds = tin.bounds();
        assert_eq!(bounds.min, Point::new(8.0, 15.0));
        assert_eq!(bounds.max, Point::new(75.0, 66.0));
        assert_eq!(bounds.width(), 67.0);
        assert_eq!(bounds.height(), 51.0);
        for cp in tin.control_points() {
            assert!(bounds.contains(cp.target));
        }
        assert!(!bounds.contains(Point::new(7.9, 30.0)));
        assert!(!Bounds::from_points(Vec::<Point>::new()).contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn render_buffers_follow_triangles() {
        let tin = warped();
        let buffers = tin.render_buffers();
        assert_eq!(buffers.vertex_count(), tin.mesh().triangles.len());
        assert_eq!(buffers.positions.len(), buffers.tex_coords.len());
        for (k, &v) in tin.mesh().triangles.iter().enumerate() {
            let cp = tin.control_points()[v];
            assert_eq!(buffers.positions[2 * k], cp.target.x as f32);
            assert_eq!(buffers.positions[2 * k + 1], cp.target.y as f32);
            assert_eq!(buffers.tex_coords[2 * k], cp.source.x as f32);
            assert_eq!(buffers.tex_coords[2 * k + 1], cp.source.y as f32);
        }
    }

    #[test]
    fn add_control_point_rebuilds() {
        let mut tin = unit_square();
        tin.add_control_point(cp(0.5, 0.5, 0.5, 0.4)).unwrap();
        assert_eq!(tin.control_points().len(), 5);
        assert_eq!(tin.mesh().len(), 4);
        let p = tin.target_to_source(Point::new(0.5, 0.4)).unwrap().unwrap();
        assert_relative_eq!(p.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn move_target_rebuilds() {
        let mut tin = unit_square();
        tin.move_target(2, Point::new(2.0, 2.0)).unwrap();
        assert_eq!(tin.control_points()[2].target, Point::new(2.0, 2.0));
        assert_eq!(tin.control_points()[2].source, Point::new(1.0, 1.0));
        let p = tin.target_to_source(Point::new(2.0, 2.0)).unwrap().unwrap();
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn remove_control_point_rebuilds() {
        let mut tin = unit_square();
        let removed = tin.remove_control_point(3).unwrap();
        assert_eq!(removed, ControlPoint::identity(Point::new(0.0, 1.0)));
        assert_eq!(tin.mesh().len(), 1);
        assert_eq!(tin.target_to_source(Point::new(0.1, 0.9)), Ok(None));
    }

    #[test]
    fn failed_edits_leave_tin_unchanged() {
        let before = Tin::new(vec![
            ControlPoint::identity(Point::new(0.0, 0.0)),
            ControlPoint::identity(Point::new(1.0, 0.0)),
            ControlPoint::identity(Point::new(0.0, 1.0)),
        ])
        .unwrap();
        let mut tin = before.clone();

        assert_eq!(tin.remove_control_point(0), Err(TinError::NoTriangulation));
        assert_eq!(tin, before);

        // Flatten the triangle onto the x axis.
        assert_eq!(
            tin.move_target(2, Point::new(3.0, 0.0)),
            Err(TinError::NoTriangulation)
        );
        assert_eq!(tin, before);

        assert_eq!(
            tin.add_control_point(ControlPoint::identity(Point::new(f64::NAN, 0.0))),
            Err(TinError::NonFiniteCoordinate { index: 3 })
        );
        assert_eq!(tin, before);

        assert_eq!(
            tin.move_target(5, Point::new(1.0, 1.0)),
            Err(TinError::IndexOutOfRange { index: 5, len: 3 })
        );
        assert_eq!(
            tin.remove_control_point(3),
            Err(TinError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(tin, before);
    }

    #[test]
    fn duplicate_target_is_ignored() {
        let mut tin = unit_square();
        let before = tin.mesh().len();
        tin.add_control_point(ControlPoint::identity(Point::new(1.0, 1.0)))
            .unwrap();
        assert_eq!(tin.mesh().len(), before);
        assert_eq!(tin.control_points().len(), 5);
    }

    #[test]
    fn add_at_target_pins_current_mapping() {
        let mut tin = warped();
        let before = tin.mesh().len();
        let q = Point::new(40.0, 30.0);
        let expected = tin.target_to_source(q).unwrap().unwrap();
        let added = tin.add_at_target(q).unwrap().unwrap();
        assert_eq!(added.target, q);
        assert_eq!(added.source, expected);
        assert_eq!(tin.control_points().len(), 8);
        assert_eq!(tin.control_points()[7], added);
        assert_eq!(tin.mesh().len(), before + 2);
        // The new vertex maps to where it was pinned.
        let p = tin.target_to_source(q).unwrap().unwrap();
        assert_relative_eq!(p.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(p.y, expected.y, epsilon = 1e-6);
    }

    #[test]
    fn add_at_target_outside_is_a_no_op() {
        let mut tin = warped();
        let before = tin.clone();
        assert_eq!(tin.add_at_target(Point::new(0.0, 0.0)), Ok(None));
        assert_eq!(tin, before);
    }

    #[test]
    fn try_from_control_points() {
        let control_points = warped().control_points().to_vec();
        let tin = Tin::try_from(control_points.clone()).unwrap();
        assert_eq!(tin, warped());
        assert_eq!(Vec::<ControlPoint>::from(tin), control_points);
        let flat = vec![
            ControlPoint::identity(Point::new(0.0, 0.0)),
            ControlPoint::identity(Point::new(1.0, 0.0)),
            ControlPoint::identity(Point::new(2.0, 0.0)),
        ];
        assert_eq!(Tin::try_from(flat), Err(TinError::NoTriangulation));
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn deserialize_rebuilds_mesh() {
        let json = r#"[
            {"source": {"x": 0.0, "y": 0.0}, "target": {"x": 0.0, "y": 0.0}},
            {"source": {"x": 1.0, "y": 0.0}, "target": {"x": 1.0, "y": 0.0}},
            {"source": {"x": 0.0, "y": 1.0}, "target": {"x": 0.0, "y": 1.0}}
        ]"#;
        let tin: Tin = serde_json::from_str(json).unwrap();
        assert_eq!(tin.mesh().len(), 1);
        assert_eq!(tin.render_buffers().vertex_count(), 3);
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn deserialize_rejects_bad_input() {
        // A stored mesh is not accepted, even one pointing past the control
        // points.
        let json = r#"{
            "control_points": [
                {"source": {"x": 0.0, "y": 0.0}, "target": {"x": 0.0, "y": 0.0}},
                {"source": {"x": 1.0, "y": 0.0}, "target": {"x": 1.0, "y": 0.0}},
                {"source": {"x": 0.0, "y": 1.0}, "target": {"x": 0.0, "y": 1.0}}
            ],
            "mesh": {"triangles": [0, 1, 7], "halfedges": [0, 0, 0], "hull": [0, 1, 7]}
        }"#;
        assert!(serde_json::from_str::<Tin>(json).is_err());

        // Control points that can't be triangulated.
        let json = r#"[
            {"source": {"x": 0.0, "y": 0.0}, "target": {"x": 0.0, "y": 0.0}},
            {"source": {"x": 1.0, "y": 0.0}, "target": {"x": 1.0, "y": 1.0}},
            {"source": {"x": 0.0, "y": 1.0}, "target": {"x": 2.0, "y": 2.0}}
        ]"#;
        let err = serde_json::from_str::<Tin>(json).unwrap_err();
        assert!(err.to_string().contains("no triangulation"));
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn serde_round_trip() {
        let tin = warped();
        let json = serde_json::to_string(&tin).unwrap();
        assert!(!json.contains("halfedges"));
        let back: Tin = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tin);
        let p = back.target_to_source(Point::new(43.0, 40.0)).unwrap().unwrap();
        assert_relative_eq!(p.x, 320.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 240.0, epsilon = 1e-6);
    }
}
