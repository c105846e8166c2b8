use crate::edge_hash::EdgeHash;
use crate::error::{TinError, TinResult};
use crate::hull::Hull;
use crate::mesh::{Mesh, EMPTY};
use crate::point::Point;
use crate::predicates::{
    area, circumcenter, circumradius, dist2, in_circle, left_or_right, Direction,
};
use crate::sort::sort_by_distance;
use tracing::{debug, trace, warn};

/// Triangulate `points`. The vertex ids in the mesh are indices into
/// `points`.
pub fn triangulate(points: &[Point]) -> TinResult<Mesh> {
    Triangulator::build(points)
}

/// Sweep-hull triangulation. Points are added in order of distance from the
/// circumcentre of a seed triangle, each one fanned onto the hull edges it
/// can see and then legalized by edge flips. Nothing outlives
/// [`Triangulator::build`] apart from the returned [`Mesh`].
#[derive(Debug)]
pub struct Triangulator<'a> {
    coords: &'a [Point],
    triangles: Vec<usize>,
    halfedges: Vec<usize>,
    /// The used length of `triangles` and `halfedges`.
    triangles_len: usize,
    hull: Hull,
    hash: EdgeHash,
}

impl<'a> Triangulator<'a> {
    pub fn build(points: &'a [Point]) -> TinResult<Mesh> {
        let n = points.len();
        if n < 3 {
            return Err(TinError::NoTriangulation);
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(TinError::NonFiniteCoordinate { index });
        }

        let (i0, i1, i2) = find_seed_triangle(points)?;
        let (p0, p1, p2) = (points[i0], points[i1], points[i2]);
        let center = circumcenter(p0, p1, p2);
        debug!(points = n, i0, i1, i2, %center, "triangulating");

        let mut ids: Vec<usize> = (0..n).collect();
        sort_by_distance(&mut ids, points, center);

        let mut triangulator = Triangulator::new(points, center);
        triangulator.seed(i0, i1, i2);

        let mut previous: Option<Point> = None;
        for i in ids {
            let p = points[i];
            // Duplicates sort next to each other.
            if previous == Some(p) {
                continue;
            }
            previous = Some(p);
            if p == p0 || p == p1 || p == p2 {
                continue;
            }
            triangulator.insert(i)?;
        }

        let mesh = triangulator.into_mesh();
        debug!(
            triangles = mesh.len(),
            hull = mesh.hull.len(),
            "triangulation complete"
        );
        Ok(mesh)
    }

    fn new(coords: &'a [Point], center: Point) -> Self {
        let n = coords.len();
        // A planar triangulation of n points has at most 2n - 5 triangles.
        let max_triangles = 2 * n - 5;
        Self {
            coords,
            triangles: vec![0; max_triangles * 3],
            halfedges: vec![EMPTY; max_triangles * 3],
            triangles_len: 0,
            hull: Hull::with_capacity(n),
            hash: EdgeHash::new(n, center),
        }
    }

    /// Start the hull and the mesh from the counter-clockwise seed triangle.
    fn seed(&mut self, i0: usize, i1: usize, i2: usize) {
        let mut prev = None;
        for (t, &i) in [i0, i1, i2].iter().enumerate() {
            let p = self.coords[i];
            let node = self.hull.insert(i, p, prev);
            self.hash.insert(p, node);
            self.hull.set_t(node, t);
            prev = Some(node);
        }
        self.add_triangle(i0, i1, i2, EMPTY, EMPTY, EMPTY);
    }

    fn insert(&mut self, i: usize) -> TinResult<()> {
        let p = self.coords[i];
        let start = match self.hash.find_start(p, &self.hull) {
            Some(start) => start,
            None => {
                warn!(index = i, %p, "edge hash holds no live hull node");
                return Err(TinError::VisibleEdgeNotFound { index: i });
            }
        };

        // Find an edge of the hull that the point can see.
        let mut e = start;
        while area(p, self.hull.point(e), self.hull.point(self.hull.next(e))) >= 0.0 {
            e = self.hull.next(e);
            if e == start {
                warn!(index = i, %p, "walked the whole hull without finding a visible edge");
                return Err(TinError::VisibleEdgeNotFound { index: i });
            }
        }
        // The visible run may extend behind where we started.
        let walk_back = e == start;
        trace!(index = i, %p, walk_back, "inserting");

        let next = self.hull.next(e);
        let t = self.add_triangle(
            self.hull.vertex(e),
            i,
            self.hull.vertex(next),
            EMPTY,
            EMPTY,
            self.hull.t(e),
        );
        self.hull.set_t(e, t);
        let e = self.hull.insert(i, p, Some(e));
        let boundary = self.legalize(t + 2);
        self.hull.set_t(e, boundary);

        // Fan forward while the next hull edge is still visible.
        let mut q = self.hull.next(e);
        loop {
            let q_next = self.hull.next(q);
            if area(p, self.hull.point(q), self.hull.point(q_next)) >= 0.0 {
                break;
            }
            let q_prev = self.hull.prev(q);
            let t = self.add_triangle(
                self.hull.vertex(q),
                i,
                self.hull.vertex(q_next),
                self.hull.t(q_prev),
                EMPTY,
                self.hull.t(q),
            );
            let boundary = self.legalize(t + 2);
            self.hull.set_t(q_prev, boundary);
            self.hull.remove(q);
            q = q_next;
        }

        if walk_back {
            // And the same backwards.
            let mut q = self.hull.prev(e);
            loop {
                let q_prev = self.hull.prev(q);
                if area(p, self.hull.point(q_prev), self.hull.point(q)) >= 0.0 {
                    break;
                }
                let t = self.add_triangle(
                    self.hull.vertex(q_prev),
                    i,
                    self.hull.vertex(q),
                    EMPTY,
                    self.hull.t(q),
                    self.hull.t(q_prev),
                );
                self.legalize(t + 2);
                self.hull.set_t(q_prev, t);
                self.hull.remove(q);
                q = q_prev;
            }
        }

        // Both hull edges touching the new point may have moved buckets.
        self.hash.insert(p, e);
        let e_prev = self.hull.prev(e);
        self.hash.insert(self.hull.point(e_prev), e_prev);
        Ok(())
    }

    /// Flip the edge `a` if the triangle across it has its far vertex inside
    /// our circumcircle, and keep flipping outwards. Returns the half-edge
    /// that now starts at the point opposite `a` and runs along the outside
    /// of the flipped region.
    fn legalize(&mut self, a: usize) -> usize {
        let a0 = a - a % 3;
        let ar = a0 + (a + 2) % 3;

        let b = self.halfedges[a];
        if b == EMPTY {
            // Hull edges are always legal.
            return ar;
        }

        let b0 = b - b % 3;
        let al = a0 + (a + 1) % 3;
        let br = b0 + (b + 1) % 3;
        let bl = b0 + (b + 2) % 3;

        let p0 = self.triangles[ar];
        let pr = self.triangles[a];
        let pl = self.triangles[al];
        let p1 = self.triangles[bl];

        let illegal = in_circle(
            self.coords[p0],
            self.coords[pr],
            self.coords[pl],
            self.coords[p1],
        );
        if !illegal {
            return ar;
        }

        trace!(a, b, p0, p1, "flipping");
        self.triangles[a] = p1;
        self.triangles[b] = p0;

        let hbl = self.halfedges[bl];
        if hbl == EMPTY {
            // The flip moved a hull edge from bl to a.
            self.hull.fix_halfedge(bl, a);
        }
        self.link(a, hbl);
        self.link(b, self.halfedges[ar]);
        self.link(ar, bl);

        self.legalize(a);
        self.legalize(br)
    }

    fn link(&mut self, a: usize, b: usize) {
        self.halfedges[a] = b;
        if b != EMPTY {
            self.halfedges[b] = a;
        }
    }

    /// Add a triangle from vertex ids and the opposites of its three
    /// half-edges. Returns the first half-edge.
    fn add_triangle(
        &mut self,
        i0: usize,
        i1: usize,
        i2: usize,
        a: usize,
        b: usize,
        c: usize,
    ) -> usize {
        let t = self.triangles_len;

        self.triangles[t] = i0;
        self.triangles[t + 1] = i1;
        self.triangles[t + 2] = i2;

        self.link(t, a);
        self.link(t + 1, b);
        self.link(t + 2, c);

        self.triangles_len += 3;
        t
    }

    fn into_mesh(self) -> Mesh {
        let Triangulator {
            mut triangles,
            mut halfedges,
            triangles_len,
            hull,
            ..
        } = self;
        triangles.truncate(triangles_len);
        halfedges.truncate(triangles_len);
        Mesh {
            triangles,
            halfedges,
            hull: hull.vertices().collect(),
        }
    }
}

fn calc_bbox_center(points: &[Point]) -> Point {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0)
}

/// Pick i0 closest to the middle of the points, i1 closest to i0, and i2 so
/// that the circle through all three is as small as possible. The triangle
/// comes back counter-clockwise.
fn find_seed_triangle(points: &[Point]) -> TinResult<(usize, usize, usize)> {
    let center = calc_bbox_center(points);

    let mut i0 = 0;
    let mut min_dist = f64::INFINITY;
    for (i, p) in points.iter().enumerate() {
        let d = dist2(*p, center);
        if d < min_dist {
            i0 = i;
            min_dist = d;
        }
    }
    let p0 = points[i0];

    let mut i1 = None;
    let mut min_dist = f64::INFINITY;
    for (i, p) in points.iter().enumerate() {
        if i == i0 {
            continue;
        }
        let d = dist2(*p, p0);
        if d < min_dist && d > 0.0 {
            i1 = Some(i);
            min_dist = d;
        }
    }
    // Every point sits on top of i0.
    let mut i1 = i1.ok_or(TinError::NoTriangulation)?;
    let p1 = points[i1];

    let mut i2 = None;
    let mut min_radius = f64::INFINITY;
    for (i, &p) in points.iter().enumerate() {
        if i == i0 || i == i1 {
            continue;
        }
        let r = match left_or_right(p0, p1, p) {
            Direction::Straight => f64::INFINITY,
            _ => circumradius(p0, p1, p),
        };
        if r < min_radius {
            i2 = Some(i);
            min_radius = r;
        }
    }
    let mut i2 = i2.ok_or(TinError::NoTriangulation)?;

    if area(p0, p1, points[i2]) < 0.0 {
        std::mem::swap(&mut i1, &mut i2);
    }
    Ok((i0, i1, i2))
}
