#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Marks a half-edge with no opposite, i.e. one on the hull.
pub const EMPTY: usize = usize::MAX;

/// The half-edge after `e` in its triangle.
pub fn next_halfedge(e: usize) -> usize {
    if e % 3 == 2 {
        e - 2
    } else {
        e + 1
    }
}

/// The half-edge before `e` in its triangle.
pub fn prev_halfedge(e: usize) -> usize {
    if e % 3 == 0 {
        e + 2
    } else {
        e - 1
    }
}

pub fn triangle_of_edge(e: usize) -> usize {
    e / 3
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Mesh {
    /// Vertex ids, three per triangle, each triangle counter-clockwise.
    /// Half-edge `e` starts at `triangles[e]`.
    pub triangles: Vec<usize>,
    /// The opposite of each half-edge, or [`EMPTY`].
    pub halfedges: Vec<usize>,
    /// Vertex ids of the convex hull, counter-clockwise.
    pub hull: Vec<usize>,
}

impl Mesh {
    /// The number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangle(&self, t: usize) -> [usize; 3] {
        [
            self.triangles[3 * t],
            self.triangles[3 * t + 1],
            self.triangles[3 * t + 2],
        ]
    }

    pub fn triangle_iter(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.triangles
            .chunks_exact(3)
            .map(|chunk| [chunk[0], chunk[1], chunk[2]])
    }

    pub fn opposite(&self, e: usize) -> Option<usize> {
        match self.halfedges[e] {
            EMPTY => None,
            f => Some(f),
        }
    }

    /// Each undirected edge once, as a pair of vertex ids.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.triangles.len())
            .filter(move |&e| match self.opposite(e) {
                Some(f) => e > f,
                None => true,
            })
            .map(move |e| (self.triangles[e], self.triangles[next_halfedge(e)]))
    }

    #[cfg(feature = "serialize")]
    pub fn debug_table(&self) -> String {
        use prettytable::{Cell, Row, Table};
        let mut table = Table::new();

        let mut headers = Row::empty();
        for name in &["T", "a", "b", "c", "opp(ab)", "opp(bc)", "opp(ca)"] {
            headers.add_cell(Cell::new(name));
        }
        table.add_row(headers);
        for (t, vertices) in self.triangle_iter().enumerate() {
            let mut row = Row::empty();
            row.add_cell(Cell::new(&format!("{}", t)));
            for v in vertices.iter() {
                row.add_cell(Cell::new(&to_vertex_name(*v)));
            }
            for e in 3 * t..3 * t + 3 {
                let opposite = match self.opposite(e) {
                    Some(f) => format!("{}", f),
                    None => String::from("-"),
                };
                row.add_cell(Cell::new(&opposite));
            }
            table.add_row(row);
        }
        table.to_string()
    }
}

pub fn to_vertex_name(i: usize) -> String {
    format!("P{}", i)
}
