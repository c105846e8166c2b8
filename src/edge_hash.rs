use crate::hull::Hull;
use crate::point::Point;

#[derive(Clone, Debug)]
pub struct EdgeHash {
    center: Point,
    buckets: Vec<Option<usize>>,
}

impl EdgeHash {
    pub fn new(n: usize, center: Point) -> Self {
        let size = ((n as f64).sqrt().ceil() as usize).max(1);
        Self {
            center,
            buckets: vec![None; size],
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// The bucket for a point. A point sitting on the centre lands in bucket
    /// zero.
    pub fn key(&self, p: Point) -> usize {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        // Monotonic in the real angle but without any trigonometry.
        let k = 1.0 - dx / (dx.abs() + dy.abs());
        let angle = (2.0 + if dy < 0.0 { -k } else { k }) / 4.0;
        // NaN casts to zero.
        ((angle * self.len() as f64).floor() as usize) % self.len()
    }

    pub fn insert(&mut self, p: Point, node: usize) {
        let key = self.key(p);
        self.buckets[key] = Some(node);
    }

    /// Probe forward from the point's own bucket for a node still on the
    /// hull.
    pub fn find_start(&self, p: Point, hull: &Hull) -> Option<usize> {
        let start_key = self.key(p);
        let mut key = start_key;
        loop {
            if let Some(node) = self.buckets[key] {
                if hull.is_live(node) {
                    return Some(node);
                }
            }
            key = (key + 1) % self.len();
            if key == start_key {
                return None;
            }
        }
    }
}
