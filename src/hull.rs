use crate::point::Point;
use slab::Slab;

#[derive(Clone, Debug)]
pub struct HullNode {
    /// The vertex id of this node.
    pub i: usize,
    pub point: Point,
    /// The half-edge from this node to the next one along the hull.
    pub t: usize,
    pub prev: usize,
    pub next: usize,
    pub removed: bool,
}

/// The advancing convex hull as a circular doubly-linked list. Removed
/// nodes are tombstoned and their slots are never reused during a build, so
/// stale keys held by the edge hash can be told apart from live ones.
#[derive(Clone, Debug)]
pub struct Hull {
    nodes: Slab<HullNode>,
    /// Any live node.
    head: usize,
}

impl Hull {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(n),
            head: 0,
        }
    }

    /// Insert vertex `i` after `prev`. Without a `prev` the node forms a
    /// one-element cycle and becomes the head.
    pub fn insert(&mut self, i: usize, point: Point, prev: Option<usize>) -> usize {
        let next = prev.map(|prev| self.nodes[prev].next);
        let entry = self.nodes.vacant_entry();
        let key = entry.key();
        match (prev, next) {
            (Some(prev), Some(next)) => {
                entry.insert(HullNode {
                    i,
                    point,
                    t: 0,
                    prev,
                    next,
                    removed: false,
                });
                self.nodes[next].prev = key;
                self.nodes[prev].next = key;
            }
            _ => {
                entry.insert(HullNode {
                    i,
                    point,
                    t: 0,
                    prev: key,
                    next: key,
                    removed: false,
                });
                self.head = key;
            }
        }
        key
    }

    /// Unlink a node and tombstone it. Returns the previous node, which
    /// becomes the head.
    pub fn remove(&mut self, key: usize) -> usize {
        let HullNode { prev, next, .. } = self.nodes[key];
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.nodes[key].removed = true;
        self.head = prev;
        prev
    }

    pub fn is_live(&self, key: usize) -> bool {
        self.nodes.get(key).map_or(false, |node| !node.removed)
    }

    pub fn next(&self, key: usize) -> usize {
        self.nodes[key].next
    }

    pub fn prev(&self, key: usize) -> usize {
        self.nodes[key].prev
    }

    pub fn point(&self, key: usize) -> Point {
        self.nodes[key].point
    }

    pub fn vertex(&self, key: usize) -> usize {
        self.nodes[key].i
    }

    pub fn t(&self, key: usize) -> usize {
        self.nodes[key].t
    }

    pub fn set_t(&mut self, key: usize, t: usize) {
        self.nodes[key].t = t;
    }

    /// A flip moved the hull half-edge `old` to `new`; repoint the node that
    /// was tracking it.
    pub fn fix_halfedge(&mut self, old: usize, new: usize) {
        let start = self.head;
        let mut key = start;
        loop {
            if self.nodes[key].t == old {
                self.nodes[key].t = new;
                break;
            }
            key = self.nodes[key].prev;
            if key == start {
                break;
            }
        }
    }

    /// The vertex ids along the hull, starting at the head.
    pub fn vertices(&self) -> HullIter<'_> {
        HullIter {
            hull: self,
            next_key: None,
        }
    }
}

pub struct HullIter<'a> {
    hull: &'a Hull,
    next_key: Option<usize>,
}

impl<'a> Iterator for HullIter<'a> {
    type Item = usize;
    fn next(&mut self) -> Option<Self::Item> {
        let key = match self.next_key {
            Some(key) if key == self.hull.head => return None,
            Some(key) => key,
            // This is the first time that next has been called.
            None if self.hull.nodes.is_empty() => return None,
            None => self.hull.head,
        };
        self.next_key = Some(self.hull.next(key));
        Some(self.hull.vertex(key))
    }
}
