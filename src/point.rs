#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    ops::Sub,
};

#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn dist2(&self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// A ground control point: the same location expressed in the source space
/// (e.g. image pixels or texture coordinates) and in the target space (e.g. a
/// georeferenced plane).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ControlPoint {
    pub source: Point,
    pub target: Point,
}

impl ControlPoint {
    pub fn new(source: Point, target: Point) -> Self {
        Self { source, target }
    }

    /// A control point whose source and target coordinates coincide.
    pub fn identity(point: Point) -> Self {
        Self {
            source: point,
            target: point,
        }
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Point {
    fn arbitrary(g: &mut quickcheck::Gen) -> Point {
        Point {
            x: SafeFloat::arbitrary(g).0,
            y: SafeFloat::arbitrary(g).0,
        }
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl From<Point> for robust::Coord<f64> {
    fn from(s: Point) -> robust::Coord<f64> {
        robust::Coord { x: s.x, y: s.y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// A float confined to a range where the triangulation tests don't have to
/// worry about overflow in the determinants.
#[cfg(test)]
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct SafeFloat(pub f64);

#[cfg(test)]
impl SafeFloat {
    pub const MAX: SafeFloat = SafeFloat(4000.0);
    pub const MIN: SafeFloat = SafeFloat(-4000.0);
    pub const EPSILON: SafeFloat = SafeFloat(1.0 / (0xf_i64 as f64));
    pub fn new(f: f64) -> Option<Self> {
        let s = SafeFloat(f);
        if s <= SafeFloat::MAX && s >= SafeFloat::MIN {
            Some(s)
        } else {
            None
        }
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for SafeFloat {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        loop {
            let frac: f64 = f64::arbitrary(g);
            let f = SafeFloat::new(frac);
            if let Some(f) = f {
                // Snap to a grid so that generated clouds contain exact
                // duplicates and collinear runs as well as general positions.
                let snapped = (f.0 / SafeFloat::EPSILON.0).round() * SafeFloat::EPSILON.0;
                break SafeFloat(snapped);
            }
        }
    }
}

#[cfg(test)]
impl Display for SafeFloat {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}
