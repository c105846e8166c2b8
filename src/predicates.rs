use crate::point::Point;

pub fn dist2(a: Point, b: Point) -> f64 {
    a.dist2(b)
}

/// Twice the signed area of the triangle pqr. Positive when the triangle is
/// counter-clockwise.
pub fn area(p: Point, q: Point, r: Point) -> f64 {
    robust::orient2d(p.into(), q.into(), r.into())
}

/// The squared circumradius of abc, measured from a. Returns infinity when
/// there is no finite circle through the three points.
pub fn circumradius(a: Point, b: Point, c: Point) -> f64 {
    let bx = b.x - a.x;
    let by = b.y - a.y;
    let cx = c.x - a.x;
    let cy = c.y - a.y;

    let bl = bx * bx + by * by;
    let cl = cx * cx + cy * cy;
    if bl == 0.0 || cl == 0.0 {
        return f64::INFINITY;
    }

    let d = bx * cy - by * cx;
    if d == 0.0 {
        return f64::INFINITY;
    }

    let x = (cy * bl - by * cl) * 0.5 / d;
    let y = (bx * cl - cx * bl) * 0.5 / d;
    let r = x * x + y * y;
    if r.is_finite() {
        r
    } else {
        f64::INFINITY
    }
}

/// The centre of the circle through abc. The triangle must not be
/// degenerate, see [`circumradius`].
pub fn circumcenter(a: Point, b: Point, c: Point) -> Point {
    let bx = b.x - a.x;
    let by = b.y - a.y;
    let cx = c.x - a.x;
    let cy = c.y - a.y;

    let bl = bx * bx + by * by;
    let cl = cx * cx + cy * cy;
    let d = bx * cy - by * cx;

    let x = (cy * bl - by * cl) * 0.5 / d;
    let y = (bx * cl - cx * bl) * 0.5 / d;
    Point::new(a.x + x, a.y + y)
}

/// Does p lie strictly inside the circle through the counter-clockwise
/// triangle abc. Cocircular points are not inside.
pub fn in_circle(a: Point, b: Point, c: Point, p: Point) -> bool {
    robust::incircle(a.into(), b.into(), c.into(), p.into()) > 0.0
}

#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum Direction {
    Left,
    Straight,
    Right,
}

/// Does pc lie to the left or the right (or is collinear) of the line formed
/// by pa and pb.
pub fn left_or_right(pa: Point, pb: Point, pc: Point) -> Direction {
    let r = area(pa, pb, pc);
    if r > 0.0 {
        Direction::Left
    } else if r < 0.0 {
        Direction::Right
    } else {
        Direction::Straight
    }
}
