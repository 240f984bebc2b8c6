//! Plane geometry behind the graphical method: line intersections, axis
//! intercepts, the feasibility test, vertex deduplication and angular ordering.
//!
//! The tolerances are part of the observable behavior and are exported so
//! callers can test boundary cases exactly.

use std::cmp::Ordering;

use crate::problem::{Constraint, Point, Relation};

/// Below this `|det|` two constraint lines are treated as parallel.
pub const DETERMINANT_EPSILON: f64 = 1e-9;

/// Slack allowed when testing a point against a constraint or the axes.
pub const FEASIBILITY_EPSILON: f64 = 1e-6;

/// Two points closer than this in both coordinates are the same vertex.
pub const DEDUP_EPSILON: f64 = 1e-6;

/// Intersection of the boundary lines of `a` and `b` (Cramer's rule).
///
/// Returns `None` for parallel or coincident lines.
pub fn intersection(a: &Constraint, b: &Constraint) -> Option<Point> {
    let det = a.c1 * b.c2 - b.c1 * a.c2;
    if det.abs() < DETERMINANT_EPSILON {
        return None;
    }
    let x = (a.rhs * b.c2 - b.rhs * a.c2) / det;
    let y = (a.c1 * b.rhs - b.c1 * a.rhs) / det;
    Some(Point::new(x, y))
}

/// Where the boundary of `c` crosses the x-axis and then the y-axis.
///
/// An axis is skipped when the matching coefficient is exactly zero.
pub fn axis_intercepts(c: &Constraint) -> impl Iterator<Item = Point> {
    let on_x = (c.c1 != 0.0).then(|| Point::new(c.rhs / c.c1, 0.0));
    let on_y = (c.c2 != 0.0).then(|| Point::new(0.0, c.rhs / c.c2));
    on_x.into_iter().chain(on_y)
}

/// Whether `p` satisfies a single constraint within [`FEASIBILITY_EPSILON`].
pub fn satisfies(c: &Constraint, p: &Point) -> bool {
    let lhs = c.lhs(p);
    match c.relation {
        Relation::Le => lhs <= c.rhs + FEASIBILITY_EPSILON,
        Relation::Ge => lhs >= c.rhs - FEASIBILITY_EPSILON,
        Relation::Eq => (lhs - c.rhs).abs() < FEASIBILITY_EPSILON,
        Relation::Unrecognized => false,
    }
}

/// Whether `p` lies in the first quadrant and satisfies every constraint.
pub fn is_feasible(p: &Point, constraints: &[Constraint]) -> bool {
    // NaN coordinates fall through to the constraint checks, which all reject them
    if p.x < -FEASIBILITY_EPSILON || p.y < -FEASIBILITY_EPSILON {
        return false;
    }
    constraints.iter().all(|c| satisfies(c, p))
}

pub fn same_vertex(a: &Point, b: &Point) -> bool {
    (a.x - b.x).abs() < DEDUP_EPSILON && (a.y - b.y).abs() < DEDUP_EPSILON
}

/// Drop near-duplicate points, keeping the first occurrence of each.
pub fn dedup_points(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        // compare against the raw input, not the survivors, so a chain of
        // points each within tolerance of the next still collapses to its head
        let first = points.iter().position(|q| same_vertex(q, p));
        if first == Some(i) {
            out.push(*p);
        }
    }
    out
}

/// Arithmetic mean of the points, `None` for an empty slice.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

/// Sort counter-clockwise by angle around the centroid.
///
/// Sets of two or fewer points are left untouched. The sort is stable, so
/// points at equal angles keep their enumeration order.
pub fn order_around_centroid(points: &mut [Point]) {
    if points.len() <= 2 {
        return;
    }
    let Some(center) = centroid(points) else {
        return;
    };
    points.sort_by(|a, b| {
        let aa = (a.y - center.y).atan2(a.x - center.x);
        let bb = (b.y - center.y).atan2(b.x - center.x);
        aa.partial_cmp(&bb).unwrap_or(Ordering::Equal)
    });
}
