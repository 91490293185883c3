//! Polygon-level slide and projection distances (spec §4.6): the
//! measurements the orbiting main loop uses to pick how far to advance
//! along a candidate translation vector.

use nestgeo_geom::{Point, Vector};
use nestgeo_polygon::{point_distance, segment_distance, segment_distance_raw, Polygon};

/// For every pair (edge of `a`, edge of `b`), the distance `b` can
/// slide along `direction` before the pair comes into contact; returns
/// the minimum across all pairs, ignoring pairs with no contact
/// (`None`). When `ignore_negative` is `false`, a pair that is already
/// slightly overlapping contributes its (negative) penetration depth
/// instead of being clamped to `0` — letting an already-interpenetrating
/// configuration register as infeasible rather than a spurious zero.
pub fn polygon_slide_distance(a: &Polygon, b: &Polygon, direction: Vector, ignore_negative: bool, tol: f64) -> Option<f64> {
    let mut best: Option<f64> = None;
    for (a1, a2) in a.edges() {
        for (b1, b2) in b.edges() {
            let d = if ignore_negative {
                segment_distance(a1, a2, b1, b2, direction, tol)
            } else {
                segment_distance_raw(a1, a2, b1, b2, direction, tol)
            };
            let Some(d) = d else { continue };
            best = Some(match best {
                Some(m) if m < d => m,
                _ => d,
            });
        }
    }
    best
}

/// For each vertex of `b`, the smallest travel along `dir` that lands
/// it on some edge of `a` (via [`point_distance`]); returns the
/// *largest* such per-vertex minimum — the distance all of `b` can
/// move along `dir` before its first vertex reaches an edge of `a`.
pub fn polygon_projection_distance(a: &Polygon, b: &Polygon, dir: Vector, tol: f64) -> Option<f64> {
    let mut overall: Option<f64> = None;
    for &vertex in b.vertices() {
        let mut per_vertex: Option<f64> = None;
        for (e1, e2) in a.edges() {
            let Some(d) = point_distance(vertex, e1, e2, dir, false, tol) else { continue };
            if d < -tol {
                continue;
            }
            let d = d.max(0.0);
            per_vertex = Some(match per_vertex {
                Some(m) if m < d => m,
                _ => d,
            });
        }
        let Some(per_vertex) = per_vertex else { continue };
        overall = Some(match overall {
            Some(m) if m > per_vertex => m,
            _ => per_vertex,
        });
    }
    overall
}

/// Translates `b`'s vertices by `offset` without materializing a new
/// `Polygon` wrapper — most orbiting-loop steps only need to evaluate
/// candidate offsets, not commit them.
pub fn translated_vertices(b: &Polygon, offset: Vector) -> Vec<Point> {
    b.vertices().iter().map(|v| v.translate(offset.dx, offset.dy)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestgeo_geom::TOL;

    fn square(x: f64, y: f64, s: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(x, y),
            Point::new(x + s, y),
            Point::new(x + s, y + s),
            Point::new(x, y + s),
        ])
        .unwrap()
    }

    #[test]
    fn slide_distance_between_separated_squares() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(5.0, 0.0, 2.0);
        let d = polygon_slide_distance(&a, &b, Vector::new(-1.0, 0.0), true, TOL).unwrap();
        assert!((d - 3.0).abs() < 1e-9);
    }

    #[test]
    fn triangle_sliding_against_edge_scenario_3() {
        // spec.md §8 scenario 3: A and B share a touching vertex at the
        // origin already; sliding further along (1,0) returns 0 for the
        // edge pair that is already in contact.
        let a = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 10.0)]).unwrap();
        let b = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(1.0, 2.0)]).unwrap();
        let d = polygon_slide_distance(&a, &b, Vector::new(1.0, 0.0), true, TOL).unwrap();
        assert!(d.abs() < 1e-9, "expected 0, got {d}");

        // Shift B clear of A (B's x-range becomes [-5,-3], strictly left
        // of A's leftmost vertex at x=0): the nearest contact sliding
        // along +x is B's rightmost vertex reaching A's origin vertex,
        // a gap of 3 — not the full 5 that would retrace the original
        // unshifted position.
        let b_shifted = b.translate(-5.0, 0.0);
        let d2 = polygon_slide_distance(&a, &b_shifted, Vector::new(1.0, 0.0), true, TOL).unwrap();
        assert!((d2 - 3.0).abs() < 1e-9, "expected 3, got {d2}");
    }

    #[test]
    fn projection_distance_stops_at_first_contact() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(-5.0, 2.0, 1.0);
        let d = polygon_projection_distance(&a, &b, Vector::new(1.0, 0.0), TOL).unwrap();
        assert!((d - 5.0).abs() < 1e-9, "expected 5, got {d}");
    }
}
