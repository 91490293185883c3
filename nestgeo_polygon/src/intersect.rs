//! Polygon-vs-polygon overlap testing (spec §4.5): the predicate the
//! NFP main loop (in `nestgeo_nfp`) uses after each candidate
//! translation to reject interior penetration.

use crate::polygon::{Containment, Polygon};
use crate::segment::on_segment;
use nestgeo_geom::{Point, Vector};

/// Offsets a polygon's vertices by `(dx, dy)` without materializing a
/// translated copy — callers that need to test many offsets against
/// the same polygon should prefer this over `Polygon::translate`.
fn offset_vertices(p: &Polygon, dx: f64, dy: f64) -> Vec<Point> {
    p.vertices().iter().map(|v| Point::new(v.x + dx, v.y + dy)).collect()
}

/// True iff vertex `q` sits strictly inside the half-plane swept out
/// by walking from `prev` through `at` to `next` — used to tell a
/// tangent pass from an interior crossing when two edges only touch at
/// a shared or contained endpoint.
fn turns_inward(prev: Point, at: Point, next: Point, probe: Point) -> bool {
    let edge_in = at - prev;
    let edge_out = next - at;
    let to_probe = probe - at;
    // The probe is "inward" if it falls on the same side as the
    // interior turn from edge_in to edge_out.
    let turn = edge_in.cross(edge_out);
    let side = edge_in.cross(to_probe);
    turn * side > 0.0 || (turn.abs() <= 1e-12 && edge_out.cross(to_probe) > 0.0)
}

/// Tests whether polygon `a` (translated by `(a_dx, a_dy)`) and polygon
/// `b` (translated by `(b_dx, b_dy)`) overlap. Proper edge crossings
/// are detected directly; endpoint touches are resolved by consulting
/// each polygon's neighboring vertices to discriminate a tangent pass
/// from a true interior crossing; if no edge pair resolves the
/// question, an arbitrary vertex of one polygon is tested against the
/// other via ray-casting containment.
pub fn intersect(a: &Polygon, a_dx: f64, a_dy: f64, b: &Polygon, b_dx: f64, b_dy: f64, tol: f64) -> bool {
    let av = offset_vertices(a, a_dx, a_dy);
    let bv = offset_vertices(b, b_dx, b_dy);
    let na = av.len();
    let nb = bv.len();

    for i in 0..na {
        let a1 = av[i];
        let a2 = av[(i + 1) % na];
        let a0 = av[(i + na - 1) % na];
        let a3 = av[(i + 2) % na];

        for j in 0..nb {
            let b1 = bv[j];
            let b2 = bv[(j + 1) % nb];
            let b0 = bv[(j + nb - 1) % nb];
            let b3 = bv[(j + 2) % nb];

            if on_segment(a1, a2, b1, tol) || on_segment(a1, a2, b2, tol) || on_segment(b1, b2, a1, tol) || on_segment(b1, b2, a2, tol) {
                // One segment's open interior contains the other's
                // endpoint: consult the neighbor on the side whose
                // endpoint lies on the other edge to see whether it
                // turns into the other polygon's interior.
                if on_segment(a1, a2, b1, tol) && turns_inward(b0, b1, b2, a2) {
                    return true;
                }
                if on_segment(a1, a2, b2, tol) && turns_inward(b1, b2, b3, a2) {
                    return true;
                }
                if on_segment(b1, b2, a1, tol) && turns_inward(a0, a1, a2, b2) {
                    return true;
                }
                if on_segment(b1, b2, a2, tol) && turns_inward(a1, a2, a3, b2) {
                    return true;
                }
                continue;
            }

            if a1.almost_eq(&b1, tol) || a1.almost_eq(&b2, tol) || a2.almost_eq(&b1, tol) || a2.almost_eq(&b2, tol) {
                // Shared endpoint: a coincident vertex pair alone is
                // only a tangent pass, not an overlap, unless the
                // neighboring edges actually interleave.
                continue;
            }

            if let Some(p) = crate::segment::line_intersect(a1, a2, b1, b2, false, tol) {
                if !p.almost_eq(&a1, tol) && !p.almost_eq(&a2, tol) && !p.almost_eq(&b1, tol) && !p.almost_eq(&b2, tol) {
                    return true;
                }
            }
        }
    }

    if !av.is_empty() {
        let probe = Point::new(av[0].x, av[0].y);
        if b.contains(translate_probe(b, probe, -b_dx, -b_dy), tol) == Containment::Inside {
            return true;
        }
    }
    if !bv.is_empty() {
        let probe = Point::new(bv[0].x, bv[0].y);
        if a.contains(translate_probe(a, probe, -a_dx, -a_dy), tol) == Containment::Inside {
            return true;
        }
    }

    false
}

/// Maps a point from the offset-applied frame back into `p`'s own
/// local coordinate frame so `Polygon::contains` (which always tests
/// against un-translated vertices) can be used directly.
fn translate_probe(_p: &Polygon, probe: Point, dx: f64, dy: f64) -> Point {
    Point::new(probe.x + dx, probe.y + dy)
}

/// True iff `inner` (translated by `(dx, dy)`) lies entirely within
/// `outer`: every vertex of `inner` is inside or on the boundary of
/// `outer`, and no edge of `inner` crosses an edge of `outer` (which
/// rules out the case where `outer` is non-convex and `inner` dips
/// outside between two vertices that both happen to land inside).
/// Used by the interior NFP's starting-position search and its
/// post-candidate feasibility check (spec §4.6.2, §4.6.4).
pub fn contained(outer: &Polygon, inner: &Polygon, dx: f64, dy: f64, tol: f64) -> bool {
    let iv = offset_vertices(inner, dx, dy);
    for &v in &iv {
        if outer.contains(v, tol) == Containment::Outside {
            return false;
        }
    }

    let ov = outer.vertices();
    let no = ov.len();
    let ni = iv.len();
    for i in 0..ni {
        let i1 = iv[i];
        let i2 = iv[(i + 1) % ni];
        for j in 0..no {
            let o1 = ov[j];
            let o2 = ov[(j + 1) % no];
            if let Some(p) = crate::segment::line_intersect(i1, i2, o1, o2, false, tol) {
                if !p.almost_eq(&i1, tol) && !p.almost_eq(&i2, tol) && !p.almost_eq(&o1, tol) && !p.almost_eq(&o2, tol) {
                    return false;
                }
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn overlapping_squares_intersect() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.0, 1.0, 2.0);
        assert!(intersect(&a, 0.0, 0.0, &b, 0.0, 0.0, 1e-9));
    }

    #[test]
    fn disjoint_squares_do_not_intersect() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(10.0, 10.0, 2.0);
        assert!(!intersect(&a, 0.0, 0.0, &b, 0.0, 0.0, 1e-9));
    }

    #[test]
    fn edge_touching_squares_do_not_intersect() {
        // B sits immediately to the right of A, sharing the edge x=2.
        let a = square(0.0, 0.0, 2.0);
        let b = square(2.0, 0.0, 2.0);
        assert!(!intersect(&a, 0.0, 0.0, &b, 0.0, 0.0, 1e-9));
    }

    #[test]
    fn translating_apart_resolves_overlap() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.0, 1.0, 2.0);
        assert!(intersect(&a, 0.0, 0.0, &b, 0.0, 0.0, 1e-9));
        assert!(!intersect(&a, 0.0, 0.0, &b, 5.0, 5.0, 1e-9));
    }

    #[test]
    fn b_fully_inside_a_intersects() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(4.0, 4.0, 2.0);
        assert!(intersect(&a, 0.0, 0.0, &b, 0.0, 0.0, 1e-9));
    }

    #[test]
    fn contained_is_true_for_a_fully_interior_square() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(0.0, 0.0, 2.0);
        assert!(contained(&a, &b, 4.0, 4.0, 1e-9));
    }

    #[test]
    fn contained_is_false_when_part_of_inner_sticks_out() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(0.0, 0.0, 2.0);
        assert!(!contained(&a, &b, 9.0, 9.0, 1e-9));
    }

    #[test]
    fn contained_allows_touching_the_boundary() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(0.0, 0.0, 2.0);
        assert!(contained(&a, &b, 0.0, 0.0, 1e-9));
    }
}
