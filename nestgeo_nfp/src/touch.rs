//! Touch detection (spec §4.6.1) and the per-touch candidate
//! translation vectors the main orbiting loop tries next.

use arrayvec::ArrayVec;
use nestgeo_geom::{Point, Vector};
use nestgeo_polygon::{on_segment, Polygon};

/// Every touch kind produces at most 4 candidate directions.
pub type Candidates = ArrayVec<Vector, 4>;

/// The three ways two polygon boundaries can meet at a point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TouchKind {
    VertexVertex,
    AEdgeContainsBVertex,
    BEdgeContainsAVertex,
}

/// A single touch between `a` (fixed) and `b` at its current offset.
/// `a_index`/`b_index` mean different things depending on `kind`: for
/// `VertexVertex` both are vertex indices; for `AEdgeContainsBVertex`,
/// `a_index` is the index of `a`'s edge (`a_index`, `a_index+1`) and
/// `b_index` is `b`'s vertex; for `BEdgeContainsAVertex` the roles
/// swap.
#[derive(Copy, Clone, Debug)]
pub struct Touching {
    pub kind: TouchKind,
    pub a_index: usize,
    pub b_index: usize,
}

/// Finds every point where the boundary of `a` and the boundary of `b`
/// (translated by `(b_dx, b_dy)`) touch: coincident vertices, a vertex
/// of `b` lying on an open edge of `a`, or a vertex of `a` lying on an
/// open edge of `b`. Polygons commonly touch at more than one point at
/// once; the main loop's multiple-loop search (spec §4.6.3) depends on
/// seeing all of them, not just the first.
pub fn find_touches(a: &Polygon, b: &Polygon, b_dx: f64, b_dy: f64, tol: f64) -> Vec<Touching> {
    let mut touches = Vec::new();
    let av = a.vertices();
    let na = av.len();
    let bv: Vec<Point> = b.vertices().iter().map(|v| v.translate(b_dx, b_dy)).collect();
    let nb = bv.len();

    for (i, &av_i) in av.iter().enumerate() {
        for (j, &bv_j) in bv.iter().enumerate() {
            if av_i.almost_eq(&bv_j, tol) {
                touches.push(Touching { kind: TouchKind::VertexVertex, a_index: i, b_index: j });
            }
        }
    }

    for i in 0..na {
        let a1 = av[i];
        let a2 = av[(i + 1) % na];
        for (j, &bv_j) in bv.iter().enumerate() {
            if on_segment(a1, a2, bv_j, tol) {
                touches.push(Touching { kind: TouchKind::AEdgeContainsBVertex, a_index: i, b_index: j });
            }
        }
    }

    for j in 0..nb {
        let b1 = bv[j];
        let b2 = bv[(j + 1) % nb];
        for (i, &av_i) in av.iter().enumerate() {
            if on_segment(b1, b2, av_i, tol) {
                touches.push(Touching { kind: TouchKind::BEdgeContainsAVertex, a_index: i, b_index: j });
            }
        }
    }

    touches
}

/// The candidate translation vectors worth trying at a single touch:
/// each follows an edge already meeting at the touch point (rather
/// than an arbitrary heading), matching the orbiting loop's invariant
/// that every step slides along some edge of `a` or `b`.
pub fn candidate_vectors(a: &Polygon, b: &Polygon, touch: &Touching) -> Candidates {
    let av = a.vertices();
    let bv = b.vertices();
    let na = av.len();
    let nb = bv.len();
    let mut out = Candidates::new();

    match touch.kind {
        TouchKind::VertexVertex => {
            let a_prev = av[(touch.a_index + na - 1) % na];
            let a_cur = av[touch.a_index];
            let a_next = av[(touch.a_index + 1) % na];
            out.push(a_cur - a_prev);
            out.push(a_next - a_cur);

            let b_prev = bv[(touch.b_index + nb - 1) % nb];
            let b_cur = bv[touch.b_index];
            let b_next = bv[(touch.b_index + 1) % nb];
            out.push((b_cur - b_prev).reversed());
            out.push((b_next - b_cur).reversed());
        }
        TouchKind::AEdgeContainsBVertex => {
            let a1 = av[touch.a_index];
            let a2 = av[(touch.a_index + 1) % na];
            out.push(a2 - a1);
            out.push((a2 - a1).reversed());
        }
        TouchKind::BEdgeContainsAVertex => {
            let b1 = bv[touch.b_index];
            let b2 = bv[(touch.b_index + 1) % nb];
            out.push((b2 - b1).reversed());
            out.push(b2 - b1);
        }
    }

    out
}

/// Drops any candidate whose direction is, within `tol`, the exact
/// reverse of `last_direction`. Without this the orbiting loop can
/// step back along the move it just made and oscillate between two
/// touches forever instead of progressing around the boundary.
pub fn reject_immediate_retrace(candidates: Vec<Vector>, last_direction: Option<Vector>, tol: f64) -> Vec<Vector> {
    let Some(last) = last_direction else {
        return candidates;
    };
    let last_n = last.normalized();
    candidates
        .into_iter()
        .filter(|v| {
            let n = v.normalized();
            !(n.cross(last_n).abs() <= tol && n.dot(last_n) < 0.0)
        })
        .collect()
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
    fn finds_vertex_vertex_touch() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(0.0, 0.0, 1.0);
        // B's origin vertex coincides with A's origin vertex.
        let touches = find_touches(&a, &b, 0.0, 0.0, 1e-9);
        assert!(touches.iter().any(|t| t.kind == TouchKind::VertexVertex && t.a_index == 0 && t.b_index == 0));
    }

    #[test]
    fn finds_vertex_on_edge_touch() {
        let a = square(0.0, 0.0, 4.0);
        let b = square(-1.0, 2.0, 1.0);
        // B's right-middle vertex (0, 2) lies on A's left edge.
        let touches = find_touches(&a, &b, 0.0, 0.0, 1e-9);
        assert!(touches.iter().any(|t| t.kind == TouchKind::AEdgeContainsBVertex));
    }

    #[test]
    fn no_touches_when_disjoint() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(10.0, 10.0, 2.0);
        assert!(find_touches(&a, &b, 0.0, 0.0, 1e-9).is_empty());
    }

    #[test]
    fn candidate_vectors_follow_edges_at_vertex_touch() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(0.0, 0.0, 1.0);
        let touch = Touching { kind: TouchKind::VertexVertex, a_index: 0, b_index: 0 };
        let candidates = candidate_vectors(&a, &b, &touch);
        assert_eq!(candidates.len(), 4);
    }

    #[test]
    fn retrace_rejection_drops_exact_reverse() {
        let last = Vector::new(1.0, 0.0);
        let candidates = vec![Vector::new(-1.0, 0.0), Vector::new(0.0, 1.0)];
        let kept = reject_immediate_retrace(candidates, Some(last), 1e-9);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0], Vector::new(0.0, 1.0));
    }
}
