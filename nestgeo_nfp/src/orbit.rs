//! The No-Fit Polygon orbiting engine (spec §4.6) — the centerpiece of
//! this crate. Computes the locus B's reference vertex (its
//! `vertices()[0]`) traces out as B slides around the outside of A
//! without overlapping it (exterior NFP, used to place one part next
//! to another), or around the inside of A while staying contained
//! (interior NFP, used to place a part inside a sheet or a hole).

use crate::slide::{polygon_projection_distance, polygon_slide_distance};
use crate::touch::{candidate_vectors, find_touches, reject_immediate_retrace, TouchKind};
use nestgeo_geom::{Diagnostic, DiagnosticKind, Point, Vector, TOL};
use nestgeo_polygon::{contained, intersect, Polygon};

/// Exterior vs. interior orbiting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NfpMode {
    Exterior,
    Interior,
}

/// Tunables for the orbiting loop.
#[derive(Copy, Clone, Debug)]
pub struct NfpOptions {
    pub mode: NfpMode,
    /// After the first loop closes, keep searching for additional
    /// disjoint NFP loops restricted to unmarked vertices of A.
    pub search_edges: bool,
    pub tol: f64,
    /// The main loop's iteration cap is `iteration_cap_factor * (|A| + |B|)`.
    pub iteration_cap_factor: usize,
}

impl Default for NfpOptions {
    fn default() -> Self {
        NfpOptions { mode: NfpMode::Exterior, search_edges: false, tol: TOL, iteration_cap_factor: 10 }
    }
}

/// The result of an NFP computation: every loop found (more than one
/// only when `search_edges` is set and A/B's shapes admit it), plus
/// any diagnostic raised while tracing them. A diagnostic with no
/// loops means the search never found a valid starting position; a
/// diagnostic alongside one or more loops means a later loop went bad
/// mid-trace and was abandoned, while the loops already closed are
/// still returned.
#[derive(Debug, Default)]
pub struct NfpResult {
    pub loops: Vec<Polygon>,
    pub diagnostic: Option<Diagnostic>,
}

/// Computes the NFP of `b` orbiting `a` per `options.mode`.
pub fn nfp(a: &Polygon, b: &Polygon, options: NfpOptions) -> NfpResult {
    let interior = options.mode == NfpMode::Interior;

    if let Some(rect) = rectangle_nfp(a, b, interior, options.tol) {
        return NfpResult { loops: vec![rect], diagnostic: None };
    }

    let mut marked = vec![false; a.len()];
    let mut loops: Vec<Polygon> = Vec::new();

    loop {
        let Some((anchor_idx, start)) = starting_offset(a, b, interior, &marked, &loops, options.tol) else {
            if loops.is_empty() {
                let diag = Diagnostic::new(
                    DiagnosticKind::NfpStuck,
                    "no feasible starting position found for either polygon's vertex set",
                );
                return NfpResult { loops, diagnostic: Some(diag) };
            }
            return NfpResult { loops, diagnostic: None };
        };
        marked[anchor_idx] = true;

        match orbit(a, b, start, interior, options, &mut marked) {
            Ok(loop_polygon) => loops.push(loop_polygon),
            Err(diag) => return NfpResult { loops, diagnostic: Some(diag) },
        }

        if !options.search_edges {
            return NfpResult { loops, diagnostic: None };
        }
    }
}

/// The exact rectangle formula for axis-aligned rectangle pairs,
/// bypassing the orbiting loop entirely (spec §8 scenarios 1 and 2).
/// `None` when either polygon isn't a rectangle, or (for the interior
/// case) `b` doesn't fit inside `a` at all.
fn rectangle_nfp(a: &Polygon, b: &Polygon, interior: bool, tol: f64) -> Option<Polygon> {
    if !a.is_rectangle(tol) || !b.is_rectangle(tol) {
        return None;
    }
    let ab = a.bounds();
    let bb = b.bounds();

    let (x, y, w, h) = if interior {
        if bb.width > ab.width + tol || bb.height > ab.height + tol {
            return None;
        }
        (ab.x, ab.y, ab.width - bb.width, ab.height - bb.height)
    } else {
        (ab.x - bb.width, ab.y - bb.height, ab.width + bb.width, ab.height + bb.height)
    };

    Polygon::new(vec![
        Point::new(x, y),
        Point::new(x + w, y),
        Point::new(x + w, y + h),
        Point::new(x, y + h),
    ])
}

/// Finds a starting offset for a new NFP loop: an anchor vertex of `a`
/// (not yet marked) paired with a vertex of `b`, placed so the
/// resulting offset is feasible. Returns the anchor's index on `a` so
/// the caller can mark it, alongside the offset itself.
fn starting_offset(
    a: &Polygon,
    b: &Polygon,
    interior: bool,
    marked: &[bool],
    existing_loops: &[Polygon],
    tol: f64,
) -> Option<(usize, (f64, f64))> {
    if interior {
        interior_starting_offset(a, b, marked, existing_loops, tol)
    } else {
        exterior_starting_offset(a, b, marked)
    }
}

/// Exterior mode (spec §4.6.2): pick the unmarked vertex of A with
/// minimum y and the vertex of B with maximum y, then translate B so
/// the two coincide. This places B tangent to A from outside at A's
/// lowest point, overlap-free by construction.
fn exterior_starting_offset(a: &Polygon, b: &Polygon, marked: &[bool]) -> Option<(usize, (f64, f64))> {
    let a_idx = min_y_unmarked_index(a.vertices(), marked)?;
    let a_anchor = a.vertices()[a_idx];
    let b_anchor = max_y_vertex(b.vertices());
    Some((a_idx, (a_anchor.x - b_anchor.x, a_anchor.y - b_anchor.y)))
}

fn min_y_unmarked_index(vertices: &[Point], marked: &[bool]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, v) in vertices.iter().enumerate() {
        if marked[i] {
            continue;
        }
        let is_better = match best {
            None => true,
            Some(bi) => v.y < vertices[bi].y || (v.y == vertices[bi].y && v.x < vertices[bi].x),
        };
        if is_better {
            best = Some(i);
        }
    }
    best
}

fn max_y_vertex(vertices: &[Point]) -> Point {
    let mut best = vertices[0];
    for &v in &vertices[1..] {
        if v.y > best.y || (v.y == best.y && v.x > best.x) {
            best = v;
        }
    }
    best
}

/// Interior mode (spec §4.6.2): tries placing each unmarked vertex of
/// A onto each vertex of B; when none of those direct placements is
/// feasible, falls back to sliding B along the A-edges incident to
/// that anchor vertex (by the feasible slide distance along each) and
/// retests. A placement is feasible when B sits inside A without
/// crossing its boundary and its reference vertex's world position
/// isn't already a vertex of a previously found loop.
fn interior_starting_offset(
    a: &Polygon,
    b: &Polygon,
    marked: &[bool],
    existing_loops: &[Polygon],
    tol: f64,
) -> Option<(usize, (f64, f64))> {
    let ab = a.bounds();
    let bb = b.bounds();
    if bb.width > ab.width + tol || bb.height > ab.height + tol {
        return None;
    }

    let av = a.vertices();
    let bv = b.vertices();
    let n = av.len();
    let b0 = bv[0];

    for i in 0..n {
        if marked[i] {
            continue;
        }
        let anchor = av[i];

        for &bv_j in bv {
            let offset = (anchor.x - bv_j.x, anchor.y - bv_j.y);
            if is_feasible_interior_start(a, b, offset, existing_loops, b0, tol) {
                return Some((i, offset));
            }
        }

        // No direct vertex-to-vertex placement worked at this anchor;
        // slide B along each A-edge incident to it and retest.
        let prev = av[(i + n - 1) % n];
        let next = av[(i + 1) % n];
        let base = (anchor.x - bb.x, anchor.y - bb.y);
        for edge in [anchor - prev, next - anchor] {
            let dir = edge.normalized();
            if dir.length() <= tol {
                continue;
            }
            let Some(slide) = polygon_slide_distance(a, b, dir, true, tol) else { continue };
            if slide <= tol {
                continue;
            }
            let offset = (base.0 + dir.dx * slide, base.1 + dir.dy * slide);
            if is_feasible_interior_start(a, b, offset, existing_loops, b0, tol) {
                return Some((i, offset));
            }
        }
    }

    None
}

fn is_feasible_interior_start(a: &Polygon, b: &Polygon, offset: (f64, f64), existing_loops: &[Polygon], b0: Point, tol: f64) -> bool {
    if !contained(a, b, offset.0, offset.1, tol) {
        return false;
    }
    let world = Point::new(b0.x + offset.0, b0.y + offset.1);
    !existing_loops.iter().any(|lp| lp.vertices().iter().any(|p| p.almost_eq(&world, tol)))
}

/// Walks `b` around `a`'s boundary (or `a`'s interior, for the
/// interior case) from `start`, recording `b`'s reference vertex at
/// each step, until the trace returns to its seed offset. Marks every
/// vertex of `a` involved in a touch along the way, so a subsequent
/// `search_edges` restart doesn't re-seed from a vertex this loop
/// already passed through.
fn orbit(a: &Polygon, b: &Polygon, start: (f64, f64), interior: bool, options: NfpOptions, marked: &mut [bool]) -> Result<Polygon, Diagnostic> {
    let tol = options.tol;
    let b0 = b.vertices()[0];
    let cap = options.iteration_cap_factor * (a.len() + b.len());
    let na = a.len();

    let mut offset = start;
    let mut trace = vec![Point::new(b0.x + offset.0, b0.y + offset.1)];
    let mut last_direction: Option<Vector> = None;
    let mut seen_offsets = vec![offset];

    for _ in 0..cap {
        let touches = find_touches(a, b, offset.0, offset.1, tol);
        if touches.is_empty() {
            return Err(Diagnostic::new(DiagnosticKind::NfpStuck, "lost contact between the two polygons mid-orbit"));
        }

        for t in &touches {
            match t.kind {
                TouchKind::VertexVertex | TouchKind::BEdgeContainsAVertex => marked[t.a_index] = true,
                TouchKind::AEdgeContainsBVertex => {
                    marked[t.a_index] = true;
                    marked[(t.a_index + 1) % na] = true;
                }
            }
        }

        let mut candidates: Vec<Vector> = touches.iter().flat_map(|t| candidate_vectors(a, b, t)).collect();
        candidates = reject_immediate_retrace(candidates, last_direction, tol);
        if candidates.is_empty() {
            return Err(Diagnostic::new(DiagnosticKind::NfpStuck, "every candidate direction was an immediate retrace"));
        }

        // Among feasible candidates (those with a well-defined slide
        // distance that doesn't immediately overlap), the orbiting
        // loop advances by the *largest* feasible distance: this
        // follows the longest straight run of the current edge before
        // the next constraint kicks in, rather than taking the first
        // workable direction and re-deriving touches every epsilon.
        // The measured slide is the feasible distance; it's clamped
        // upward only by the candidate vector's own length (an edge
        // can't be followed past its own endpoint) and, for interior
        // orbits, by the projection distance onto A's boundary.
        let mut best: Option<(Vector, f64)> = None;
        for v in &candidates {
            let Some(slide) = polygon_slide_distance(a, b, *v, true, tol) else { continue };
            if slide <= tol {
                continue;
            }
            let mut dist = slide.min(v.length());
            if interior {
                if let Some(proj) = polygon_projection_distance(a, b, *v, tol) {
                    dist = dist.min(proj);
                }
            }
            if dist <= tol {
                continue;
            }
            let candidate_offset = (offset.0 + v.dx * dist, offset.1 + v.dy * dist);
            let feasible = if interior {
                contained(a, b, candidate_offset.0, candidate_offset.1, tol)
            } else {
                !intersect(a, 0.0, 0.0, b, candidate_offset.0, candidate_offset.1, tol)
            };
            if !feasible {
                continue;
            }
            if best.map(|(_, d)| dist > d).unwrap_or(true) {
                best = Some((*v, dist));
            }
        }

        let Some((direction, dist)) = best else {
            return Err(Diagnostic::new(DiagnosticKind::NfpStuck, "no candidate direction produced a feasible slide"));
        };

        offset = (offset.0 + direction.dx * dist, offset.1 + direction.dy * dist);
        last_direction = Some(direction);

        if seen_offsets.iter().any(|&(ox, oy)| (ox - offset.0).abs() <= tol && (oy - offset.1).abs() <= tol) {
            if (offset.0 - start.0).abs() <= tol && (offset.1 - start.1).abs() <= tol {
                break;
            }
            return Err(Diagnostic::new(DiagnosticKind::NfpPrematureLoop, "orbit revisited an offset before returning to its seed"));
        }
        seen_offsets.push(offset);
        trace.push(Point::new(b0.x + offset.0, b0.y + offset.1));
    }

    if trace.len() < 3 {
        return Err(Diagnostic::new(DiagnosticKind::NfpIterationCap, "orbit hit its iteration cap before closing"));
    }

    Polygon::new(trace).ok_or_else(|| Diagnostic::new(DiagnosticKind::NfpIterationCap, "orbit hit its iteration cap before closing"))
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

    fn triangle(pts: [(f64, f64); 3]) -> Polygon {
        Polygon::new(pts.iter().map(|&(x, y)| Point::new(x, y)).collect()).unwrap()
    }

    #[test]
    fn exterior_nfp_of_two_unit_squares() {
        // spec.md §8 scenario 1.
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.0, 0.0, 1.0);
        let result = nfp(&a, &b, NfpOptions::default());
        assert_eq!(result.loops.len(), 1);
        assert_eq!(result.loops[0].bounds(), nestgeo_polygon::Bounds { x: -1.0, y: -1.0, width: 2.0, height: 2.0 });
    }

    #[test]
    fn interior_nfp_of_rectangle_in_rectangle() {
        // spec.md §8 scenario 2.
        let a = square(0.0, 0.0, 10.0);
        let b = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(3.0, 2.0), Point::new(0.0, 2.0)]).unwrap();
        let options = NfpOptions { mode: NfpMode::Interior, ..NfpOptions::default() };
        let result = nfp(&a, &b, options);
        assert_eq!(result.loops.len(), 1);
        assert_eq!(result.loops[0].bounds(), nestgeo_polygon::Bounds { x: 0.0, y: 0.0, width: 7.0, height: 8.0 });
    }

    #[test]
    fn interior_nfp_rejects_oversized_part() {
        let a = square(0.0, 0.0, 5.0);
        let b = square(0.0, 0.0, 10.0);
        let options = NfpOptions { mode: NfpMode::Interior, ..NfpOptions::default() };
        let result = nfp(&a, &b, options);
        assert!(result.loops.is_empty());
        assert!(result.diagnostic.is_some());
    }

    #[test]
    fn exterior_nfp_of_two_triangles_is_a_closed_loop() {
        // A non-rectangular pair: exercises the general orbiting path
        // rather than the rectangle fast path.
        let a = triangle([(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)]);
        let b = triangle([(0.0, 0.0), (2.0, 0.0), (1.0, 2.0)]);
        let result = nfp(&a, &b, NfpOptions::default());
        assert!(result.diagnostic.is_none(), "unexpected diagnostic: {:?}", result.diagnostic);
        assert_eq!(result.loops.len(), 1);
        assert!(result.loops[0].len() >= 3);
    }

    #[test]
    fn interior_nfp_of_triangle_in_triangle_is_a_closed_loop() {
        let a = triangle([(0.0, 0.0), (20.0, 0.0), (7.0, 25.0)]);
        let b = triangle([(0.0, 0.0), (2.0, 0.0), (1.0, 2.0)]);
        let options = NfpOptions { mode: NfpMode::Interior, ..NfpOptions::default() };
        let result = nfp(&a, &b, options);
        assert!(result.diagnostic.is_none(), "unexpected diagnostic: {:?}", result.diagnostic);
        assert_eq!(result.loops.len(), 1);
        assert!(result.loops[0].len() >= 3);
    }
}
