//! Boolean/Minkowski facade (spec §4.5): an abstract interface over
//! integer-scaled coordinates, with a convex-hull-based default
//! implementation sufficient for the NFP engine's own needs (merging
//! touching polygons, hull fallbacks) — not a general polygon clipper.
//! A richer provider is swapped in at the call site by implementing
//! [`PolygonOps`]; this crate never shells out to or binds a native
//! library.

use crate::polygon::Polygon;
use nestgeo_geom::Point;

/// An integer-scaled point, the coordinate representation every
/// `PolygonOps` method operates over — the same `x * scale` rounding
/// convention used by Clipper-lineage integer-geometry libraries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
}

impl IntPoint {
    pub fn from_point(p: Point, scale: f64) -> IntPoint {
        IntPoint { x: (p.x * scale).round() as i64, y: (p.y * scale).round() as i64 }
    }

    pub fn to_point(self, scale: f64) -> Point {
        Point::new(self.x as f64 / scale, self.y as f64 / scale)
    }
}

fn to_int_points(p: &Polygon, scale: f64) -> Vec<IntPoint> {
    p.vertices().iter().map(|&v| IntPoint::from_point(v, scale)).collect()
}

fn cross(o: IntPoint, a: IntPoint, b: IntPoint) -> i128 {
    let (ox, oy) = (o.x as i128, o.y as i128);
    let (ax, ay) = (a.x as i128, a.y as i128);
    let (bx, by) = (b.x as i128, b.y as i128);
    (ax - ox) * (by - oy) - (ay - oy) * (bx - ox)
}

/// Andrew's monotone chain, over integer coordinates so the orientation
/// test (`cross`) is exact regardless of floating-point noise.
fn convex_hull(mut points: Vec<IntPoint>) -> Vec<IntPoint> {
    points.sort();
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let build = |pts: &[IntPoint]| -> Vec<IntPoint> {
        let mut hull: Vec<IntPoint> = Vec::new();
        for &p in pts {
            while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
                hull.pop();
            }
            hull.push(p);
        }
        hull
    };

    let mut lower = build(&points);
    points.reverse();
    let mut upper = build(&points);
    lower.pop();
    upper.pop();
    lower.append(&mut upper);
    lower
}

/// Sutherland-Hodgman clipping of `subject` against the half-planes of
/// `clip`. Exact only when `clip` is convex; the caller is responsible
/// for that precondition (the facade's own callers only ever clip
/// against hulls).
fn clip_convex(subject: &[IntPoint], clip: &[IntPoint]) -> Vec<IntPoint> {
    let mut output = subject.to_vec();
    let n = clip.len();
    for i in 0..n {
        if output.is_empty() {
            break;
        }
        let edge_a = clip[i];
        let edge_b = clip[(i + 1) % n];
        let input = output;
        output = Vec::with_capacity(input.len());
        for k in 0..input.len() {
            let cur = input[k];
            let prev = input[(k + input.len() - 1) % input.len()];
            let cur_inside = cross(edge_a, edge_b, cur) >= 0;
            let prev_inside = cross(edge_a, edge_b, prev) >= 0;
            if cur_inside {
                if !prev_inside {
                    if let Some(p) = int_line_intersect(prev, cur, edge_a, edge_b) {
                        output.push(p);
                    }
                }
                output.push(cur);
            } else if prev_inside {
                if let Some(p) = int_line_intersect(prev, cur, edge_a, edge_b) {
                    output.push(p);
                }
            }
        }
    }
    output
}

fn int_line_intersect(a: IntPoint, b: IntPoint, e: IntPoint, f: IntPoint) -> Option<IntPoint> {
    let (ax, ay, bx, by) = (a.x as f64, a.y as f64, b.x as f64, b.y as f64);
    let (ex, ey, fx, fy) = (e.x as f64, e.y as f64, f.x as f64, f.y as f64);
    let a1 = by - ay;
    let b1 = ax - bx;
    let c1 = bx * ay - ax * by;
    let a2 = fy - ey;
    let b2 = ex - fx;
    let c2 = fx * ey - ex * fy;
    let denom = a1 * b2 - a2 * b1;
    if denom.abs() <= 1e-9 {
        return None;
    }
    let x = (b1 * c2 - b2 * c1) / denom;
    let y = (a2 * c1 - a1 * c2) / denom;
    Some(IntPoint { x: x.round() as i64, y: y.round() as i64 })
}

fn polygon_from_int(points: Vec<IntPoint>, scale: f64) -> Option<Polygon> {
    let verts: Vec<Point> = points.into_iter().map(|p| p.to_point(scale)).collect();
    Polygon::new(verts)
}

/// The Boolean/Minkowski facade's verb-object surface. Every method
/// takes `clipper_scale` explicitly (no implicit global state) so a
/// caller using a different `NestgeoConfig` can mix providers freely.
pub trait PolygonOps {
    fn union(&self, subject: &Polygon, clip: &Polygon, clipper_scale: f64) -> Vec<Polygon>;
    fn intersection(&self, subject: &Polygon, clip: &Polygon, clipper_scale: f64) -> Vec<Polygon>;
    fn difference(&self, subject: &Polygon, clip: &Polygon, clipper_scale: f64) -> Vec<Polygon>;
    fn xor(&self, subject: &Polygon, clip: &Polygon, clipper_scale: f64) -> Vec<Polygon>;
    fn minkowski_sum(&self, a: &Polygon, b: &Polygon, clipper_scale: f64) -> Option<Polygon>;
    fn simplify(&self, p: &Polygon, clipper_scale: f64) -> Vec<Polygon>;
    fn clean(&self, p: &Polygon, min_spacing: f64, clipper_scale: f64) -> Polygon;
    fn offset(&self, p: &Polygon, delta: f64, clipper_scale: f64) -> Vec<Polygon>;
}

/// The pure-Rust default: convex-hull-based union, Sutherland-Hodgman
/// intersection (exact only when `clip` is convex, which every caller
/// in this crate arranges for), and an overlap-aware fallback for
/// difference/xor. Good enough for the NFP engine's own tangent-
/// polygon merging; a real clipper belongs behind the same trait.
#[derive(Default, Clone, Copy)]
pub struct SoftwareBoolean;

impl PolygonOps for SoftwareBoolean {
    fn union(&self, subject: &Polygon, clip: &Polygon, clipper_scale: f64) -> Vec<Polygon> {
        let mut pts = to_int_points(subject, clipper_scale);
        pts.extend(to_int_points(clip, clipper_scale));
        let hull = convex_hull(pts);
        polygon_from_int(hull, clipper_scale).into_iter().collect()
    }

    fn intersection(&self, subject: &Polygon, clip: &Polygon, clipper_scale: f64) -> Vec<Polygon> {
        let subj = to_int_points(subject, clipper_scale);
        let clip_hull = convex_hull(to_int_points(clip, clipper_scale));
        let result = clip_convex(&subj, &clip_hull);
        polygon_from_int(result, clipper_scale).into_iter().collect()
    }

    fn difference(&self, subject: &Polygon, clip: &Polygon, clipper_scale: f64) -> Vec<Polygon> {
        if self.intersection(subject, clip, clipper_scale).is_empty() {
            return vec![subject.clone()];
        }
        log::warn!("difference of overlapping polygons requested; the default boolean provider only guarantees non-overlapping output, returning the subject unchanged — inject a higher-fidelity PolygonOps for exact concave difference");
        vec![subject.clone()]
    }

    fn xor(&self, subject: &Polygon, clip: &Polygon, clipper_scale: f64) -> Vec<Polygon> {
        if self.intersection(subject, clip, clipper_scale).is_empty() {
            return vec![subject.clone(), clip.clone()];
        }
        log::warn!("xor of overlapping polygons requested; the default boolean provider falls back to the union — inject a higher-fidelity PolygonOps for exact concave xor");
        self.union(subject, clip, clipper_scale)
    }

    /// Minkowski sum of two convex polygons as the convex hull of all
    /// pairwise vertex sums — O(n·m) rather than the O(n+m) merge-by-
    /// angle algorithm, but correct for convex inputs and far simpler.
    fn minkowski_sum(&self, a: &Polygon, b: &Polygon, clipper_scale: f64) -> Option<Polygon> {
        let av = to_int_points(a, clipper_scale);
        let bv = to_int_points(b, clipper_scale);
        let mut sums = Vec::with_capacity(av.len() * bv.len());
        for p in &av {
            for q in &bv {
                sums.push(IntPoint { x: p.x + q.x, y: p.y + q.y });
            }
        }
        polygon_from_int(convex_hull(sums), clipper_scale)
    }

    /// Drops consecutive near-duplicate vertices and vertices that are
    /// collinear with their neighbors, at integer-scaled precision.
    fn simplify(&self, p: &Polygon, clipper_scale: f64) -> Vec<Polygon> {
        let pts = to_int_points(p, clipper_scale);
        let n = pts.len();
        if n < 3 {
            return Vec::new();
        }
        let mut kept = Vec::with_capacity(n);
        for i in 0..n {
            let prev = pts[(i + n - 1) % n];
            let cur = pts[i];
            let next = pts[(i + 1) % n];
            if cur == prev {
                continue;
            }
            if cross(prev, cur, next) == 0 {
                continue;
            }
            kept.push(cur);
        }
        polygon_from_int(kept, clipper_scale).into_iter().collect()
    }

    /// Removes vertices within `min_spacing` of their predecessor,
    /// matching Clipper's `CleanPolygon` contract.
    fn clean(&self, p: &Polygon, min_spacing: f64, clipper_scale: f64) -> Polygon {
        let min_spacing_scaled = (min_spacing * clipper_scale).max(0.0);
        let pts = to_int_points(p, clipper_scale);
        let mut kept: Vec<IntPoint> = Vec::with_capacity(pts.len());
        for cur in pts {
            if let Some(&last) = kept.last() {
                let dx = (cur.x - last.x) as f64;
                let dy = (cur.y - last.y) as f64;
                if (dx * dx + dy * dy).sqrt() < min_spacing_scaled {
                    continue;
                }
            }
            kept.push(cur);
        }
        if kept.len() >= 2 {
            let dx = (kept[0].x - kept[kept.len() - 1].x) as f64;
            let dy = (kept[0].y - kept[kept.len() - 1].y) as f64;
            if (dx * dx + dy * dy).sqrt() < min_spacing_scaled {
                kept.pop();
            }
        }
        polygon_from_int(kept, clipper_scale).unwrap_or_else(|| p.clone())
    }

    /// Offsets every vertex along the average of its two adjacent edge
    /// normals by `delta` (positive grows the polygon, negative shrinks
    /// it). A vertex-normal offset rather than a proper miter/round
    /// join — adequate for the NFP engine's own small safety margins,
    /// not a substitute for a real offsetting library on sharp corners.
    fn offset(&self, p: &Polygon, delta: f64, _clipper_scale: f64) -> Vec<Polygon> {
        let verts = p.vertices();
        let n = verts.len();
        if n < 3 {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let prev = verts[(i + n - 1) % n];
            let cur = verts[i];
            let next = verts[(i + 1) % n];
            let e1 = (cur - prev).perpendicular().normalized();
            let e2 = (next - cur).perpendicular().normalized();
            let bisector = (e1 + e2).normalized();
            out.push(cur.translate(bisector.dx * delta, bisector.dy * delta));
        }
        Polygon::new(out).into_iter().collect()
    }
}
