//! SVG path (`d` attribute) grammar: absolute segment resolution
//! followed by C2 curve linearization, producing one [`Polygon`] per
//! closed subpath.

use nestgeo_geom::{linearize, Curve, Diagnostic, DiagnosticKind, Point};
use nestgeo_polygon::Polygon;
use svgtypes::{PathParser, PathSegment};

const MAX_LINEARIZE_ITERATIONS: u32 = 4096;

/// One subpath: the curves making it up, in order, plus whether the
/// source `d` string closed it with `Z`/`z`.
struct Subpath {
    curves: Vec<Curve>,
    closed: bool,
}

/// Parses `d` into absolute segments (per spec §4.8/§6, relative
/// commands are converted to absolute on ingest) and groups them into
/// subpaths split at each `M`/`m`.
fn parse_segments(d: &str) -> Result<Vec<Subpath>, Diagnostic> {
    let mut subpaths = Vec::new();
    let mut curves: Vec<Curve> = Vec::new();
    let mut closed = false;

    let mut cur = Point::new(0.0, 0.0);
    let mut subpath_start = cur;
    // The reflected control point for `S`/`T` shorthand curves, valid
    // only when the previous segment was itself a curve of the same
    // family; `None` otherwise falls back to the current point.
    let mut prev_cubic_ctrl: Option<Point> = None;
    let mut prev_quad_ctrl: Option<Point> = None;

    let finish_subpath = |subpaths: &mut Vec<Subpath>, curves: &mut Vec<Curve>, closed: bool| {
        if !curves.is_empty() {
            subpaths.push(Subpath { curves: std::mem::take(curves), closed });
        }
    };

    for segment in PathParser::from(d) {
        let segment = segment
            .map_err(|e| Diagnostic::new(DiagnosticKind::InvalidInput, format!("malformed path data: {e}")))?;

        let mut this_cubic_ctrl = None;
        let mut this_quad_ctrl = None;

        match segment {
            PathSegment::MoveTo { abs, x, y } => {
                finish_subpath(&mut subpaths, &mut curves, closed);
                closed = false;
                cur = resolve(cur, abs, x, y);
                subpath_start = cur;
            }
            PathSegment::LineTo { abs, x, y } => {
                let p2 = resolve(cur, abs, x, y);
                curves.push(Curve::Line { p1: cur, p2 });
                cur = p2;
            }
            PathSegment::HorizontalLineTo { abs, x } => {
                let p2 = if abs { Point::new(x, cur.y) } else { Point::new(cur.x + x, cur.y) };
                curves.push(Curve::Line { p1: cur, p2 });
                cur = p2;
            }
            PathSegment::VerticalLineTo { abs, y } => {
                let p2 = if abs { Point::new(cur.x, y) } else { Point::new(cur.x, cur.y + y) };
                curves.push(Curve::Line { p1: cur, p2 });
                cur = p2;
            }
            PathSegment::CurveTo { abs, x1, y1, x2, y2, x, y } => {
                let ctrl1 = resolve(cur, abs, x1, y1);
                let ctrl2 = resolve(cur, abs, x2, y2);
                let p2 = resolve(cur, abs, x, y);
                curves.push(Curve::CubicBezier { p1: cur, ctrl1, ctrl2, p2 });
                this_cubic_ctrl = Some(ctrl2);
                cur = p2;
            }
            PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => {
                let ctrl1 = prev_cubic_ctrl.map(|c| reflect(cur, c)).unwrap_or(cur);
                let ctrl2 = resolve(cur, abs, x2, y2);
                let p2 = resolve(cur, abs, x, y);
                curves.push(Curve::CubicBezier { p1: cur, ctrl1, ctrl2, p2 });
                this_cubic_ctrl = Some(ctrl2);
                cur = p2;
            }
            PathSegment::Quadratic { abs, x1, y1, x, y } => {
                let ctrl = resolve(cur, abs, x1, y1);
                let p2 = resolve(cur, abs, x, y);
                curves.push(Curve::QuadraticBezier { p1: cur, ctrl, p2 });
                this_quad_ctrl = Some(ctrl);
                cur = p2;
            }
            PathSegment::SmoothQuadratic { abs, x, y } => {
                let ctrl = prev_quad_ctrl.map(|c| reflect(cur, c)).unwrap_or(cur);
                let p2 = resolve(cur, abs, x, y);
                curves.push(Curve::QuadraticBezier { p1: cur, ctrl, p2 });
                this_quad_ctrl = Some(ctrl);
                cur = p2;
            }
            PathSegment::EllipticalArc { abs, rx, ry, x_axis_rotation, large_arc, sweep, x, y } => {
                let p2 = resolve(cur, abs, x, y);
                curves.push(Curve::Arc {
                    p1: cur,
                    p2,
                    rx,
                    ry,
                    x_rot_deg: x_axis_rotation,
                    large_arc,
                    sweep,
                });
                cur = p2;
            }
            PathSegment::ClosePath { .. } => {
                if !cur.almost_eq_default(&subpath_start) {
                    curves.push(Curve::Line { p1: cur, p2: subpath_start });
                }
                cur = subpath_start;
                closed = true;
                finish_subpath(&mut subpaths, &mut curves, closed);
                closed = false;
            }
        }

        prev_cubic_ctrl = this_cubic_ctrl;
        prev_quad_ctrl = this_quad_ctrl;
    }

    finish_subpath(&mut subpaths, &mut curves, closed);
    Ok(subpaths)
}

fn resolve(cur: Point, abs: bool, x: f64, y: f64) -> Point {
    if abs {
        Point::new(x, y)
    } else {
        Point::new(cur.x + x, cur.y + y)
    }
}

/// The mirror image of `ctrl` about `pivot`, used for `S`/`T` shorthand.
fn reflect(pivot: Point, ctrl: Point) -> Point {
    Point::new(2.0 * pivot.x - ctrl.x, 2.0 * pivot.y - ctrl.y)
}

/// Parses `d`, linearizes every curve in every subpath, and returns
/// one `Polygon` per subpath whose endpoints coincide within `tol`
/// (an explicit `Z`, or endpoints that already meet). Open subpaths
/// are dropped: a converter that only emits closed boundaries has
/// nothing useful to do with a dangling polyline.
pub fn path_to_polygons(d: &str, tol: f64) -> Result<Vec<Polygon>, Diagnostic> {
    let subpaths = parse_segments(d)?;
    let mut polygons = Vec::new();

    for subpath in subpaths {
        let mut points: Vec<Point> = Vec::new();
        for curve in &subpath.curves {
            let linearized = match linearize(curve, tol, MAX_LINEARIZE_ITERATIONS) {
                Ok(pts) => pts,
                Err(nestgeo_geom::LinearizeError::IterationCap { partial }) => {
                    let _ = Diagnostic::new(DiagnosticKind::LinearizationCap, "path curve exceeded its linearization bound");
                    partial
                }
            };
            if let Some(&last) = points.last() {
                if last.almost_eq_default(&linearized[0]) {
                    points.extend(&linearized[1..]);
                    continue;
                }
            }
            points.extend(linearized);
        }

        let endpoints_coincide =
            points.len() >= 2 && points.first().unwrap().almost_eq(&points.last().unwrap(), tol);
        if endpoints_coincide {
            points.pop();
        }

        if subpath.closed || endpoints_coincide {
            if let Some(p) = Polygon::new(points) {
                polygons.push(p);
            }
        }
    }

    Ok(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_path_yields_one_closed_polygon() {
        let polys = path_to_polygons("M0,0 L10,0 L10,10 L0,10 Z", 0.5).unwrap();
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].area(), 100.0);
    }

    #[test]
    fn cubic_curve_path_matches_scenario_4_endpoints() {
        // spec.md §8 scenario 4, closed into a triangle-ish loop so it
        // survives as a polygon.
        let polys = path_to_polygons("M0,0 C0,10 10,10 10,0 L0,0 Z", 0.5).unwrap();
        assert_eq!(polys.len(), 1);
        assert!(polys[0].area() > 0.0);
    }

    #[test]
    fn relative_commands_resolve_against_the_current_point() {
        let abs = path_to_polygons("M0,0 L10,0 L10,10 L0,10 Z", 0.5).unwrap();
        let rel = path_to_polygons("M0,0 l10,0 l0,10 l-10,0 z", 0.5).unwrap();
        assert_eq!(abs[0].area(), rel[0].area());
    }

    #[test]
    fn malformed_path_data_is_an_error() {
        assert!(path_to_polygons("M0,0 Q", 0.5).is_err());
    }
}
