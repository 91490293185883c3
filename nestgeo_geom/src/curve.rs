//! Curve linearization: quadratic/cubic Bezier and SVG elliptical arcs
//! decomposed into polylines within a caller-supplied chord tolerance.
//!
//! Every linearizer follows the same shape: a LIFO work queue of curve
//! segments, each either "flat" (contributes its endpoint to the
//! output) or split at its midpoint and re-queued with the second half
//! behind the first, so the stack drains in left-to-right order.

use crate::point::Point;

/// A single drawable curve, in the vocabulary every SVG path command
/// reduces to. `Line` is the trivial case used by `L/H/V` commands so
/// callers can route every path segment through [`linearize`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Curve {
    Line {
        p1: Point,
        p2: Point,
    },
    QuadraticBezier {
        p1: Point,
        ctrl: Point,
        p2: Point,
    },
    CubicBezier {
        p1: Point,
        ctrl1: Point,
        ctrl2: Point,
        p2: Point,
    },
    /// An elliptical arc in SVG "endpoint" form: `rx`/`ry` are the
    /// radii before the standard out-of-range correction, `x_rot_deg`
    /// is the rotation of the ellipse's x-axis in degrees.
    Arc {
        p1: Point,
        p2: Point,
        rx: f64,
        ry: f64,
        x_rot_deg: f64,
        large_arc: bool,
        sweep: bool,
    },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LinearizeError {
    #[error("curve linearization exceeded its iteration bound")]
    IterationCap { partial: Vec<Point> },
}

/// Linearizes `curve` into a polyline whose every chord lies within
/// `tol` of the true curve. The first and last points always equal the
/// curve's endpoints. On exceeding `max_iterations`, the curve's final
/// endpoint is appended and `Err` is returned carrying the partial
/// polyline built so far, per the linearization-cap diagnostic.
pub fn linearize(curve: &Curve, tol: f64, max_iterations: u32) -> Result<Vec<Point>, LinearizeError> {
    match *curve {
        Curve::Line { p1, p2 } => Ok(vec![p1, p2]),
        Curve::QuadraticBezier { p1, ctrl, p2 } => linearize_quadratic(p1, ctrl, p2, tol, max_iterations),
        Curve::CubicBezier { p1, ctrl1, ctrl2, p2 } => {
            linearize_cubic(p1, ctrl1, ctrl2, p2, tol, max_iterations)
        }
        Curve::Arc { p1, p2, rx, ry, x_rot_deg, large_arc, sweep } => {
            linearize_arc(p1, p2, rx, ry, x_rot_deg, large_arc, sweep, tol, max_iterations)
        }
    }
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

// ---------------------------------------------------------------- quad

#[derive(Copy, Clone)]
struct QuadSeg {
    p1: Point,
    ctrl: Point,
    p2: Point,
}

impl QuadSeg {
    fn is_flat(&self, tol: f64) -> bool {
        // (2c - p1 - p2)^2 <= 4 tol^2
        let dx = 2.0 * self.ctrl.x - self.p1.x - self.p2.x;
        let dy = 2.0 * self.ctrl.y - self.p1.y - self.p2.y;
        dx * dx + dy * dy <= 4.0 * tol * tol
    }

    fn split(&self) -> (QuadSeg, QuadSeg) {
        let p01 = midpoint(self.p1, self.ctrl);
        let p12 = midpoint(self.ctrl, self.p2);
        let mid = midpoint(p01, p12);
        (QuadSeg { p1: self.p1, ctrl: p01, p2: mid }, QuadSeg { p1: mid, ctrl: p12, p2: self.p2 })
    }
}

fn linearize_quadratic(
    p1: Point,
    ctrl: Point,
    p2: Point,
    tol: f64,
    max_iterations: u32,
) -> Result<Vec<Point>, LinearizeError> {
    let mut out = vec![p1];
    let mut stack = vec![QuadSeg { p1, ctrl, p2 }];
    let mut iterations = 0u32;
    while let Some(seg) = stack.pop() {
        iterations += 1;
        if iterations > max_iterations {
            out.push(p2);
            return Err(LinearizeError::IterationCap { partial: out });
        }
        if seg.is_flat(tol) {
            out.push(seg.p2);
        } else {
            let (left, right) = seg.split();
            stack.push(right);
            stack.push(left);
        }
    }
    Ok(out)
}

// --------------------------------------------------------------- cubic

#[derive(Copy, Clone)]
struct CubicSeg {
    p1: Point,
    ctrl1: Point,
    ctrl2: Point,
    p2: Point,
}

impl CubicSeg {
    fn is_flat(&self, tol: f64) -> bool {
        // max(|3c1 - 2p1 - p2|^2, |3c2 - 2p2 - p1|^2) <= 16 tol^2
        let ax = 3.0 * self.ctrl1.x - 2.0 * self.p1.x - self.p2.x;
        let ay = 3.0 * self.ctrl1.y - 2.0 * self.p1.y - self.p2.y;
        let bx = 3.0 * self.ctrl2.x - 2.0 * self.p2.x - self.p1.x;
        let by = 3.0 * self.ctrl2.y - 2.0 * self.p2.y - self.p1.y;
        let d1 = ax * ax + ay * ay;
        let d2 = bx * bx + by * by;
        d1.max(d2) <= 16.0 * tol * tol
    }

    fn split(&self) -> (CubicSeg, CubicSeg) {
        let p01 = midpoint(self.p1, self.ctrl1);
        let p12 = midpoint(self.ctrl1, self.ctrl2);
        let p23 = midpoint(self.ctrl2, self.p2);
        let p012 = midpoint(p01, p12);
        let p123 = midpoint(p12, p23);
        let mid = midpoint(p012, p123);
        (
            CubicSeg { p1: self.p1, ctrl1: p01, ctrl2: p012, p2: mid },
            CubicSeg { p1: mid, ctrl1: p123, ctrl2: p23, p2: self.p2 },
        )
    }
}

fn linearize_cubic(
    p1: Point,
    ctrl1: Point,
    ctrl2: Point,
    p2: Point,
    tol: f64,
    max_iterations: u32,
) -> Result<Vec<Point>, LinearizeError> {
    let mut out = vec![p1];
    let mut stack = vec![CubicSeg { p1, ctrl1, ctrl2, p2 }];
    let mut iterations = 0u32;
    while let Some(seg) = stack.pop() {
        iterations += 1;
        if iterations > max_iterations {
            out.push(p2);
            return Err(LinearizeError::IterationCap { partial: out });
        }
        if seg.is_flat(tol) {
            out.push(seg.p2);
        } else {
            let (left, right) = seg.split();
            stack.push(right);
            stack.push(left);
        }
    }
    Ok(out)
}

// ----------------------------------------------------------------- arc

/// Center parametrization of an elliptical arc: `center + R(phi) *
/// (rx*cos(theta), ry*sin(theta))` for `theta` ranging from
/// `theta_start` to `theta_end` (which may run in either direction and
/// may exceed a single turn's magnitude by design — it already encodes
/// `large_arc`/`sweep`).
struct ArcCenter {
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    phi: f64,
    theta_start: f64,
    theta_end: f64,
}

impl ArcCenter {
    fn point_at(&self, theta: f64) -> Point {
        let (s, c) = self.phi.sin_cos();
        let ex = self.rx * theta.cos();
        let ey = self.ry * theta.sin();
        Point::new(self.cx + c * ex - s * ey, self.cy + s * ex + c * ey)
    }
}

#[derive(Copy, Clone)]
struct ArcSeg {
    theta_start: f64,
    theta_end: f64,
}

impl ArcSeg {
    fn is_flat(&self, center: &ArcCenter, tol: f64) -> bool {
        let a = center.point_at(self.theta_start);
        let b = center.point_at(self.theta_end);
        let chord_mid = midpoint(a, b);
        let on_arc_mid = center.point_at((self.theta_start + self.theta_end) / 2.0);
        let dx = chord_mid.x - on_arc_mid.x;
        let dy = chord_mid.y - on_arc_mid.y;
        dx * dx + dy * dy <= tol * tol
    }

    fn split(&self) -> (ArcSeg, ArcSeg) {
        let mid = (self.theta_start + self.theta_end) / 2.0;
        (ArcSeg { theta_start: self.theta_start, theta_end: mid }, ArcSeg { theta_start: mid, theta_end: self.theta_end })
    }
}

fn angle_between(ux: f64, uy: f64, vx: f64, vy: f64) -> f64 {
    let dot = ux * vx + uy * vy;
    let len = (ux * ux + uy * uy).sqrt() * (vx * vx + vy * vy).sqrt();
    let cross = ux * vy - uy * vx;
    let mut angle = (dot / len).clamp(-1.0, 1.0).acos();
    if cross < 0.0 {
        angle = -angle;
    }
    angle
}

/// SVG endpoint-to-center conversion (F.6.5), including the
/// out-of-range radius correction (F.6.6).
fn endpoint_to_center(
    p1: Point,
    p2: Point,
    mut rx: f64,
    mut ry: f64,
    x_rot_deg: f64,
    large_arc: bool,
    sweep: bool,
) -> ArcCenter {
    rx = rx.abs();
    ry = ry.abs();
    let phi = x_rot_deg.to_radians();
    let (s, c) = phi.sin_cos();

    let dx2 = (p1.x - p2.x) / 2.0;
    let dy2 = (p1.y - p2.y) / 2.0;
    let x1p = c * dx2 + s * dy2;
    let y1p = -s * dx2 + c * dy2;

    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    let sign = if large_arc != sweep { 1.0 } else { -1.0 };
    let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    let co = if den <= 0.0 { 0.0 } else { sign * (num / den).max(0.0).sqrt() };

    let cxp = co * rx * y1p / ry;
    let cyp = co * -ry * x1p / rx;

    let cx = c * cxp - s * cyp + (p1.x + p2.x) / 2.0;
    let cy = s * cxp + c * cyp + (p1.y + p2.y) / 2.0;

    let ux = (x1p - cxp) / rx;
    let uy = (y1p - cyp) / ry;
    let vx = (-x1p - cxp) / rx;
    let vy = (-y1p - cyp) / ry;

    let theta1 = angle_between(1.0, 0.0, ux, uy);
    let mut delta = angle_between(ux, uy, vx, vy);
    if !sweep && delta > 0.0 {
        delta -= std::f64::consts::TAU;
    } else if sweep && delta < 0.0 {
        delta += std::f64::consts::TAU;
    }

    ArcCenter { cx, cy, rx, ry, phi, theta_start: theta1, theta_end: theta1 + delta }
}

#[allow(clippy::too_many_arguments)]
fn linearize_arc(
    p1: Point,
    p2: Point,
    rx: f64,
    ry: f64,
    x_rot_deg: f64,
    large_arc: bool,
    sweep: bool,
    tol: f64,
    max_iterations: u32,
) -> Result<Vec<Point>, LinearizeError> {
    if p1.almost_eq_default(&p2) {
        return Ok(vec![p1, p2]);
    }
    if rx.abs() <= crate::tolerance::TOL || ry.abs() <= crate::tolerance::TOL {
        // Radii too small to describe an ellipse: collapse to the chord.
        return Ok(vec![p1, p2]);
    }

    let center = endpoint_to_center(p1, p2, rx, ry, x_rot_deg, large_arc, sweep);

    let mut out = vec![p1];
    let mut stack = vec![ArcSeg { theta_start: center.theta_start, theta_end: center.theta_end }];
    let mut iterations = 0u32;
    while let Some(seg) = stack.pop() {
        iterations += 1;
        if iterations > max_iterations {
            out.push(p2);
            return Err(LinearizeError::IterationCap { partial: out });
        }
        if seg.is_flat(&center, tol) {
            out.push(center.point_at(seg.theta_end));
        } else {
            let (left, right) = seg.split();
            stack.push(right);
            stack.push(left);
        }
    }
    // Floating-point drift in the center parametrization can leave the
    // final emitted point a hair off the true endpoint; the contract
    // guarantees the polyline ends exactly on `p2`.
    if let Some(last) = out.last_mut() {
        *last = p2;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_is_its_own_endpoints() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(1.0, 1.0);
        let pts = linearize(&Curve::Line { p1, p2 }, 0.1, 100).unwrap();
        assert_eq!(pts, vec![p1, p2]);
    }

    #[test]
    fn flat_quadratic_emits_only_endpoints() {
        // Control point on the chord: already flat.
        let p1 = Point::new(0.0, 0.0);
        let ctrl = Point::new(5.0, 0.0);
        let p2 = Point::new(10.0, 0.0);
        let pts = linearize(&Curve::QuadraticBezier { p1, ctrl, p2 }, 0.5, 100).unwrap();
        assert_eq!(pts, vec![p1, p2]);
    }

    #[test]
    fn cubic_bezier_endpoints_match_scenario_4() {
        let p1 = Point::new(0.0, 0.0);
        let c1 = Point::new(0.0, 10.0);
        let c2 = Point::new(10.0, 10.0);
        let p2 = Point::new(10.0, 0.0);
        let pts = linearize(&Curve::CubicBezier { p1, ctrl1: c1, ctrl2: c2, p2 }, 0.5, 10_000).unwrap();
        assert_eq!(*pts.first().unwrap(), p1);
        assert_eq!(*pts.last().unwrap(), p2);
        assert!(pts.len() > 2);
    }

    #[test]
    fn cubic_chords_stay_within_twice_tolerance() {
        let p1 = Point::new(0.0, 0.0);
        let c1 = Point::new(0.0, 10.0);
        let c2 = Point::new(10.0, 10.0);
        let p2 = Point::new(10.0, 0.0);
        let tol = 0.5;
        let pts = linearize(&Curve::CubicBezier { p1, ctrl1: c1, ctrl2: c2, p2 }, tol, 10_000).unwrap();
        // Sample the analytic curve densely and make sure every polyline
        // midpoint lands near some point on the true curve.
        let sample = |t: f64| -> Point {
            let mt = 1.0 - t;
            let x = mt * mt * mt * p1.x
                + 3.0 * mt * mt * t * c1.x
                + 3.0 * mt * t * t * c2.x
                + t * t * t * p2.x;
            let y = mt * mt * mt * p1.y
                + 3.0 * mt * mt * t * c1.y
                + 3.0 * mt * t * t * c2.y
                + t * t * t * p2.y;
            Point::new(x, y)
        };
        for w in pts.windows(2) {
            let mid = midpoint(w[0], w[1]);
            let mut best = f64::MAX;
            let mut t = 0.0;
            while t <= 1.0 {
                let s = sample(t);
                let d = (s.x - mid.x).powi(2) + (s.y - mid.y).powi(2);
                if d < best {
                    best = d;
                }
                t += 0.001;
            }
            assert!(best.sqrt() <= 2.0 * tol + 1e-6);
        }
    }

    #[test]
    fn quarter_circle_arc_endpoints() {
        let p1 = Point::new(1.0, 0.0);
        let p2 = Point::new(0.0, 1.0);
        let pts = linearize(
            &Curve::Arc { p1, p2, rx: 1.0, ry: 1.0, x_rot_deg: 0.0, large_arc: false, sweep: true },
            0.01,
            10_000,
        )
        .unwrap();
        assert_eq!(*pts.first().unwrap(), p1);
        assert_eq!(*pts.last().unwrap(), p2);
        for p in &pts {
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn tiny_radius_arc_collapses_to_chord() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(1.0, 1.0);
        let pts = linearize(
            &Curve::Arc { p1, p2, rx: 1e-12, ry: 1e-12, x_rot_deg: 0.0, large_arc: false, sweep: true },
            0.01,
            100,
        )
        .unwrap();
        assert_eq!(pts, vec![p1, p2]);
    }

    #[test]
    fn iteration_cap_returns_partial_and_true_endpoint() {
        let p1 = Point::new(0.0, 0.0);
        let ctrl = Point::new(5.0, 1000.0);
        let p2 = Point::new(10.0, 0.0);
        let err = linearize(&Curve::QuadraticBezier { p1, ctrl, p2 }, 1e-9, 2).unwrap_err();
        match err {
            LinearizeError::IterationCap { partial } => {
                assert_eq!(*partial.first().unwrap(), p1);
                assert_eq!(*partial.last().unwrap(), p2);
            }
        }
    }
}
