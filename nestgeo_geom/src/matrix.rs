//! Affine transforms, composed lazily from a sequence of primitive
//! operations and flattened to a 6-tuple on first query.

use crate::point::Point;
use std::cell::Cell;

/// One step of an affine transform, as it would appear in an SVG
/// `transform` attribute.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PrimitiveTransform {
    Translate { x: f64, y: f64 },
    Scale { x: f64, y: f64 },
    /// Rotation by `angle_deg` degrees around `(cx, cy)` (the origin
    /// when `cx`/`cy` are absent from the source attribute).
    Rotate { angle_deg: f64, cx: f64, cy: f64 },
    SkewX { angle_deg: f64 },
    SkewY { angle_deg: f64 },
    /// A raw `matrix(a, b, c, d, e, f)` token.
    Matrix { a: f64, b: f64, c: f64, d: f64, e: f64, f: f64 },
}

impl PrimitiveTransform {
    fn to_flat(self) -> [f64; 6] {
        match self {
            PrimitiveTransform::Translate { x, y } => [1.0, 0.0, 0.0, 1.0, x, y],
            PrimitiveTransform::Scale { x, y } => [x, 0.0, 0.0, y, 0.0, 0.0],
            PrimitiveTransform::Rotate { angle_deg, cx, cy } => {
                let rad = angle_deg.to_radians();
                let (s, c) = rad.sin_cos();
                if cx == 0.0 && cy == 0.0 {
                    [c, s, -s, c, 0.0, 0.0]
                } else {
                    // rotate(a, cx, cy) == translate(cx, cy) rotate(a) translate(-cx, -cy)
                    let e = cx - c * cx + s * cy;
                    let f = cy - s * cx - c * cy;
                    [c, s, -s, c, e, f]
                }
            }
            PrimitiveTransform::SkewX { angle_deg } => {
                [1.0, 0.0, angle_deg.to_radians().tan(), 1.0, 0.0, 0.0]
            }
            PrimitiveTransform::SkewY { angle_deg } => {
                [1.0, angle_deg.to_radians().tan(), 0.0, 1.0, 0.0, 0.0]
            }
            PrimitiveTransform::Matrix { a, b, c, d, e, f } => [a, b, c, d, e, f],
        }
    }
}

/// A 2x3 affine transform, stored as a composed sequence of primitive
/// transforms. The flattened 6-tuple `[a, b, c, d, e, f]` (applying as
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`) is cached on first query
/// and invalidated whenever the sequence changes.
#[derive(Clone, Debug)]
pub struct Matrix {
    ops: Vec<PrimitiveTransform>,
    cache: Cell<Option<[f64; 6]>>,
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::identity()
    }
}

impl Matrix {
    pub fn identity() -> Self {
        Matrix { ops: Vec::new(), cache: Cell::new(Some([1.0, 0.0, 0.0, 1.0, 0.0, 0.0])) }
    }

    pub fn from_primitive(op: PrimitiveTransform) -> Self {
        Matrix { ops: vec![op], cache: Cell::new(None) }
    }

    /// Appends a primitive transform, applied *after* the existing
    /// sequence (i.e. outermost), and invalidates the flattened cache.
    pub fn push(&mut self, op: PrimitiveTransform) {
        self.ops.push(op);
        self.cache.set(None);
    }

    /// Returns a new matrix with `other` applied after `self`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        let mut ops = self.ops.clone();
        ops.extend(other.ops.iter().copied());
        Matrix { ops, cache: Cell::new(None) }
    }

    /// The flattened `[a, b, c, d, e, f]` tuple, folding the primitive
    /// sequence left-to-right (first pushed, first applied) on first
    /// access after a mutation and caching the result.
    pub fn flattened(&self) -> [f64; 6] {
        if let Some(m) = self.cache.get() {
            return m;
        }
        let mut acc = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        for op in &self.ops {
            acc = compose(acc, op.to_flat());
        }
        self.cache.set(Some(acc));
        acc
    }

    pub fn apply(&self, p: Point) -> Point {
        let [a, b, c, d, e, f] = self.flattened();
        Point::new(a * p.x + c * p.y + e, b * p.x + d * p.y + f)
    }

    pub fn is_identity(&self) -> bool {
        let m = self.flattened();
        m == [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
    }
}

/// Composes two flattened matrices so that `inner` is applied first,
/// then `outer`.
fn compose(outer: [f64; 6], inner: [f64; 6]) -> [f64; 6] {
    let [a1, b1, c1, d1, e1, f1] = outer;
    let [a2, b2, c2, d2, e2, f2] = inner;
    [
        a1 * a2 + c1 * b2,
        b1 * a2 + d1 * b2,
        a1 * c2 + c1 * d2,
        b1 * c2 + d1 * d2,
        a1 * e2 + c1 * f2 + e1,
        b1 * e2 + d1 * f2 + f1,
    ]
}

/// Parses the SVG `transform` attribute grammar: a whitespace/comma
/// separated sequence of `matrix|translate|scale|rotate|skewX|skewY`
/// calls. Tokens with the wrong argument arity are silently skipped,
/// matching browsers' lenient handling of malformed transform lists.
pub fn parse_transform_string(input: &str) -> Matrix {
    let mut matrix = Matrix::identity();
    let mut rest = input;
    while let Some(paren) = rest.find('(') {
        let name = rest[..paren].trim();
        let close = match rest[paren..].find(')') {
            Some(idx) => paren + idx,
            None => break,
        };
        let args: Vec<f64> = rest[paren + 1..close]
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<f64>().ok())
            .collect();

        match (name, args.as_slice()) {
            ("matrix", &[a, b, c, d, e, f]) => {
                matrix.push(PrimitiveTransform::Matrix { a, b, c, d, e, f })
            }
            ("translate", &[x, y]) => matrix.push(PrimitiveTransform::Translate { x, y }),
            ("translate", &[x]) => matrix.push(PrimitiveTransform::Translate { x, y: 0.0 }),
            ("scale", &[x, y]) => matrix.push(PrimitiveTransform::Scale { x, y }),
            ("scale", &[x]) => matrix.push(PrimitiveTransform::Scale { x, y: x }),
            ("rotate", &[angle_deg]) => {
                matrix.push(PrimitiveTransform::Rotate { angle_deg, cx: 0.0, cy: 0.0 })
            }
            ("rotate", &[angle_deg, cx, cy]) => {
                matrix.push(PrimitiveTransform::Rotate { angle_deg, cx, cy })
            }
            ("skewX", &[angle_deg]) => matrix.push(PrimitiveTransform::SkewX { angle_deg }),
            ("skewY", &[angle_deg]) => matrix.push(PrimitiveTransform::SkewY { angle_deg }),
            _ => {
                log::trace!("parse_transform_string: ignoring token `{name}` with wrong arity");
            }
        }

        rest = &rest[close + 1..];
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_identity() {
        assert!(Matrix::identity().is_identity());
    }

    #[test]
    fn translate_moves_a_point() {
        let m = Matrix::from_primitive(PrimitiveTransform::Translate { x: 3.0, y: -2.0 });
        let p = m.apply(Point::new(1.0, 1.0));
        assert!(p.almost_eq_default(&Point::new(4.0, -1.0)));
    }

    #[test]
    fn rotate_90_about_origin() {
        let m = Matrix::from_primitive(PrimitiveTransform::Rotate { angle_deg: 90.0, cx: 0.0, cy: 0.0 });
        let p = m.apply(Point::new(1.0, 0.0));
        assert!(p.almost_eq(&Point::new(0.0, 1.0), 1e-9));
    }

    #[test]
    fn cache_invalidates_on_push() {
        let mut m = Matrix::identity();
        assert!(m.is_identity());
        m.push(PrimitiveTransform::Translate { x: 1.0, y: 0.0 });
        assert!(!m.is_identity());
    }

    #[test]
    fn parse_transform_string_composes_in_order() {
        let m = parse_transform_string("translate(1,2) scale(2)");
        let p = m.apply(Point::new(1.0, 1.0));
        // scale first (inner), then translate: (2,2) -> (3,4)
        assert!(p.almost_eq_default(&Point::new(3.0, 4.0)));
    }

    #[test]
    fn parse_transform_string_ignores_bad_arity() {
        let m = parse_transform_string("translate(1,2,3) scale(2)");
        // translate with 3 args is dropped, only scale(2) applies
        let p = m.apply(Point::new(1.0, 1.0));
        assert!(p.almost_eq_default(&Point::new(2.0, 2.0)));
    }
}
