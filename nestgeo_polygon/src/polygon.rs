//! Polygon primitives: area, bounds, centroid, perimeter, containment,
//! rectangle detection, winding, and out-of-place transforms.

use nestgeo_geom::{Point, TOL};
use std::cell::Cell;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box, stored as `(min corner, size)` so the
/// scenario in spec.md §8.5 ("bounds (1,2,3,4)") reads directly off
/// `(x, y, width, height)`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// The smallest `Bounds` containing both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        Bounds { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y }
    }
}

/// The three-valued result of a point-in-polygon test; "on-boundary"
/// is distinct from both "inside" and "outside", not folded into
/// either.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Outside,
    OnBoundary,
}

/// An ordered sequence of at least 3 points forming a closed boundary.
/// Vertices are deep-copied on construction and the sequence is
/// logically immutable afterward: every transform returns a new
/// `Polygon`. Derived attributes (area, bounds, centroid, perimeter)
/// are computed lazily and cached.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Polygon {
    vertices: Vec<Point>,
    /// Child polygons interpreted as holes. No structural constraint
    /// beyond "each hole lies inside its parent" is enforced here.
    pub holes: Vec<Polygon>,
    #[cfg_attr(feature = "serialization", serde(skip))]
    area_cache: Cell<Option<f64>>,
    #[cfg_attr(feature = "serialization", serde(skip))]
    bounds_cache: Cell<Option<Bounds>>,
    #[cfg_attr(feature = "serialization", serde(skip))]
    centroid_cache: Cell<Option<Point>>,
    #[cfg_attr(feature = "serialization", serde(skip))]
    perimeter_cache: Cell<Option<f64>>,
}

impl Polygon {
    /// Builds a polygon from at least 3 vertices. Returns `None` for
    /// fewer than 3 vertices or any non-finite coordinate, matching
    /// the `invalid-input` diagnostic kind in spec.md §7 (callers
    /// needing the diagnostic wrap this with [`nestgeo_geom::Diagnostic`]).
    pub fn new(vertices: Vec<Point>) -> Option<Polygon> {
        if vertices.len() < 3 {
            return None;
        }
        Some(Polygon {
            vertices,
            holes: Vec::new(),
            area_cache: Cell::new(None),
            bounds_cache: Cell::new(None),
            centroid_cache: Cell::new(None),
            perimeter_cache: Cell::new(None),
        })
    }

    pub fn with_holes(vertices: Vec<Point>, holes: Vec<Polygon>) -> Option<Polygon> {
        let mut p = Polygon::new(vertices)?;
        p.holes = holes;
        Some(p)
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        false // construction guarantees >= 3 vertices
    }

    /// The edges of the polygon as `(vertex[i], vertex[i+1])` pairs,
    /// wrapping from the last vertex back to the first.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    fn clear_caches(&self) {
        self.area_cache.set(None);
        self.bounds_cache.set(None);
        self.centroid_cache.set(None);
        self.perimeter_cache.set(None);
    }

    /// The signed shoelace area. The sign encodes winding: positive
    /// for counter-clockwise, negative for clockwise, under this
    /// crate's fixed orientation convention.
    pub fn signed_area(&self) -> f64 {
        if let Some(a) = self.area_cache.get() {
            return a;
        }
        let n = self.vertices.len();
        let mut sum = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            sum += (b.x + a.x) * (b.y - a.y);
        }
        let area = sum / 2.0;
        self.area_cache.set(Some(area));
        area
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    pub fn bounds(&self) -> Bounds {
        if let Some(b) = self.bounds_cache.get() {
            return b;
        }
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for &v in &self.vertices[1..] {
            min = Point::min(min, v);
            max = Point::max(max, v);
        }
        let bounds = Bounds { x: min.x, y: min.y, width: max.x - min.x, height: max.y - min.y };
        self.bounds_cache.set(Some(bounds));
        bounds
    }

    /// The area-weighted centroid. Falls back to the plain vertex
    /// average when the signed area magnitude is below `tol`, so a
    /// degenerate (near-zero-area) polygon still yields a usable point
    /// instead of dividing by ~0.
    pub fn centroid(&self, tol: f64) -> Point {
        if let Some(c) = self.centroid_cache.get() {
            return c;
        }
        let area = self.signed_area();
        let centroid = if area.abs() <= tol {
            let n = self.vertices.len() as f64;
            let sx: f64 = self.vertices.iter().map(|p| p.x).sum();
            let sy: f64 = self.vertices.iter().map(|p| p.y).sum();
            Point::new(sx / n, sy / n)
        } else {
            let n = self.vertices.len();
            let mut cx = 0.0;
            let mut cy = 0.0;
            for i in 0..n {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                let cross = a.x * b.y - b.x * a.y;
                cx += (a.x + b.x) * cross;
                cy += (a.y + b.y) * cross;
            }
            Point::new(cx / (6.0 * area), cy / (6.0 * area))
        };
        self.centroid_cache.set(Some(centroid));
        centroid
    }

    pub fn perimeter(&self) -> f64 {
        if let Some(p) = self.perimeter_cache.get() {
            return p;
        }
        let total: f64 = self.edges().map(|(a, b)| (b - a).length()).sum();
        self.perimeter_cache.set(Some(total));
        total
    }

    /// Ray-casting point-in-polygon test using a horizontal ray cast
    /// from `p` toward `+x`. Boundary hits (on a vertex or on an edge's
    /// open segment) are reported as [`Containment::OnBoundary`]
    /// before falling back to crossing parity.
    pub fn contains(&self, p: Point, tol: f64) -> Containment {
        for (a, b) in self.edges() {
            if p.almost_eq(&a, tol) || p.almost_eq(&b, tol) {
                return Containment::OnBoundary;
            }
            if crate::segment::on_segment(a, b, p, tol) {
                return Containment::OnBoundary;
            }
        }

        let mut inside = false;
        let n = self.vertices.len();
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let crosses_y = (a.y > p.y) != (b.y > p.y);
            if crosses_y {
                let x_at_y = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_at_y {
                    inside = !inside;
                }
            }
        }
        if inside {
            Containment::Inside
        } else {
            Containment::Outside
        }
    }

    /// True iff the polygon has 4 distinct vertices (or 5 with the
    /// closing vertex repeating the first) each lying on a corner of
    /// its own bounding box, with all four corners realized.
    /// Adjacent-edge orthogonality follows implicitly: 4 distinct
    /// points each pinned to one of 4 bounding-box corners, all
    /// corners used, can only be the box itself in some rotation.
    pub fn is_rectangle(&self, tol: f64) -> bool {
        let mut verts = self.vertices.clone();
        if verts.len() == 5 && verts[0].almost_eq(&verts[4], tol) {
            verts.pop();
        }
        if verts.len() != 4 {
            return false;
        }

        let b = self.bounds();
        let corners = [
            Point::new(b.x, b.y),
            Point::new(b.x + b.width, b.y),
            Point::new(b.x + b.width, b.y + b.height),
            Point::new(b.x, b.y + b.height),
        ];

        let mut used = [false; 4];
        for v in &verts {
            let mut matched = false;
            for (i, c) in corners.iter().enumerate() {
                if !used[i] && v.almost_eq(c, tol) {
                    used[i] = true;
                    matched = true;
                    break;
                }
            }
            if !matched {
                return false;
            }
        }
        used.iter().all(|&u| u)
    }

    fn map_vertices(&self, f: impl Fn(Point) -> Point) -> Polygon {
        let vertices = self.vertices.iter().map(|&p| f(p)).collect();
        let holes = self.holes.iter().map(|h| h.map_vertices(&f)).collect();
        Polygon::with_holes(vertices, holes).expect("mapping preserves vertex count")
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Polygon {
        self.map_vertices(|p| p.translate(dx, dy))
    }

    pub fn scale(&self, sx: f64, sy: f64) -> Polygon {
        self.map_vertices(|p| Point::new(p.x * sx, p.y * sy))
    }

    /// Rotates the polygon by `angle_deg` degrees around the origin.
    /// Rotate around an arbitrary pivot by translating to the origin,
    /// rotating, and translating back.
    pub fn rotate(&self, angle_deg: f64) -> Polygon {
        let rad = angle_deg.to_radians();
        let (s, c) = rad.sin_cos();
        self.map_vertices(|p| Point::new(p.x * c - p.y * s, p.x * s + p.y * c))
    }

    /// Reverses vertex order, flipping the winding and the sign of
    /// [`Polygon::signed_area`].
    pub fn reverse(&self) -> Polygon {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        let holes = self.holes.iter().map(Polygon::reverse).collect();
        Polygon::with_holes(vertices, holes).expect("reversal preserves vertex count")
    }

    pub fn clear_all_caches(&self) {
        self.clear_caches();
        for h in &self.holes {
            h.clear_all_caches();
        }
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices && self.holes == other.holes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn area_is_invariant_under_rotation() {
        let p = square();
        let area = p.area();
        for angle in [0.0, 30.0, 90.0, 137.0] {
            let r = p.rotate(angle);
            assert!((r.area() - area).abs() < 1e-9);
        }
    }

    #[test]
    fn area_is_exactly_invariant_under_translation() {
        let p = square();
        let area = p.area();
        let t = p.translate(3.5, -2.25);
        assert_eq!(t.area(), area);
    }

    #[test]
    fn contains_classifies_inside_outside_boundary() {
        let p = square();
        assert_eq!(p.contains(Point::new(0.5, 0.5), 1e-9), Containment::Inside);
        assert_eq!(p.contains(Point::new(2.0, 2.0), 1e-9), Containment::Outside);
        assert_eq!(p.contains(Point::new(0.0, 0.0), 1e-9), Containment::OnBoundary);
        assert_eq!(p.contains(Point::new(0.5, 0.0), 1e-9), Containment::OnBoundary);
    }

    #[test]
    fn square_is_a_rectangle() {
        assert!(square().is_rectangle(1e-9));
    }

    #[test]
    fn triangle_is_not_a_rectangle() {
        let t = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)]).unwrap();
        assert!(!t.is_rectangle(1e-9));
    }

    #[test]
    fn svg_rect_scenario_area_and_bounds() {
        // <rect x=1 y=2 width=3 height=4>
        let p = Polygon::new(vec![
            Point::new(1.0, 2.0),
            Point::new(4.0, 2.0),
            Point::new(4.0, 6.0),
            Point::new(1.0, 6.0),
        ])
        .unwrap();
        assert_eq!(p.area(), 12.0);
        assert_eq!(p.bounds(), Bounds { x: 1.0, y: 2.0, width: 3.0, height: 4.0 });
    }

    #[test]
    fn degenerate_area_centroid_falls_back_to_average() {
        // Three collinear "vertices": zero area.
        let p = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)]).unwrap();
        let c = p.centroid(TOL);
        assert!((c.x - 1.0).abs() < 1e-9 && c.y.abs() < 1e-9);
    }

    #[test]
    fn reverse_flips_winding_sign() {
        let p = square();
        let r = p.reverse();
        assert!((p.signed_area() + r.signed_area()).abs() < 1e-9);
    }
}
