//! Shape assembly (spec §4.7): grouping outer polygons with their
//! holes, and the part/sheet counts the placement search consumes.

use nestgeo_polygon::{Bounds, Polygon};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Opaque bookkeeping carried alongside a [`Shape`]'s geometry: where
/// it came from and how it should be treated, none of which the
/// geometry layer itself interprets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Provenance {
    /// The originating SVG element's `id`, if any.
    pub element_id: Option<String>,
    /// The source file this shape was loaded from, if any.
    pub filename: Option<String>,
    /// Mirrors the source element's visibility (e.g. `display:none`);
    /// carried through rather than dropped, since a caller may still
    /// want to report on hidden elements.
    pub visible: bool,
}

/// One or more outer polygons (the "item") plus zero or more hole
/// polygons (the "inner"), with provenance. A multi-outer-polygon
/// shape models a part made of several disjoint islands that must
/// still be placed as one rigid unit.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Shape {
    outer: Vec<Polygon>,
    inner: Vec<Polygon>,
    pub provenance: Provenance,
}

impl Shape {
    /// Builds a `Shape` from at least one outer polygon. Returns
    /// `None` for an empty outer list — a shape with no geometry at
    /// all isn't representable.
    pub fn new(outer: Vec<Polygon>, inner: Vec<Polygon>, provenance: Provenance) -> Option<Shape> {
        if outer.is_empty() {
            return None;
        }
        Some(Shape { outer, inner, provenance })
    }

    pub fn outer(&self) -> &[Polygon] {
        &self.outer
    }

    pub fn inner(&self) -> &[Polygon] {
        &self.inner
    }

    /// The bounding box enclosing every outer polygon (holes are, by
    /// construction, already inside their parent and don't widen it).
    pub fn bounds(&self) -> Bounds {
        merged_bounds(&self.outer)
    }

    /// Applies `f` to every outer and hole polygon, preserving
    /// provenance. Rotation, translation, and simplification all
    /// compose through this single hook rather than each needing
    /// their own `Shape`-level method.
    pub fn map(&self, f: impl Fn(&Polygon) -> Polygon) -> Shape {
        Shape {
            outer: self.outer.iter().map(&f).collect(),
            inner: self.inner.iter().map(&f).collect(),
            provenance: self.provenance.clone(),
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Shape {
        self.map(|p| p.translate(dx, dy))
    }

    pub fn rotate(&self, angle_deg: f64) -> Shape {
        self.map(|p| p.rotate(angle_deg))
    }
}

/// The smallest [`Bounds`] enclosing every polygon in `polygons`.
/// Panics only if `polygons` is empty — every call site here supplies
/// a shape's non-empty outer list.
pub fn merged_bounds(polygons: &[Polygon]) -> Bounds {
    let mut iter = polygons.iter();
    let first = iter.next().expect("merged_bounds requires at least one polygon").bounds();
    iter.fold(first, |acc, p| acc.union(&p.bounds()))
}

/// The assembly output: how many of each part to place, and how many
/// of each sheet are available to place them on.
#[derive(Debug, Default)]
pub struct ModelsToPlace {
    pub filename: Option<String>,
    parts: Vec<(Shape, u32)>,
    sheets: Vec<(Shape, u32)>,
}

impl ModelsToPlace {
    pub fn new(filename: Option<String>) -> Self {
        ModelsToPlace { filename, parts: Vec::new(), sheets: Vec::new() }
    }

    pub fn add_part(&mut self, shape: Shape, desired_quantity: u32) {
        self.parts.push((shape, desired_quantity));
    }

    pub fn add_sheet(&mut self, shape: Shape, available_quantity: u32) {
        self.sheets.push((shape, available_quantity));
    }

    pub fn parts(&self) -> &[(Shape, u32)] {
        &self.parts
    }

    pub fn sheets(&self) -> &[(Shape, u32)] {
        &self.sheets
    }

    pub fn total_parts(&self) -> u32 {
        self.parts.iter().map(|(_, n)| n).sum()
    }

    pub fn total_sheets(&self) -> u32 {
        self.sheets.iter().map(|(_, n)| n).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestgeo_geom::Point;

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
    fn hole_detection_scenario() {
        // spec.md §8 scenario 6: a part with one child polygon strictly
        // inside it.
        let outer = square(0.0, 0.0, 10.0);
        let hole = square(2.0, 2.0, 2.0);
        let shape = Shape::new(vec![outer], vec![hole], Provenance::default()).unwrap();
        assert_eq!(shape.outer().len(), 1);
        assert_eq!(shape.inner().len(), 1);
        assert_eq!(shape.outer()[0].area(), 100.0);
        assert_eq!(shape.inner()[0].area(), 4.0);
    }

    #[test]
    fn map_preserves_provenance_and_transforms_every_polygon() {
        let provenance = Provenance { element_id: Some("part-1".into()), filename: None, visible: true };
        let shape = Shape::new(vec![square(0.0, 0.0, 1.0)], vec![], provenance.clone()).unwrap();
        let moved = shape.translate(5.0, 5.0);
        assert_eq!(moved.provenance, provenance);
        assert_eq!(moved.outer()[0].bounds().x, 5.0);
    }

    #[test]
    fn shape_requires_at_least_one_outer_polygon() {
        assert!(Shape::new(vec![], vec![], Provenance::default()).is_none());
    }

    #[test]
    fn merged_bounds_unions_disjoint_polygons() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(10.0, 10.0, 2.0);
        let b_ = merged_bounds(&[a, b]);
        assert_eq!(b_, Bounds { x: 0.0, y: 0.0, width: 12.0, height: 12.0 });
    }

    #[test]
    fn models_to_place_tracks_desired_and_available_counts() {
        let mut models = ModelsToPlace::new(Some("job.svg".into()));
        let part = Shape::new(vec![square(0.0, 0.0, 1.0)], vec![], Provenance::default()).unwrap();
        let sheet = Shape::new(vec![square(0.0, 0.0, 100.0)], vec![], Provenance::default()).unwrap();
        models.add_part(part, 5);
        models.add_sheet(sheet, 2);
        assert_eq!(models.total_parts(), 5);
        assert_eq!(models.total_sheets(), 2);
    }
}
