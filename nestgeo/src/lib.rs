//! The nestgeo geometry core: 2D polygon primitives, segment/slide
//! algebra, No-Fit Polygon orbiting, shape assembly, and SVG-geometry
//! conversion, re-exported from their dedicated crates.
//!
//! This crate is a thin umbrella: each module's real documentation
//! lives in its own crate (`nestgeo_geom`, `nestgeo_polygon`,
//! `nestgeo_nfp`, `nestgeo_shapes`, `nestgeo_svg`).

pub use nestgeo_geom as geom;
pub use nestgeo_nfp as nfp;
pub use nestgeo_polygon as polygon;
pub use nestgeo_shapes as shapes;
pub use nestgeo_svg as svg;

pub use nestgeo_geom::{linearize, Curve, Diagnostic, DiagnosticKind, LinearizeError, Matrix, NestgeoError, Point, Vector};
pub use nestgeo_nfp::{nfp as compute_nfp, NfpMode, NfpOptions, NfpResult};
pub use nestgeo_polygon::{contained, intersect, Bounds, Containment, Polygon};
pub use nestgeo_shapes::{merged_bounds, ModelsToPlace, Provenance, Shape};
pub use nestgeo_svg::{load as load_svg, FontFactory, NestgeoConfig, NullFontFactory};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reexports_cover_the_whole_pipeline() {
        let p = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 1.0)]).unwrap();
        assert_eq!(p.area(), 1.0);

        let result = compute_nfp(&p, &p, NfpOptions::default());
        assert!(!result.loops.is_empty());

        let shape = Shape::new(vec![p.clone()], vec![], Provenance::default()).unwrap();
        assert_eq!(shape.bounds(), p.bounds());

        let (models, _) = load_svg(
            r#"<svg><rect x="1" y="1" width="2" height="2"/></svg>"#,
            &NestgeoConfig::default(),
            &NullFontFactory,
            None,
        )
        .unwrap();
        assert_eq!(models.total_parts(), 1);
    }
}
