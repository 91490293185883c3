//! Element-by-element SVG-to-geometry conversion (spec §4.8): walks
//! the DOM built by [`crate::dom`], turning each recognized graphic
//! primitive into one or more [`Polygon`]s, then assembles the
//! per-top-level-element polygon sets into [`Shape`]s and finally a
//! [`ModelsToPlace`].

use nestgeo_geom::{linearize, parse_transform_string, Curve, Diagnostic, DiagnosticKind, Matrix, Point};
use nestgeo_polygon::{contained, Polygon};
use nestgeo_shapes::{ModelsToPlace, Provenance, Shape};

use crate::config::NestgeoConfig;
use crate::dom::Element;
use crate::font::FontFactory;
use crate::path;

const RECOGNIZED: &[&str] =
    &["svg", "g", "rect", "circle", "ellipse", "polygon", "polyline", "line", "path", "image", "text"];

fn apply_matrix(p: &Polygon, m: &Matrix) -> Polygon {
    let vertices: Vec<Point> = p.vertices().iter().map(|v| m.apply(*v)).collect();
    // `p` was already a valid polygon (>= 3 vertices, finite coordinates);
    // an affine transform can't change either property.
    Polygon::new(vertices).expect("transforming a valid polygon always yields a valid polygon")
}

fn element_transform(el: &Element, parent: &Matrix) -> Matrix {
    match el.attr("transform") {
        Some(s) => parent.then(&parse_transform_string(s)),
        None => parent.clone(),
    }
}

/// Converts `rect(x, y, w, h)` to a four-vertex polygon. Returns
/// `None` for the zero-origin rectangles OnShape's SVG export leaves
/// behind as a page-boundary artifact, and for non-positive size.
fn rect_polygon(el: &Element) -> Option<Polygon> {
    let x = el.attr_f64("x", 0.0);
    let y = el.attr_f64("y", 0.0);
    let w = el.attr_f64("width", 0.0);
    let h = el.attr_f64("height", 0.0);
    if x == 0.0 && y == 0.0 {
        return None;
    }
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    Polygon::new(vec![Point::new(x, y), Point::new(x + w, y), Point::new(x + w, y + h), Point::new(x, y + h)])
}

fn circle_polygon(el: &Element, cfg: &NestgeoConfig) -> Option<Polygon> {
    let cx = el.attr_f64("cx", 0.0);
    let cy = el.attr_f64("cy", 0.0);
    let r = el.attr_f64("r", 0.0);
    ellipse_like(cx, cy, r, r, cfg)
}

fn ellipse_polygon(el: &Element, cfg: &NestgeoConfig) -> Option<Polygon> {
    let cx = el.attr_f64("cx", 0.0);
    let cy = el.attr_f64("cy", 0.0);
    let rx = el.attr_f64("rx", 0.0);
    let ry = el.attr_f64("ry", 0.0);
    ellipse_like(cx, cy, rx, ry, cfg)
}

/// The chord tolerance that makes C2's adaptive arc linearizer settle
/// on at least `circle_segments` segments around the full ellipse, so
/// `circle_segments` acts as a floor under the usual tolerance-driven
/// subdivision rather than a separate sampling path.
fn circle_tolerance_floor(r: f64, circle_segments: u32) -> f64 {
    let n = (circle_segments.max(3) as f64).max(1.0);
    let theta = std::f64::consts::TAU / n;
    r * (1.0 - (theta / 2.0).cos())
}

/// A full circle/ellipse is linearized as two opposing half-arcs
/// (spec §4.8) rather than one 360-degree arc, since the endpoint
/// parametrization is singular when `p1 == p2`.
fn ellipse_like(cx: f64, cy: f64, rx: f64, ry: f64, cfg: &NestgeoConfig) -> Option<Polygon> {
    if rx <= cfg.tolerance || ry <= cfg.tolerance {
        return None;
    }
    let tol = cfg.tolerance.min(circle_tolerance_floor(rx.max(ry), cfg.circle_segments));
    let left = Point::new(cx - rx, cy);
    let right = Point::new(cx + rx, cy);
    let first = Curve::Arc { p1: right, p2: left, rx, ry, x_rot_deg: 0.0, large_arc: false, sweep: true };
    let second = Curve::Arc { p1: left, p2: right, rx, ry, x_rot_deg: 0.0, large_arc: false, sweep: true };
    let mut points = linearize(&first, tol, 4096).unwrap_or_default();
    let mut tail = linearize(&second, tol, 4096).unwrap_or_default();
    if !tail.is_empty() {
        tail.remove(0);
    }
    points.append(&mut tail);
    if !points.is_empty() {
        points.pop();
    }
    Polygon::new(points)
}

fn parse_points_attr(s: &str) -> Vec<Point> {
    let nums: Vec<f64> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .filter_map(|t| t.parse::<f64>().ok())
        .collect();
    nums.chunks_exact(2).map(|pair| Point::new(pair[0], pair[1])).collect()
}

fn polygon_from_points(el: &Element) -> Option<Polygon> {
    let pts = parse_points_attr(el.attr("points").unwrap_or(""));
    Polygon::new(pts)
}

fn polyline_from_points(el: &Element, tol: f64) -> Option<Polygon> {
    let pts = parse_points_attr(el.attr("points").unwrap_or(""));
    if pts.len() < 3 {
        return None;
    }
    if !pts.first()?.almost_eq(pts.last()?, tol) {
        return None;
    }
    let mut pts = pts;
    pts.pop();
    Polygon::new(pts)
}

fn text_polygons(el: &Element, m: &Matrix, fonts: &dyn FontFactory) -> Vec<Polygon> {
    let x = el.attr_f64("x", 0.0);
    let font_family = el.attr("font-family").unwrap_or("sans-serif");
    let font_size = el.attr_f64("font-size", 16.0);
    let mut cursor = x;
    let y = el.attr_f64("y", 0.0);
    let mut out = Vec::new();
    for ch in el.text.chars() {
        let Some(glyph) = fonts.glyph(ch, font_family, font_size) else { continue };
        let glyph_transform = m.then(&Matrix::from_primitive(nestgeo_geom::PrimitiveTransform::Translate { x: cursor, y }));
        for p in &glyph.polygons {
            out.push(apply_matrix(p, &glyph_transform));
        }
        cursor += glyph.advance;
    }
    out
}

/// Recursively gathers every polygon a subtree produces, applying the
/// accumulated transform to each. Unrecognized elements are skipped
/// with an `unsupported-element` diagnostic; geometrically degenerate
/// shapes (zero-origin rects, zero-radius circles, open polylines) are
/// skipped silently since they're expected noise from SVG exporters.
pub fn collect_polygons(
    el: &Element,
    parent_transform: &Matrix,
    cfg: &NestgeoConfig,
    fonts: &dyn FontFactory,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Polygon> {
    if !RECOGNIZED.contains(&el.tag.as_str()) {
        diagnostics.push(Diagnostic::with_element(
            DiagnosticKind::UnsupportedElement,
            el.tag.clone(),
            "SVG element outside the recognized set was skipped",
        ));
        return Vec::new();
    }

    let m = element_transform(el, parent_transform);
    let mut out = Vec::new();

    match el.tag.as_str() {
        "rect" => out.extend(rect_polygon(el).map(|p| apply_matrix(&p, &m))),
        "circle" => out.extend(circle_polygon(el, cfg).map(|p| apply_matrix(&p, &m))),
        "ellipse" => out.extend(ellipse_polygon(el, cfg).map(|p| apply_matrix(&p, &m))),
        "polygon" => out.extend(polygon_from_points(el).map(|p| apply_matrix(&p, &m))),
        "polyline" => out.extend(polyline_from_points(el, cfg.endpoint_tolerance).map(|p| apply_matrix(&p, &m))),
        "line" => {}
        "path" => match el.attr("d") {
            Some(d) => match path::path_to_polygons(d, cfg.tolerance) {
                Ok(polys) => out.extend(polys.iter().map(|p| apply_matrix(p, &m))),
                Err(diag) => diagnostics.push(diag),
            },
            None => {}
        },
        "text" => out.extend(text_polygons(el, &m, fonts)),
        "g" | "svg" | "image" => {
            if el.tag == "image" {
                out.extend(rect_polygon(el).map(|p| apply_matrix(&p, &m)));
            }
            for child in &el.children {
                out.extend(collect_polygons(child, &m, cfg, fonts, diagnostics));
            }
        }
        _ => unreachable!("filtered by RECOGNIZED above"),
    }

    out
}

/// Splits a flat polygon set into outers and holes: any polygon
/// contained (spec §4.8's `findHoles` pass) within a strictly larger
/// polygon of the same set is a hole of it; everything else is an
/// outer boundary. Multi-level nesting (an island inside a hole)
/// collapses to this same two-way split, matching [`Shape`]'s flat
/// outer/inner model.
pub fn find_holes(polygons: Vec<Polygon>, tol: f64) -> (Vec<Polygon>, Vec<Polygon>) {
    let mut outer = Vec::new();
    let mut holes = Vec::new();
    for (i, p) in polygons.iter().enumerate() {
        let is_hole = polygons
            .iter()
            .enumerate()
            .any(|(j, q)| i != j && q.area() > p.area() && contained(q, p, 0.0, 0.0, tol));
        if is_hole {
            holes.push(p.clone());
        } else {
            outer.push(p.clone());
        }
    }
    (outer, holes)
}

/// Converts a parsed SVG document into a [`ModelsToPlace`]. Each
/// direct child of the root `svg` element becomes one candidate part
/// or sheet (selected by the presence of a `sheet` attribute);
/// everything nested inside it is either additional outer geometry or
/// a hole, per [`find_holes`].
pub fn convert(root: &Element, cfg: &NestgeoConfig, fonts: &dyn FontFactory, filename: Option<String>) -> Result<(ModelsToPlace, Vec<Diagnostic>), Diagnostic> {
    if root.tag != "svg" {
        return Err(Diagnostic::new(DiagnosticKind::InvalidInput, "root element is not an <svg>"));
    }

    let mut diagnostics = Vec::new();
    let mut models = ModelsToPlace::new(filename.clone());
    let root_transform = Matrix::identity();

    for child in &root.children {
        let polygons = collect_polygons(child, &root_transform, cfg, fonts, &mut diagnostics);
        if polygons.is_empty() {
            continue;
        }
        let (outer, holes) = find_holes(polygons, cfg.tolerance_svg);
        if outer.is_empty() {
            diagnostics.push(Diagnostic::with_element(
                DiagnosticKind::DegenerateGeometry,
                child.tag.clone(),
                "element produced only hole candidates and no outer boundary",
            ));
            continue;
        }

        let provenance = Provenance {
            element_id: child.attr("id").map(str::to_string),
            filename: filename.clone(),
            visible: child.attr("display") != Some("none"),
        };
        let Some(shape) = Shape::new(outer, holes, provenance) else { continue };

        let desired = child.attr_u32("desiredQuantity", 1);
        let available = child.attr_u32("availableQuantity", 1);
        if child.attr("sheet").is_some() {
            models.add_sheet(shape, available);
        } else {
            models.add_part(shape, desired);
        }
    }

    Ok((models, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use crate::font::NullFontFactory;

    #[test]
    fn svg_rect_scenario_area_and_bounds() {
        // spec.md §8 scenario 5.
        let root = dom::parse(r#"<svg><rect x="1" y="2" width="3" height="4"/></svg>"#).unwrap();
        let (models, diags) = convert(&root, &NestgeoConfig::default(), &NullFontFactory, None).unwrap();
        assert!(diags.is_empty());
        assert_eq!(models.parts().len(), 1);
        let (shape, qty) = &models.parts()[0];
        assert_eq!(*qty, 1);
        assert_eq!(shape.outer()[0].area(), 12.0);
        let b = shape.outer()[0].bounds();
        assert_eq!(b, nestgeo_polygon::Bounds { x: 1.0, y: 2.0, width: 3.0, height: 4.0 });
    }

    #[test]
    fn zero_origin_rect_is_dropped() {
        let root = dom::parse(r#"<svg><rect x="0" y="0" width="3" height="4"/></svg>"#).unwrap();
        let (models, _) = convert(&root, &NestgeoConfig::default(), &NullFontFactory, None).unwrap();
        assert!(models.parts().is_empty());
    }

    #[test]
    fn hole_detection_scenario() {
        // spec.md §8 scenario 6.
        let root = dom::parse(
            r#"<svg><g id="part"><rect x="0" y="0" width="10" height="10"/><rect x="2" y="2" width="2" height="2"/></g></svg>"#,
        )
        .unwrap();
        let (models, _) = convert(&root, &NestgeoConfig::default(), &NullFontFactory, None).unwrap();
        assert_eq!(models.parts().len(), 1);
        let (shape, _) = &models.parts()[0];
        assert_eq!(shape.outer().len(), 1);
        assert_eq!(shape.inner().len(), 1);
        assert_eq!(shape.outer()[0].area(), 100.0);
        assert_eq!(shape.inner()[0].area(), 4.0);
    }

    #[test]
    fn sheet_attribute_routes_to_sheet_map() {
        let root = dom::parse(r#"<svg><rect x="1" y="1" width="100" height="100" sheet="true" availableQuantity="5"/></svg>"#).unwrap();
        let (models, _) = convert(&root, &NestgeoConfig::default(), &NullFontFactory, None).unwrap();
        assert_eq!(models.sheets().len(), 1);
        assert_eq!(models.sheets()[0].1, 5);
        assert!(models.parts().is_empty());
    }

    #[test]
    fn desired_quantity_attribute_is_honored() {
        let root = dom::parse(r#"<svg><rect x="1" y="1" width="5" height="5" desiredQuantity="7"/></svg>"#).unwrap();
        let (models, _) = convert(&root, &NestgeoConfig::default(), &NullFontFactory, None).unwrap();
        assert_eq!(models.parts()[0].1, 7);
    }

    #[test]
    fn unsupported_element_yields_a_diagnostic_not_an_error() {
        let root = dom::parse(r#"<svg><defs><linearGradient/></defs></svg>"#).unwrap();
        let (_, diags) = convert(&root, &NestgeoConfig::default(), &NullFontFactory, None).unwrap();
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::UnsupportedElement));
    }

    #[test]
    fn circle_linearizes_into_a_closed_polygon_with_expected_area() {
        let root = dom::parse(r#"<svg><circle cx="0" cy="0" r="10"/></svg>"#).unwrap();
        let (models, _) = convert(&root, &NestgeoConfig { tolerance: 0.01, ..NestgeoConfig::default() }, &NullFontFactory, None).unwrap();
        let area = models.parts()[0].0.outer()[0].area();
        assert!((area - std::f64::consts::PI * 100.0).abs() < 1.0);
    }

    #[test]
    fn nested_transform_composes_with_parent() {
        let root = dom::parse(
            r#"<svg><g transform="translate(10,0)"><rect x="1" y="1" width="2" height="2" transform="translate(0,5)"/></g></svg>"#,
        )
        .unwrap();
        let (models, _) = convert(&root, &NestgeoConfig::default(), &NullFontFactory, None).unwrap();
        let b = models.parts()[0].0.outer()[0].bounds();
        assert_eq!(b.x, 11.0);
        assert_eq!(b.y, 6.0);
    }
}
