//! SVG-geometry conversion: turns a parsed SVG document into the
//! [`nestgeo_shapes::ModelsToPlace`] a nesting search consumes.

pub mod config;
pub mod convert;
pub mod dom;
pub mod font;
pub mod path;

pub use config::NestgeoConfig;
pub use convert::{collect_polygons, convert, find_holes};
pub use font::{FontFactory, GlyphOutline, NullFontFactory};

use nestgeo_geom::Diagnostic;
use nestgeo_shapes::ModelsToPlace;

/// Parses `source` as SVG and converts it into a `ModelsToPlace`,
/// using `fonts` to resolve any `text` elements. `filename` is carried
/// through as provenance only; it isn't read from disk here.
pub fn load(
    source: &str,
    cfg: &NestgeoConfig,
    fonts: &dyn FontFactory,
    filename: Option<String>,
) -> Result<(ModelsToPlace, Vec<Diagnostic>), Diagnostic> {
    let root = dom::parse(source)?;
    convert::convert(&root, cfg, fonts, filename)
}
