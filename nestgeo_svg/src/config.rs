//! Converter configuration (spec §6), all numeric and all positive.

/// Tunables for the SVG-to-`ModelsToPlace` conversion.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NestgeoConfig {
    /// Chord tolerance for curve linearization, in SVG user units.
    pub tolerance: f64,
    /// Tolerance for endpoint-coincidence tests during path merging.
    pub tolerance_svg: f64,
    /// Unit scale factor from input SVG to internal units.
    pub scale: f64,
    /// Tolerance for merging open paths into closed ones.
    pub endpoint_tolerance: f64,
    /// Minimum segment count for full-circle approximation.
    pub circle_segments: u32,
    /// Integer scale for the Boolean facade.
    pub clipper_scale: f64,
}

impl Default for NestgeoConfig {
    fn default() -> Self {
        NestgeoConfig {
            tolerance: 2.0,
            tolerance_svg: 0.01,
            scale: 72.0,
            endpoint_tolerance: 2.0,
            circle_segments: 32,
            clipper_scale: 1.0e7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = NestgeoConfig::default();
        assert_eq!(c.tolerance, 2.0);
        assert_eq!(c.tolerance_svg, 0.01);
        assert_eq!(c.scale, 72.0);
        assert_eq!(c.endpoint_tolerance, 2.0);
        assert_eq!(c.circle_segments, 32);
        assert_eq!(c.clipper_scale, 1.0e7);
    }
}
