//! Polygon primitives, segment/projection algebra, polygon-vs-polygon
//! intersection testing, and the Boolean/Minkowski facade.

pub mod boolean;
pub mod intersect;
pub mod polygon;
pub mod segment;

pub use boolean::{IntPoint, PolygonOps, SoftwareBoolean};
pub use intersect::{contained, intersect};
pub use polygon::{Bounds, Containment, Polygon};
pub use segment::{line_intersect, on_segment, point_distance, segment_distance, segment_distance_raw};
