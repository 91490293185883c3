//! Numeric primitives and curve linearization for the nestgeo geometry
//! core: [`Point`]/[`Vector`]/[`Matrix`] with a single explicit
//! floating-point tolerance, and adaptive flattening of quadratic/cubic
//! Bezier curves and SVG elliptical arcs.

pub mod curve;
pub mod diagnostic;
pub mod matrix;
pub mod point;
pub mod tolerance;

pub use curve::{linearize, Curve, LinearizeError};
pub use diagnostic::{Diagnostic, DiagnosticKind, NestgeoError};
pub use matrix::{parse_transform_string, Matrix, PrimitiveTransform};
pub use point::{Point, Vector};
pub use tolerance::{almost_eq, almost_eq_default, almost_zero, TOL};
