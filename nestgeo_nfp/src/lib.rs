//! No-Fit Polygon computation: the engine that, given a fixed polygon
//! `A` and a moving polygon `B`, traces the locus `B`'s reference
//! vertex sweeps out while `B` slides around `A` without overlapping
//! it (or, for the interior case, while staying contained inside it).

pub mod orbit;
pub mod slide;
pub mod touch;

pub use orbit::{nfp, NfpMode, NfpOptions, NfpResult};
pub use slide::{polygon_projection_distance, polygon_slide_distance, translated_vertices};
pub use touch::{candidate_vectors, find_touches, reject_immediate_retrace, TouchKind, Touching};
