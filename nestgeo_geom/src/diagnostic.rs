//! The diagnostic taxonomy shared by every `nestgeo_*` crate.
//!
//! Recoverable conditions are reported through this type rather than
//! aborting a larger pipeline; each crate also emits the same event
//! through `log` at the point it is produced, so a caller gets
//! visibility whether or not it inspects the returned diagnostics.

use std::fmt;

/// What went wrong, independent of how the caller should react.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Fewer than 3 vertices, NaN coordinates, or otherwise malformed
    /// input that cannot be processed at all.
    InvalidInput,
    /// Zero-area polygon, radius at or below tolerance, coincident
    /// endpoints: the offending element is dropped, processing
    /// continues.
    DegenerateGeometry,
    /// Adaptive curve subdivision exceeded its iteration bound.
    LinearizationCap,
    /// No non-reversing translation produced a positive NFP slide.
    NfpStuck,
    /// The NFP loop's next vertex coincided with an earlier vertex.
    NfpPrematureLoop,
    /// The NFP main loop hit its iteration bound.
    NfpIterationCap,
    /// An SVG element outside the recognized set.
    UnsupportedElement,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::InvalidInput => "invalid-input",
            DiagnosticKind::DegenerateGeometry => "degenerate-geometry",
            DiagnosticKind::LinearizationCap => "linearization-cap",
            DiagnosticKind::NfpStuck => "nfp-stuck",
            DiagnosticKind::NfpPrematureLoop => "nfp-premature-loop",
            DiagnosticKind::NfpIterationCap => "nfp-iteration-cap",
            DiagnosticKind::UnsupportedElement => "unsupported-element",
        };
        f.write_str(s)
    }
}

/// A recoverable condition surfaced alongside a (possibly partial)
/// result. `element` is an opaque caller-defined reference (an SVG
/// element id, a part index) used only for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub element: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        let diag = Diagnostic { kind, element: None, message: message.into() };
        diag.log();
        diag
    }

    pub fn with_element(kind: DiagnosticKind, element: impl Into<String>, message: impl Into<String>) -> Self {
        let diag = Diagnostic { kind, element: Some(element.into()), message: message.into() };
        diag.log();
        diag
    }

    fn log(&self) {
        match self.kind {
            DiagnosticKind::NfpStuck
            | DiagnosticKind::NfpPrematureLoop
            | DiagnosticKind::NfpIterationCap
            | DiagnosticKind::LinearizationCap
            | DiagnosticKind::DegenerateGeometry
            | DiagnosticKind::UnsupportedElement => {
                log::warn!("{}: {}", self.kind, self.message);
            }
            DiagnosticKind::InvalidInput => {
                log::error!("{}: {}", self.kind, self.message);
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            Some(el) => write!(f, "{} ({el}): {}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// The error type for entry points that cannot return even a partial
/// result. Recoverable variants are modeled as `Diagnostic` values
/// instead and returned alongside the (partial) success value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NestgeoError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unsupported element: {0}")]
    UnsupportedElement(String),
}
