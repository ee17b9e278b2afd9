//! Error types for the segmentation renderer.
//!
//! Geometry problems on individual segments never surface here: they are
//! logged and the segment is skipped (see [`crate::geometry::GeometryValidator`]).
//! This enum covers the fallible public API around the render pass.

use crate::document::SegmentKey;

/// Result type alias for renderer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while configuring or running a render pass.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Color literal is not `RRGGBB` or `RRGGBBAA` hex
    #[error("Invalid color '{0}': expected RRGGBB or RRGGBBAA hex")]
    InvalidColor(String),

    /// Unknown feature name in a feature list
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// Configuration document could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Canvas could not be allocated (zero or oversized dimensions)
    #[error("Failed to create canvas {width}x{height}")]
    Canvas {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// Image buffer conversion error
    #[error("Image error: {0}")]
    Image(String),

    /// Conflicting or out-of-range viewport request
    #[error("Viewport error: {0}")]
    Viewport(String),

    /// Font lookup or parsing error
    #[error("Font error: {0}")]
    Font(String),

    /// Segment key does not belong to the document
    #[error("Unknown segment {0:?}")]
    UnknownSegment(SegmentKey),

    /// A region was inserted after one of its descendants
    #[error("Region {region:?} inserted after its descendant; parents must be inserted first")]
    RegionOrder {
        /// Key of the late region
        region: SegmentKey,
    },
}

/// Reasons a coordinate list cannot become a usable polygon.
///
/// The `Display` text is what ends up in the log line for the segment.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// Fewer than three distinct vertices
    #[error("Too few points")]
    TooFewPoints,

    /// NaN or infinite coordinate
    #[error("Non-finite coordinate")]
    NonFinite,

    /// Ring is not a simple polygon and could not be repaired
    #[error("{0}")]
    Invalid(String),

    /// Polygon has no area
    #[error("is empty")]
    Empty,
}
