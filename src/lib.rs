// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # segview
//!
//! Renders page-segmentation annotations (regions, text lines, words,
//! glyphs, baselines, reading order) over a page image and builds a spatial
//! index of the drawn regions for hover and click hit-testing.
//!
//! ## Core Features
//!
//! - **Geometry validation**: every outline is checked before drawing.
//!   A self-intersecting ring is replaced by its first valid
//!   Douglas-Peucker simplification, with the tolerance doubling from one
//!   pixel up to the bounding-box diagonal; the repair is kept whatever
//!   the area change and reported as a warning with the error percentage
//!   `100 * tolerance / area`. Outlines that cannot be repaired are logged
//!   and skipped
//! - **Layered compositing**: draw operations are grouped by nesting depth
//!   and composited bottom to top, so inner segments stay visible
//! - **Region map**: a containment tree answering "which region is under
//!   this pixel", innermost first, with optional type filtering
//! - **Feature flags**: choose which segment levels and overlays to draw
//! - **Viewport**: zoom levels and view-to-image coordinate mapping
//!
//! ## Quick Start
//!
//! ```
//! use segview::document::{PageDocument, RegionKind, SegmentBuilder, SegmentKind};
//! use segview::geometry::{Affine, Point};
//! use segview::{rendering::canvas, Features, PageRenderer, RenderOptions};
//!
//! let mut doc = PageDocument::new("scan.png", 120.0, 80.0);
//! let ring = [(10.0, 10.0), (110.0, 10.0), (110.0, 70.0), (10.0, 70.0)];
//! let region = doc.add(
//!     doc.page(),
//!     SegmentBuilder::new(SegmentKind::Region(RegionKind::Text), ring.map(Point::from))
//!         .with_id("r1"),
//! )?;
//! let line = [(20.0, 20.0), (100.0, 20.0), (100.0, 40.0), (20.0, 40.0)];
//! doc.add(
//!     region,
//!     SegmentBuilder::new(SegmentKind::TextLine, line.map(Point::from)).with_id("l1"),
//! )?;
//!
//! let options = RenderOptions::default().with_features(Features::REGIONS | Features::LINES);
//! let page = canvas::blank(120, 80, segview::color::Rgba::WHITE);
//! let mut renderer = PageRenderer::new(&page, Affine::identity(), options);
//! renderer.render_all(&doc);
//! let (_image, regions) = renderer.get_result()?;
//!
//! let hit = regions.find_region(30.0, 30.0).map(|r| r.id().to_string());
//! assert_eq!(hit.as_deref(), Some("l1"));
//! # Ok::<(), segview::Error>(())
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Annotation model
pub mod document;
pub mod geometry;

// Render configuration
pub mod color;
pub mod config;
pub mod features;

// Spatial index
pub mod region;

// Drawing
pub mod rendering;

// View mapping
pub mod viewport;

// Re-exports
pub use config::RenderOptions;
pub use document::{PageDocument, RegionKind, SegmentBuilder, SegmentKey, SegmentKind};
pub use error::{Error, GeometryError, Result};
pub use features::Features;
pub use geometry::{Affine, GeometryValidator, Point, Polygon};
pub use region::{Region, RegionMap};
pub use rendering::PageRenderer;
pub use viewport::{Viewport, ZoomLevel, ZoomTarget};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
