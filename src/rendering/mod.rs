//! Page segmentation rendering.
//!
//! This module turns a [`PageDocument`](crate::document::PageDocument) into
//! a composited visualization and a [`RegionMap`](crate::region::RegionMap)
//! using the pure-Rust `tiny-skia` library.
//!
//! ## Example
//!
//! ```
//! use segview::document::{PageDocument, RegionKind, SegmentBuilder, SegmentKind};
//! use segview::geometry::{Affine, Point};
//! use segview::rendering::{canvas, PageRenderer};
//! use segview::{color::Rgba, RenderOptions};
//!
//! let mut doc = PageDocument::new("scan.png", 200.0, 100.0);
//! let outline = [(10.0, 10.0), (190.0, 10.0), (190.0, 90.0), (10.0, 90.0)];
//! let kind = SegmentKind::Region(RegionKind::Text);
//! doc.add(doc.page(), SegmentBuilder::new(kind, outline.map(Point::from)).with_id("r1"))?;
//!
//! let image = canvas::blank(200, 100, Rgba::WHITE);
//! let mut renderer = PageRenderer::new(&image, Affine::identity(), RenderOptions::default());
//! renderer.render_all(&doc);
//! let (rendered, regions) = renderer.get_result()?;
//! assert_eq!(rendered.dimensions(), (200, 100));
//! assert_eq!(regions.find_region(100.0, 50.0).map(|r| r.id()), Some("r1"));
//! # Ok::<(), segview::Error>(())
//! ```
//!
//! ## Architecture
//!
//! 1. [`PageRenderer::render_all`] walks the annotation tree, validates each
//!    segment's geometry and queues depth-tagged [`Operation`]s
//! 2. [`Operations::paint`] draws each depth into its own layer and
//!    composites the layers bottom to top, indexing regions as it goes
//! 3. [`PageRenderer::get_result`] returns the image and the region map

pub mod canvas;
#[cfg(feature = "labels")]
mod label;
mod operation;
mod renderer;

#[cfg(feature = "labels")]
pub use label::{fit_font_size, EvictionPolicy, FontCache, ScaledFace};
pub use operation::{
    arrow_strokes, overlay_depth, Operation, Operations, DEPTH_STEP, ORDER_DEPTH, OVERLAY_OFFSET,
};
pub use renderer::{region_priority, PageRenderer};

use crate::color::Rgba;
use crate::geometry::Point;
use tiny_skia::{LineCap, LineJoin, Paint, Path, PathBuilder, Stroke};

/// Anti-aliased solid paint.
pub(crate) fn fill_paint(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

/// Round-joined stroke of the given width.
pub(crate) fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

/// Closed path through `points`.
pub(crate) fn polygon_path(points: &[Point]) -> Option<Path> {
    let mut pb = polyline_builder(points)?;
    pb.close();
    pb.finish()
}

/// Open path through `points`.
pub(crate) fn polyline_path(points: &[Point]) -> Option<Path> {
    polyline_builder(points)?.finish()
}

fn polyline_builder(points: &[Point]) -> Option<PathBuilder> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::with_capacity(points.len() + 1, points.len() + 1);
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    Some(pb)
}
