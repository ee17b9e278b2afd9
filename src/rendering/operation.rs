//! Depth-tagged drawing instructions and the layer compositor.

use super::{canvas, fill_paint, polygon_path, polyline_path, stroke};
use crate::color::Rgba;
use crate::error::Result;
use crate::geometry::{LineString, Point};
use crate::region::{Region, RegionMap};
use image::RgbaImage;
use std::collections::BTreeMap;
use tiny_skia::{FillRule, Path, PathBuilder, Pixmap, PixmapPaint, Transform};

/// Depth band multiplier for hierarchical drawables.
pub const DEPTH_STEP: u32 = 10;
/// Overlays (baselines, labels) sit this far above their owner's band.
pub const OVERLAY_OFFSET: u32 = 5;
/// Reading-order arrows are drawn on top of everything.
pub const ORDER_DEPTH: u32 = u32::MAX;

/// Radius of the dot drawn at an arrow's head.
const ARROW_DOT_RADIUS: f32 = 5.0;
/// Angle between the shaft and each arrowhead wing.
const ARROW_WING_ANGLE: f64 = 30.0;

/// One drawing instruction.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Filled and outlined region polygon; also indexes the region
    Polygon {
        /// The region to draw and index
        region: Region,
        /// Fill color
        fill: Rgba,
        /// Outline color
        outline: Rgba,
        /// Outline width
        width: f32,
    },
    /// Polyline, used for baselines
    Connector {
        /// The polyline
        line: LineString,
        /// Stroke color
        color: Rgba,
        /// Stroke width
        width: f32,
        /// Layer, see [`overlay_depth`]
        depth: u32,
    },
    /// Reading-order arrow from one anchor to the next
    Arrow {
        /// Tail
        from: Point,
        /// Head
        to: Point,
        /// Stroke and dot color
        color: Rgba,
        /// Stroke width
        width: f32,
        /// Wing length
        head_size: f32,
    },
    /// Pre-shaped text outline
    Label {
        /// Glyph outlines in canvas coordinates
        path: Path,
        /// Fill color
        color: Rgba,
        /// Layer, see [`overlay_depth`]
        depth: u32,
    },
}

/// Layer of an overlay drawn for a segment at nesting level `owner_depth`.
///
/// A baseline of a top-level text line (depth 3) lands at 35, between the
/// line band and the word band.
pub fn overlay_depth(owner_depth: u32) -> u32 {
    owner_depth * DEPTH_STEP + OVERLAY_OFFSET
}

impl Operation {
    /// Layer this operation is drawn in.
    pub fn depth(&self) -> u32 {
        match self {
            Operation::Polygon { region, .. } => region.depth() * DEPTH_STEP,
            Operation::Connector { depth, .. } | Operation::Label { depth, .. } => *depth,
            Operation::Arrow { .. } => ORDER_DEPTH,
        }
    }

    /// Draw into `layer`; polygon operations also move their region into
    /// `regions`.
    fn paint(self, layer: &mut Pixmap, regions: &mut RegionMap) {
        match self {
            Operation::Polygon {
                region,
                fill,
                outline,
                width,
            } => {
                if let Some(path) = polygon_path(region.polygon().exterior()) {
                    let identity = Transform::identity();
                    layer.fill_path(&path, &fill_paint(fill), FillRule::Winding, identity, None);
                    layer.stroke_path(&path, &fill_paint(outline), &stroke(width), identity, None);
                }
                let descriptor = region.to_string();
                if let Err(err) = regions.insert(region) {
                    log::warn!("{}: {}", descriptor, err);
                }
            },
            Operation::Connector { line, color, width, .. } => {
                if let Some(path) = polyline_path(line.points()) {
                    let paint = fill_paint(color);
                    layer.stroke_path(&path, &paint, &stroke(width), Transform::identity(), None);
                }
            },
            Operation::Arrow {
                from,
                to,
                color,
                width,
                head_size,
            } => {
                let paint = fill_paint(color);
                let mut pb = PathBuilder::new();
                for (a, b) in arrow_strokes(from, to, head_size as f64) {
                    pb.move_to(a.x as f32, a.y as f32);
                    pb.line_to(b.x as f32, b.y as f32);
                }
                if let Some(path) = pb.finish() {
                    layer.stroke_path(&path, &paint, &stroke(width), Transform::identity(), None);
                }
                let dot = PathBuilder::from_circle(to.x as f32, to.y as f32, ARROW_DOT_RADIUS);
                if let Some(dot) = dot {
                    layer.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
                }
            },
            Operation::Label { path, color, .. } => {
                let paint = fill_paint(color);
                layer.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            },
        }
    }
}

/// Shaft and wing segments of an arrow, each ending at `to`.
///
/// Wings are `head_size` long and point back at ±30° from the shaft.
/// A zero-length arrow has no wings.
pub fn arrow_strokes(from: Point, to: Point, head_size: f64) -> Vec<(Point, Point)> {
    let mut strokes = vec![(from, to)];
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let length = dx.hypot(dy);
    if length <= f64::EPSILON {
        return strokes;
    }
    let (s, c) = (180.0 - ARROW_WING_ANGLE).to_radians().sin_cos();
    let lf = head_size / length;
    let left = (dx * c - dy * s, dx * s + dy * c);
    let right = (dx * c + dy * s, -dx * s + dy * c);
    for (wx, wy) in [left, right] {
        strokes.push((Point::new(to.x + lf * wx, to.y + lf * wy), to));
    }
    strokes
}

/// Operations bucketed by depth.
#[derive(Debug, Default)]
pub struct Operations {
    layers: BTreeMap<u32, Vec<Operation>>,
}

impl Operations {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `op` in its depth bucket.
    pub fn append(&mut self, op: Operation) {
        self.layers.entry(op.depth()).or_default().push(op);
    }

    /// Total number of queued operations.
    pub fn len(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Depth buckets in ascending order.
    pub fn layers(&self) -> impl Iterator<Item = (u32, &[Operation])> + '_ {
        self.layers.iter().map(|(depth, ops)| (*depth, ops.as_slice()))
    }

    /// Drop all queued operations.
    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Composite all queued operations over a copy of `canvas`.
    ///
    /// Each depth is drawn into its own transparent layer, then the layers
    /// are alpha-composited in ascending depth order. Regions are indexed
    /// in the same order, so parents always precede their children. The
    /// queue is empty afterwards, also on error.
    pub fn paint(&mut self, canvas: &RgbaImage) -> Result<(RgbaImage, RegionMap)> {
        let layers = std::mem::take(&mut self.layers);
        let mut pixmap = canvas::to_pixmap(canvas)?;
        let mut regions = RegionMap::new();
        let layer_count = layers.len();

        for (depth, ops) in layers {
            let mut layer = canvas::new_pixmap(pixmap.width(), pixmap.height())?;
            log::trace!("painting {} operations at depth {}", ops.len(), depth);
            for op in ops {
                op.paint(&mut layer, &mut regions);
            }
            let paint = PixmapPaint::default();
            pixmap.draw_pixmap(0, 0, layer.as_ref(), &paint, Transform::identity(), None);
        }

        log::debug!(
            "composited {} layers, indexed {} regions",
            layer_count,
            regions.len()
        );
        Ok((canvas::to_image(&pixmap)?, regions))
    }
}
