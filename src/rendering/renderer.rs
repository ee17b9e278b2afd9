//! Page renderer - walks the annotation tree and queues operations.

use super::canvas;
use super::operation::{overlay_depth, Operation, Operations};
use crate::color::{ColorTable, Rgba};
use crate::config::RenderOptions;
use crate::document::{PageDocument, RegionKind, Segment, SegmentKey, SegmentKind};
use crate::error::Result;
use crate::features::Features;
use crate::geometry::{Affine, GeometryValidator, Point, Polygon};
use crate::region::{Region, RegionMap};
use image::RgbaImage;
use std::collections::HashMap;

#[cfg(feature = "labels")]
use super::label::{fit_font_size, EvictionPolicy, FontCache};

/// Draw order of region kinds; lower is drawn first.
///
/// Overlapping regions are common in layout-analysis output, so the most
/// telling type ends up on top: separators over text regions over
/// everything else.
pub fn region_priority(kind: SegmentKind) -> i8 {
    match kind {
        SegmentKind::Region(RegionKind::Separator) => 0,
        SegmentKind::Region(RegionKind::Text) => -1,
        _ => -2,
    }
}

/// Renders one page's segmentation over its image.
///
/// Construct per page, call [`render_all`](Self::render_all), then
/// [`get_result`](Self::get_result). The queue is empty again afterwards,
/// so the renderer may be reused for another document of the same size.
#[derive(Debug)]
pub struct PageRenderer {
    canvas: RgbaImage,
    validator: GeometryValidator,
    options: RenderOptions,
    colors: ColorTable,
    operations: Operations,
    /// Outcome of validating each visited segment; `None` marks a rejection
    polygons: HashMap<SegmentKey, Option<Polygon>>,
    #[cfg(feature = "labels")]
    fonts: Option<FontCache>,
}

impl PageRenderer {
    /// Create a renderer for `canvas`.
    ///
    /// `transform` maps segment coordinates to canvas pixels. Without the
    /// IMAGE feature the page is drawn on white instead of `canvas`.
    pub fn new(canvas: &RgbaImage, transform: Affine, options: RenderOptions) -> Self {
        let canvas = if options.features.contains(Features::IMAGE) {
            canvas.clone()
        } else {
            canvas::blank(canvas.width(), canvas.height(), Rgba::WHITE)
        };
        Self {
            canvas,
            validator: GeometryValidator::new(transform, options.page_id.clone()),
            colors: options.color_table(),
            options,
            operations: Operations::new(),
            polygons: HashMap::new(),
            #[cfg(feature = "labels")]
            fonts: None,
        }
    }

    /// Use `fonts` for word labels instead of loading the system fonts.
    #[cfg(feature = "labels")]
    pub fn with_font_cache(mut self, fonts: FontCache) -> Self {
        self.fonts = Some(fonts);
        self
    }

    /// Options in effect.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Queued operations.
    pub fn operations(&self) -> &Operations {
        &self.operations
    }

    /// Queue operations for everything `doc` contains.
    ///
    /// Order: print space, border, regions by [`region_priority`] with the
    /// lines, words and glyphs of each text region, then reading-order
    /// arrows. Segments with unusable geometry are logged and skipped.
    pub fn render_all(&mut self, doc: &PageDocument) {
        self.polygons.clear();

        if let Some(print_space) = doc.print_space() {
            self.render_segment(doc, print_space);
        }
        if let Some(border) = doc.border() {
            self.render_segment(doc, border);
        }

        let mut regions = doc.all_regions();
        regions.sort_by_key(|s| region_priority(s.kind()));
        for region in regions {
            self.render_segment(doc, region);
            if region.kind() == SegmentKind::Region(RegionKind::Text) {
                self.render_text_region(doc, region.key());
            }
        }

        if self.options.features.contains(Features::ORDER) {
            self.render_reading_order(doc);
        }

        log::debug!(
            "Page \"{}\": queued {} operations",
            self.validator.page_id(),
            self.operations.len()
        );
    }

    /// Composite the queued operations over the canvas.
    ///
    /// Returns the finished image and the region index; the queue is
    /// cleared.
    pub fn get_result(&mut self) -> Result<(RgbaImage, RegionMap)> {
        self.operations.paint(&self.canvas)
    }

    fn render_text_region(&mut self, doc: &PageDocument, region: SegmentKey) {
        for line in doc.children_of_kind(region, SegmentKind::TextLine) {
            self.render_segment(doc, line);
            for word in doc.children_of_kind(line.key(), SegmentKind::Word) {
                self.render_segment(doc, word);
                for glyph in doc.children_of_kind(word.key(), SegmentKind::Glyph) {
                    self.render_segment(doc, glyph);
                }
            }
        }
    }

    fn render_segment(&mut self, doc: &PageDocument, segment: &Segment) {
        let features = self.options.features;

        if segment.kind() == SegmentKind::TextLine && features.contains(Features::BASELINES) {
            if let Some(line) = self.validator.build_baseline(segment) {
                self.operations.append(Operation::Connector {
                    line,
                    color: self.colors.get("Baseline"),
                    width: self.options.baseline_width,
                    depth: overlay_depth(doc.ancestry(segment.key()).len() as u32),
                });
            }
        }

        if !features.should_render(segment.kind()) {
            return;
        }
        let Some(validated) = self.validator.build(segment) else {
            self.polygons.insert(segment.key(), None);
            return;
        };
        self.polygons.insert(segment.key(), Some(validated.polygon.clone()));
        let region = Region::new(doc, segment, validated);

        let flagged = features.contains(Features::WARNINGS) && !region.warnings().is_empty();
        let (fill, outline) = if flagged {
            (self.options.warning_fill, self.options.warning_outline)
        } else {
            let color = self.colors.get(region.region_type());
            (
                color.with_alpha(self.options.fill_alpha),
                color.with_alpha(self.options.outline_alpha),
            )
        };

        if segment.kind() == SegmentKind::Word && self.options.label_words {
            if let Some(label) = self.label(&region) {
                self.operations.append(label);
            }
        }

        log::trace!("queue {} at depth {}", region, region.depth());
        self.operations.append(Operation::Polygon {
            region,
            fill,
            outline,
            width: self.options.outline_width,
        });
    }

    fn render_reading_order(&mut self, doc: &PageDocument) {
        let mut last: Option<Point> = None;
        for segment in doc.reading_order() {
            let polygon = match self.polygons.get(&segment.key()) {
                Some(Some(polygon)) => polygon.clone(),
                // rejected, and logged, while drawing regions
                Some(None) => continue,
                None => {
                    let built = self.validator.build(segment).map(|v| v.polygon);
                    self.polygons.insert(segment.key(), built.clone());
                    match built {
                        Some(polygon) => polygon,
                        None => continue,
                    }
                },
            };
            let anchor = reading_order_anchor(&polygon);
            if let Some(from) = last {
                self.operations.append(Operation::Arrow {
                    from,
                    to: anchor,
                    color: self.options.arrow_color,
                    width: self.options.arrow_width,
                    head_size: self.options.arrow_head_size,
                });
            }
            last = Some(anchor);
        }
    }

    #[cfg(feature = "labels")]
    fn label(&mut self, region: &Region) -> Option<Operation> {
        let text = region.text()?;
        let fonts = self
            .fonts
            .get_or_insert_with(|| FontCache::with_system_fonts(EvictionPolicy::default()));
        let Some(font) = fonts.resolve(&self.options.label_font_family) else {
            log::warn!(
                "Page \"{}\" @ {} no font for family '{}', label skipped",
                self.validator.page_id(),
                region,
                self.options.label_font_family
            );
            return None;
        };

        let bounds = region.polygon().bounds();
        let size = fit_font_size(
            |size| fonts.face(font, size).ok()?.measure(text),
            bounds.width as f32,
            bounds.height as f32,
        )?;
        let face = match fonts.face(font, size) {
            Ok(face) => face,
            Err(err) => {
                log::warn!("Page \"{}\" @ {} {}", self.validator.page_id(), region, err);
                return None;
            },
        };
        let path = face.outline(text, bounds.x as f32, bounds.y as f32)?;
        Some(Operation::Label {
            path,
            color: self.options.label_color,
            depth: overlay_depth(region.depth()),
        })
    }

    #[cfg(not(feature = "labels"))]
    fn label(&mut self, region: &Region) -> Option<Operation> {
        log::debug!("{}: built without label support", region);
        None
    }
}

/// Arrow anchor of a region: its centroid, or a guaranteed interior point
/// when the centroid falls outside a concave outline.
fn reading_order_anchor(polygon: &Polygon) -> Point {
    let centroid = polygon.centroid();
    if polygon.contains(centroid) {
        centroid
    } else {
        polygon.representative_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SegmentBuilder;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    fn region(
        doc: &mut PageDocument,
        kind: RegionKind,
        id: &str,
        outline: Vec<Point>,
    ) -> SegmentKey {
        let page = doc.page();
        let builder = SegmentBuilder::new(SegmentKind::Region(kind), outline).with_id(id);
        doc.add(page, builder).unwrap()
    }

    #[test]
    fn test_region_priority() {
        let mut kinds = vec![
            SegmentKind::Region(RegionKind::Separator),
            SegmentKind::Region(RegionKind::Text),
            SegmentKind::Region(RegionKind::Image),
        ];
        kinds.sort_by_key(|k| region_priority(*k));
        assert_eq!(kinds[0], SegmentKind::Region(RegionKind::Image));
        assert_eq!(kinds[2], SegmentKind::Region(RegionKind::Separator));
    }

    #[test]
    fn test_features_gate_operations() {
        let mut doc = PageDocument::new("p.png", 100.0, 100.0);
        let r = region(&mut doc, RegionKind::Text, "r1", rect(10.0, 10.0, 90.0, 90.0));
        doc.add(
            r,
            SegmentBuilder::new(SegmentKind::TextLine, rect(20.0, 20.0, 80.0, 40.0))
                .with_baseline(vec![Point::new(20.0, 38.0), Point::new(80.0, 38.0)]),
        )
        .unwrap();

        let canvas = canvas::blank(100, 100, Rgba::WHITE);
        let opts = RenderOptions::default().with_features(Features::REGIONS);
        let mut renderer = PageRenderer::new(&canvas, Affine::identity(), opts);
        renderer.render_all(&doc);
        assert_eq!(renderer.operations().len(), 1);

        let mut renderer = PageRenderer::new(&canvas, Affine::identity(), RenderOptions::default());
        renderer.render_all(&doc);
        // region, line and baseline
        assert_eq!(renderer.operations().len(), 3);
    }

    #[test]
    fn test_baseline_depth_follows_line_nesting() {
        let mut doc = PageDocument::new("p.png", 100.0, 100.0);
        let table = region(&mut doc, RegionKind::Table, "t1", rect(5.0, 5.0, 95.0, 95.0));
        let cell_outline = rect(10.0, 10.0, 90.0, 90.0);
        let cell = SegmentBuilder::new(SegmentKind::Region(RegionKind::Text), cell_outline);
        let cell = doc.add(table, cell.with_id("c1")).unwrap();
        doc.add(
            cell,
            SegmentBuilder::new(SegmentKind::TextLine, rect(20.0, 20.0, 80.0, 40.0))
                .with_id("l1")
                .with_baseline(vec![Point::new(20.0, 38.0), Point::new(80.0, 38.0)]),
        )
        .unwrap();

        let canvas = canvas::blank(100, 100, Rgba::WHITE);
        let opts = RenderOptions::default().with_features(Features::BASELINES);
        let mut renderer = PageRenderer::new(&canvas, Affine::identity(), opts);
        renderer.render_all(&doc);

        let depths: Vec<u32> = renderer
            .operations()
            .layers()
            .flat_map(|(depth, ops)| ops.iter().map(move |op| (depth, op)))
            .filter(|(_, op)| matches!(op, Operation::Connector { .. }))
            .map(|(depth, _)| depth)
            .collect();
        // the line sits in layer 40, under the table and its cell
        assert_eq!(depths, vec![45]);
    }

    #[test]
    fn test_reading_order_arrows() {
        let mut doc = PageDocument::new("p.png", 300.0, 100.0);
        let a = region(&mut doc, RegionKind::Text, "a", rect(0.0, 0.0, 100.0, 100.0));
        let b = region(&mut doc, RegionKind::Text, "b", rect(100.0, 0.0, 200.0, 100.0));
        let c = region(&mut doc, RegionKind::Text, "c", rect(200.0, 0.0, 300.0, 100.0));
        doc.set_reading_order([a, b, c]);

        let canvas = canvas::blank(300, 100, Rgba::WHITE);
        let opts = RenderOptions::default().with_features(Features::ORDER);
        let mut renderer = PageRenderer::new(&canvas, Affine::identity(), opts);
        renderer.render_all(&doc);

        let arrows: Vec<(Point, Point)> = renderer
            .operations()
            .layers()
            .flat_map(|(_, ops)| ops.iter())
            .filter_map(|op| match op {
                Operation::Arrow { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            arrows,
            vec![
                (Point::new(50.0, 50.0), Point::new(150.0, 50.0)),
                (Point::new(150.0, 50.0), Point::new(250.0, 50.0)),
            ]
        );
    }

    #[test]
    fn test_concave_anchor_is_inside() {
        // U shape whose centroid lies in the notch
        let u = Polygon::new(&[
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 5.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ])
        .unwrap();
        assert!(u.contains(reading_order_anchor(&u)));
    }

    #[test]
    fn test_without_image_canvas_is_white() {
        let canvas = canvas::blank(4, 4, Rgba::BLACK);
        let opts = RenderOptions::default().with_features(Features::REGIONS);
        let mut renderer = PageRenderer::new(&canvas, Affine::identity(), opts);
        renderer.render_all(&PageDocument::new("p.png", 4.0, 4.0));
        let (image, regions) = renderer.get_result().unwrap();
        assert_eq!(image.get_pixel(2, 2).0, [255, 255, 255, 255]);
        assert!(regions.is_empty());
    }
}
