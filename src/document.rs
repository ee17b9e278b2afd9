//! In-memory page annotation tree.
//!
//! A [`PageDocument`] is an arena of [`Segment`]s addressed by
//! [`SegmentKey`]. The arena root is the page itself; print space and
//! border hang off the page, regions may nest, text regions own lines,
//! lines own words, words own glyphs and glyphs own graphemes.
//!
//! Parsing an annotation file into this structure is the caller's job.
//! The tree is immutable while a render pass reads it.

use crate::error::{Error, Result};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle of one segment inside its [`PageDocument`].
///
/// Keys are assigned in insertion order and are only meaningful for the
/// document that issued them. Region identity is key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentKey(usize);

impl SegmentKey {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Region categories of the page layout schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    /// Text block; owns text lines
    Text,
    /// Raster image
    Image,
    /// Line drawing
    LineDrawing,
    /// Graphic (logo, stamp, decoration, ...)
    Graphic,
    /// Table
    Table,
    /// Chart
    Chart,
    /// Separator rule
    Separator,
    /// Mathematical formula
    Maths,
    /// Chemical formula
    Chem,
    /// Music notation
    Music,
    /// Advertisement
    Advert,
    /// Map
    Map,
    /// Noise
    Noise,
    /// Unknown content
    Unknown,
    /// Custom region
    Custom,
}

impl RegionKind {
    /// Schema element name, e.g. `TextRegion`.
    pub fn type_name(self) -> &'static str {
        match self {
            RegionKind::Text => "TextRegion",
            RegionKind::Image => "ImageRegion",
            RegionKind::LineDrawing => "LineDrawingRegion",
            RegionKind::Graphic => "GraphicRegion",
            RegionKind::Table => "TableRegion",
            RegionKind::Chart => "ChartRegion",
            RegionKind::Separator => "SeparatorRegion",
            RegionKind::Maths => "MathsRegion",
            RegionKind::Chem => "ChemRegion",
            RegionKind::Music => "MusicRegion",
            RegionKind::Advert => "AdvertRegion",
            RegionKind::Map => "MapRegion",
            RegionKind::Noise => "NoiseRegion",
            RegionKind::Unknown => "UnknownRegion",
            RegionKind::Custom => "CustomRegion",
        }
    }

    /// Only text, chart and graphic regions carry a subtype.
    pub fn has_subtype(self) -> bool {
        matches!(self, RegionKind::Text | RegionKind::Chart | RegionKind::Graphic)
    }
}

/// Type tag of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// The page root
    Page,
    /// Page border
    Border,
    /// Print space
    PrintSpace,
    /// Any layout region
    Region(RegionKind),
    /// Text line
    TextLine,
    /// Word
    Word,
    /// Glyph
    Glyph,
    /// Grapheme
    Grapheme,
}

impl SegmentKind {
    /// Base type name without subtype, e.g. `TextLine`.
    pub fn base_type(self) -> &'static str {
        match self {
            SegmentKind::Page => "Page",
            SegmentKind::Border => "Border",
            SegmentKind::PrintSpace => "PrintSpace",
            SegmentKind::Region(kind) => kind.type_name(),
            SegmentKind::TextLine => "TextLine",
            SegmentKind::Word => "Word",
            SegmentKind::Glyph => "Glyph",
            SegmentKind::Grapheme => "Grapheme",
        }
    }

    /// Whether segments of this kind carry a text transcription.
    pub fn carries_text(self) -> bool {
        matches!(
            self,
            SegmentKind::Region(RegionKind::Text)
                | SegmentKind::TextLine
                | SegmentKind::Word
                | SegmentKind::Glyph
        )
    }

    /// Whether this is a layout region of any kind.
    pub fn is_region(self) -> bool {
        matches!(self, SegmentKind::Region(_))
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_type())
    }
}

/// One transcription alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEquiv {
    /// Unicode text
    pub text: String,
    /// Recognition confidence in `0.0..=1.0`
    pub conf: Option<f64>,
}

/// Description of a segment to add to a [`PageDocument`].
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentBuilder {
    kind: SegmentKind,
    points: Vec<Point>,
    id: Option<String>,
    subtype: Option<String>,
    coords_conf: Option<f64>,
    text_equivs: Vec<TextEquiv>,
    baseline: Option<Vec<Point>>,
}

impl SegmentBuilder {
    /// A segment of `kind` outlined by `points`.
    pub fn new(kind: SegmentKind, points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            kind,
            points: points.into_iter().collect(),
            id: None,
            subtype: None,
            coords_conf: None,
            text_equivs: Vec::new(),
            baseline: None,
        }
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the region subtype (`paragraph`, `heading`, ...).
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    /// Append a transcription alternative.
    pub fn with_text(mut self, text: impl Into<String>, conf: Option<f64>) -> Self {
        self.text_equivs.push(TextEquiv {
            text: text.into(),
            conf,
        });
        self
    }

    /// Set the coordinate confidence.
    pub fn with_coords_conf(mut self, conf: f64) -> Self {
        self.coords_conf = Some(conf);
        self
    }

    /// Set the baseline (text lines only).
    pub fn with_baseline(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.baseline = Some(points.into_iter().collect());
        self
    }
}

/// One node of the annotation hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    key: SegmentKey,
    parent: Option<SegmentKey>,
    children: Vec<SegmentKey>,
    kind: SegmentKind,
    points: Vec<Point>,
    id: Option<String>,
    subtype: Option<String>,
    coords_conf: Option<f64>,
    text_equivs: Vec<TextEquiv>,
    baseline: Option<Vec<Point>>,
}

impl Segment {
    /// Arena key.
    pub fn key(&self) -> SegmentKey {
        self.key
    }

    /// Parent segment, `None` for the page.
    pub fn parent(&self) -> Option<SegmentKey> {
        self.parent
    }

    /// Children in document order.
    pub fn children(&self) -> &[SegmentKey] {
        &self.children
    }

    /// Type tag.
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Raw outline coordinates.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Subtype, reported only for kinds that carry one.
    pub fn subtype(&self) -> Option<&str> {
        match self.kind {
            SegmentKind::Region(kind) if kind.has_subtype() => self.subtype.as_deref(),
            _ => None,
        }
    }

    /// `Type` or `Type:subtype`, e.g. `TextRegion:paragraph`.
    pub fn region_type(&self) -> String {
        match self.subtype() {
            Some(subtype) if !subtype.is_empty() => {
                format!("{}:{}", self.kind.base_type(), subtype)
            },
            _ => self.kind.base_type().to_string(),
        }
    }

    /// Coordinate confidence.
    pub fn coords_conf(&self) -> Option<f64> {
        self.coords_conf
    }

    /// All transcription alternatives.
    pub fn text_equivs(&self) -> &[TextEquiv] {
        &self.text_equivs
    }

    /// First transcription, for kinds that carry text.
    pub fn text(&self) -> Option<&str> {
        if !self.kind.carries_text() {
            return None;
        }
        self.text_equivs
            .first()
            .map(|t| t.text.as_str())
            .filter(|t| !t.is_empty())
    }

    /// Confidence of the first transcription.
    pub fn text_conf(&self) -> Option<f64> {
        if !self.kind.carries_text() {
            return None;
        }
        self.text_equivs.first().and_then(|t| t.conf)
    }

    /// Baseline coordinates (text lines only).
    pub fn baseline(&self) -> Option<&[Point]> {
        self.baseline.as_deref()
    }

    /// `Type[:subtype]#id`, used in log lines and tooltips.
    pub fn descriptor(&self) -> String {
        format!("{}#{}", self.region_type(), self.id().unwrap_or_default())
    }
}

/// A page with its annotation tree and reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDocument {
    image_filename: String,
    segments: Vec<Segment>,
    reading_order: Vec<SegmentKey>,
}

impl PageDocument {
    /// Create a document whose page covers `width` x `height` pixels of
    /// the image `image_filename`.
    pub fn new(image_filename: impl Into<String>, width: f64, height: f64) -> Self {
        let page = Segment {
            key: SegmentKey(0),
            parent: None,
            children: Vec::new(),
            kind: SegmentKind::Page,
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(width, 0.0),
                Point::new(width, height),
                Point::new(0.0, height),
            ],
            id: None,
            subtype: None,
            coords_conf: None,
            text_equivs: Vec::new(),
            baseline: None,
        };
        Self {
            image_filename: image_filename.into(),
            segments: vec![page],
            reading_order: Vec::new(),
        }
    }

    /// Key of the page root.
    pub fn page(&self) -> SegmentKey {
        SegmentKey(0)
    }

    /// Image file the page was annotated on.
    pub fn image_filename(&self) -> &str {
        &self.image_filename
    }

    /// Number of segments, page included.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; the page root is always present.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Add a segment under `parent` and return its key.
    pub fn add(&mut self, parent: SegmentKey, segment: SegmentBuilder) -> Result<SegmentKey> {
        if parent.0 >= self.segments.len() {
            return Err(Error::UnknownSegment(parent));
        }
        let key = SegmentKey(self.segments.len());
        let SegmentBuilder {
            kind,
            points,
            id,
            subtype,
            coords_conf,
            text_equivs,
            baseline,
        } = segment;
        self.segments.push(Segment {
            key,
            parent: Some(parent),
            children: Vec::new(),
            kind,
            points,
            id,
            subtype,
            coords_conf,
            text_equivs,
            baseline,
        });
        self.segments[parent.0].children.push(key);
        Ok(key)
    }

    /// Look up a segment.
    pub fn get(&self, key: SegmentKey) -> Option<&Segment> {
        self.segments.get(key.0)
    }

    /// Iterate over all segments in insertion order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Children of `key` having `kind`.
    pub fn children_of_kind(
        &self,
        key: SegmentKey,
        kind: SegmentKind,
    ) -> impl Iterator<Item = &Segment> + '_ {
        self.get(key)
            .map(|s| s.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|k| self.get(*k))
            .filter(move |s| s.kind == kind)
    }

    /// The page's print space, if annotated.
    pub fn print_space(&self) -> Option<&Segment> {
        self.children_of_kind(self.page(), SegmentKind::PrintSpace)
            .next()
    }

    /// The page's border, if annotated.
    pub fn border(&self) -> Option<&Segment> {
        self.children_of_kind(self.page(), SegmentKind::Border).next()
    }

    /// Every region on the page, nested regions included, each parent
    /// before its children.
    pub fn all_regions(&self) -> Vec<&Segment> {
        let mut regions = Vec::new();
        let mut stack: Vec<SegmentKey> = self.segments[0].children.iter().rev().copied().collect();
        while let Some(key) = stack.pop() {
            let Some(segment) = self.get(key) else {
                continue;
            };
            if segment.kind.is_region() {
                regions.push(segment);
                stack.extend(segment.children.iter().rev().copied());
            }
        }
        regions
    }

    /// Set the reading order (region keys, first to last).
    pub fn set_reading_order(&mut self, order: impl IntoIterator<Item = SegmentKey>) {
        self.reading_order = order.into_iter().collect();
    }

    /// Regions in reading order; unknown keys are skipped.
    pub fn reading_order(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.reading_order.iter().filter_map(|k| self.get(*k))
    }

    /// Ancestor chain of `key`, `key` first and the page last.
    pub fn ancestry(&self, key: SegmentKey) -> Vec<&Segment> {
        let mut chain = Vec::new();
        let mut current = self.get(key);
        while let Some(segment) = current {
            chain.push(segment);
            current = segment.parent.and_then(|p| self.get(p));
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    #[test]
    fn test_new_document_has_page_root() {
        let doc = PageDocument::new("page.tif", 100.0, 200.0);
        assert_eq!(doc.len(), 1);
        let page = doc.get(doc.page()).unwrap();
        assert_eq!(page.kind(), SegmentKind::Page);
        assert!(page.parent().is_none());
        assert_eq!(doc.image_filename(), "page.tif");
    }

    #[test]
    fn test_add_links_parent_and_child() {
        let mut doc = PageDocument::new("p.png", 100.0, 100.0);
        let region = doc
            .add(
                doc.page(),
                SegmentBuilder::new(
                    SegmentKind::Region(RegionKind::Text),
                    rect(0.0, 0.0, 10.0, 10.0),
                ),
            )
            .unwrap();
        let line = doc
            .add(region, SegmentBuilder::new(SegmentKind::TextLine, rect(1.0, 1.0, 9.0, 3.0)))
            .unwrap();
        assert_eq!(doc.get(line).unwrap().parent(), Some(region));
        assert_eq!(doc.get(region).unwrap().children(), &[line]);
        assert_eq!(doc.ancestry(line).len(), 3);
    }

    #[test]
    fn test_add_rejects_unknown_parent() {
        let mut doc = PageDocument::new("p.png", 10.0, 10.0);
        let err = doc
            .add(SegmentKey(42), SegmentBuilder::new(SegmentKind::Word, Vec::new()))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownSegment(_)));
    }

    #[test]
    fn test_region_type_and_descriptor() {
        let mut doc = PageDocument::new("p.png", 10.0, 10.0);
        let key = doc
            .add(
                doc.page(),
                SegmentBuilder::new(SegmentKind::Region(RegionKind::Text), Vec::new())
                    .with_id("r1")
                    .with_subtype("paragraph"),
            )
            .unwrap();
        let seg = doc.get(key).unwrap();
        assert_eq!(seg.region_type(), "TextRegion:paragraph");
        assert_eq!(seg.descriptor(), "TextRegion:paragraph#r1");
    }

    #[test]
    fn test_subtype_ignored_for_kinds_without_subtype() {
        let mut doc = PageDocument::new("p.png", 10.0, 10.0);
        let key = doc
            .add(
                doc.page(),
                SegmentBuilder::new(SegmentKind::Region(RegionKind::Separator), Vec::new())
                    .with_subtype("bogus"),
            )
            .unwrap();
        assert_eq!(doc.get(key).unwrap().region_type(), "SeparatorRegion");
    }

    #[test]
    fn test_text_only_for_text_kinds() {
        let mut doc = PageDocument::new("p.png", 10.0, 10.0);
        let word = doc
            .add(
                doc.page(),
                SegmentBuilder::new(SegmentKind::Word, Vec::new()).with_text("Hello", Some(0.9)),
            )
            .unwrap();
        let image = doc
            .add(
                doc.page(),
                SegmentBuilder::new(SegmentKind::Region(RegionKind::Image), Vec::new())
                    .with_text("ignored", None),
            )
            .unwrap();
        assert_eq!(doc.get(word).unwrap().text(), Some("Hello"));
        assert_eq!(doc.get(word).unwrap().text_conf(), Some(0.9));
        assert_eq!(doc.get(image).unwrap().text(), None);
    }

    #[test]
    fn test_all_regions_is_preorder() {
        let mut doc = PageDocument::new("p.png", 100.0, 100.0);
        let page = doc.page();
        let outer = doc
            .add(page, SegmentBuilder::new(SegmentKind::Region(RegionKind::Table), Vec::new()))
            .unwrap();
        doc.add(page, SegmentBuilder::new(SegmentKind::Border, Vec::new()))
            .unwrap();
        let inner = doc
            .add(outer, SegmentBuilder::new(SegmentKind::Region(RegionKind::Text), Vec::new()))
            .unwrap();
        doc.add(inner, SegmentBuilder::new(SegmentKind::TextLine, Vec::new()))
            .unwrap();
        let last = doc
            .add(page, SegmentBuilder::new(SegmentKind::Region(RegionKind::Image), Vec::new()))
            .unwrap();

        let keys: Vec<SegmentKey> = doc.all_regions().iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec![outer, inner, last]);
        assert!(doc.border().is_some());
        assert!(doc.print_space().is_none());
    }

    #[test]
    fn test_reading_order_skips_unknown_keys() {
        let mut doc = PageDocument::new("p.png", 10.0, 10.0);
        let r = doc
            .add(
                doc.page(),
                SegmentBuilder::new(SegmentKind::Region(RegionKind::Text), Vec::new()),
            )
            .unwrap();
        doc.set_reading_order([r, SegmentKey(99)]);
        assert_eq!(doc.reading_order().count(), 1);
    }
}
