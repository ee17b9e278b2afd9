//! Render-time regions and the spatial index built from them.
//!
//! A [`Region`] wraps one validated segment: its polygon, warnings and the
//! metadata the UI shows for it. Regions are rebuilt from scratch on every
//! render and are owned by the [`RegionMap`] of that render.

mod map;

pub use map::{RegionMap, RegionNode, DEFAULT_IGNORED};

use crate::document::{PageDocument, Segment, SegmentKey, SegmentKind};
use crate::geometry::{Point, Polygon, ValidatedPolygon};
use std::fmt;
use std::hash::{Hash, Hasher};

/// One step of a region's ancestor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    /// Segment key
    pub key: SegmentKey,
    /// Segment kind
    pub kind: SegmentKind,
    /// `Type[:subtype]#id`
    pub descriptor: String,
}

/// A validated segment ready for drawing and hit-testing.
///
/// Equality and hashing use the segment key only: two regions built
/// independently from the same segment compare equal.
#[derive(Debug, Clone)]
pub struct Region {
    key: SegmentKey,
    kind: SegmentKind,
    id: String,
    region_type: String,
    subtype: Option<String>,
    text: Option<String>,
    text_conf: Option<f64>,
    coords_conf: Option<f64>,
    polygon: Polygon,
    warnings: Vec<String>,
    breadcrumbs: Vec<Ancestor>,
}

impl Region {
    /// Wrap `segment` of `doc` with its validated polygon.
    ///
    /// The ancestor chain is computed here, once.
    pub fn new(doc: &PageDocument, segment: &Segment, validated: ValidatedPolygon) -> Self {
        let breadcrumbs = doc
            .ancestry(segment.key())
            .into_iter()
            .map(|s| Ancestor {
                key: s.key(),
                kind: s.kind(),
                descriptor: descriptor_of(doc, s),
            })
            .collect();

        Self {
            key: segment.key(),
            kind: segment.kind(),
            id: id_of(doc, segment),
            region_type: segment.region_type(),
            subtype: segment.subtype().map(str::to_string),
            text: segment.text().map(str::to_string),
            text_conf: segment.text_conf(),
            coords_conf: segment.coords_conf(),
            polygon: validated.polygon,
            warnings: validated.warnings,
            breadcrumbs,
        }
    }

    /// Key of the underlying segment.
    pub fn key(&self) -> SegmentKey {
        self.key
    }

    /// Segment kind.
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Segment id, the image filename for the page, or empty.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Base type name, e.g. `TextRegion`.
    pub fn base_type(&self) -> &'static str {
        self.kind.base_type()
    }

    /// Subtype, e.g. `paragraph`.
    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    /// `Type` or `Type:subtype`.
    pub fn region_type(&self) -> &str {
        &self.region_type
    }

    /// First transcription, for text-carrying kinds.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Confidence of the first transcription.
    pub fn text_conf(&self) -> Option<f64> {
        self.text_conf
    }

    /// Coordinate confidence.
    pub fn coords_conf(&self) -> Option<f64> {
        self.coords_conf
    }

    /// The validated outline.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Validation warnings, empty for clean geometry.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Key of the parent segment, `None` for the page.
    pub fn parent(&self) -> Option<SegmentKey> {
        self.breadcrumbs.get(1).map(|a| a.key)
    }

    /// Ancestor chain, this region first and the page last.
    pub fn breadcrumbs(&self) -> &[Ancestor] {
        &self.breadcrumbs
    }

    /// Nesting level; a top-level region has depth 2 (itself and the page).
    pub fn depth(&self) -> u32 {
        self.breadcrumbs.len() as u32
    }

    /// Strict interior containment.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.polygon.contains(Point::new(x, y))
    }

    /// Tooltip body: name, blank line, text, then one line per warning.
    pub fn tooltip(&self) -> String {
        let mut content = format!("{}\n\n{}", self, self.text().unwrap_or_default());
        if !self.warnings.is_empty() {
            content.push('\n');
            content.push_str(&self.warnings.join("\n"));
        }
        content
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.region_type, self.id)
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Region {}

impl Hash for Region {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

fn id_of(doc: &PageDocument, segment: &Segment) -> String {
    match (segment.id(), segment.kind()) {
        (Some(id), _) => id.to_string(),
        (None, SegmentKind::Page) => doc.image_filename().to_string(),
        (None, _) => String::new(),
    }
}

fn descriptor_of(doc: &PageDocument, segment: &Segment) -> String {
    format!("{}#{}", segment.region_type(), id_of(doc, segment))
}
