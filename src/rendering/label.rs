//! Word labels: font lookup, size fitting and glyph outlines.
//!
//! Fonts are discovered through `fontdb`, shaped with `rustybuzz` and
//! turned into `tiny-skia` paths. Scaled faces are cached per
//! (font, pixel size) in a [`FontCache`] owned by the renderer.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use rustybuzz::ttf_parser::{GlyphId, OutlineBuilder};
use std::collections::HashMap;
use std::hash::Hash;
use std::path::Path as FsPath;
use std::sync::Arc;
use tiny_skia::{Path, PathBuilder};

/// Font size the fitting loop starts from.
const INITIAL_SIZE: u32 = 30;
const MAX_TRIES: u32 = 5;
/// Fitting stops once the size factor is within this distance of 1.
const FIT_TOLERANCE: f32 = 0.05;
/// Weight of the width fit; the height fit gets the rest.
const WIDTH_WEIGHT: f32 = 0.7;

/// How many scaled faces a [`FontCache`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Never evict
    Unbounded,
    /// Keep at most `capacity` faces, dropping the least recently used
    LeastRecentlyUsed {
        /// Maximum number of cached faces (at least one is kept)
        capacity: usize,
    },
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        EvictionPolicy::LeastRecentlyUsed { capacity: 64 }
    }
}

impl EvictionPolicy {
    /// Mark `key` as used; returns the value if present.
    fn touch<K: Hash + Eq + Clone, V: Clone>(
        &self,
        map: &mut IndexMap<K, V>,
        key: &K,
    ) -> Option<V> {
        match self {
            EvictionPolicy::Unbounded => map.get(key).cloned(),
            EvictionPolicy::LeastRecentlyUsed { .. } => {
                let value = map.shift_remove(key)?;
                map.insert(key.clone(), value.clone());
                Some(value)
            },
        }
    }

    /// Drop entries from the front until the map fits.
    fn enforce<K: Hash + Eq, V>(&self, map: &mut IndexMap<K, V>) {
        if let EvictionPolicy::LeastRecentlyUsed { capacity } = self {
            while map.len() > (*capacity).max(1) {
                map.shift_remove_index(0);
            }
        }
    }
}

/// A font face at one pixel size.
#[derive(Debug, Clone)]
pub struct ScaledFace {
    data: Arc<Vec<u8>>,
    index: u32,
    size: u32,
    scale: f32,
    ascender: f32,
    descender: f32,
}

impl ScaledFace {
    /// Pixel size.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Ascender in pixels.
    pub fn ascender(&self) -> f32 {
        self.ascender
    }

    /// Width and line height of `text` in pixels.
    pub fn measure(&self, text: &str) -> Option<(f32, f32)> {
        let face = rustybuzz::Face::from_slice(&self.data, self.index)?;
        let glyphs = shape(&face, text);
        let advance: i32 = glyphs.glyph_positions().iter().map(|p| p.x_advance).sum();
        Some((advance as f32 * self.scale, self.ascender - self.descender))
    }

    /// Glyph outlines of `text` with its top-left corner at `(x, y)`.
    ///
    /// Returns `None` when no glyph has an outline.
    pub fn outline(&self, text: &str, x: f32, y: f32) -> Option<Path> {
        let face = rustybuzz::Face::from_slice(&self.data, self.index)?;
        let glyphs = shape(&face, text);
        let mut pb = PathBuilder::new();
        let baseline = y + self.ascender;
        let mut pen = x;
        for (info, pos) in glyphs.glyph_infos().iter().zip(glyphs.glyph_positions()) {
            let mut sink = GlyphSink {
                pb: &mut pb,
                scale: self.scale,
                x: pen + pos.x_offset as f32 * self.scale,
                y: baseline - pos.y_offset as f32 * self.scale,
            };
            face.outline_glyph(GlyphId(info.glyph_id as u16), &mut sink);
            pen += pos.x_advance as f32 * self.scale;
        }
        pb.finish()
    }
}

fn shape(face: &rustybuzz::Face<'_>, text: &str) -> rustybuzz::GlyphBuffer {
    let mut buffer = rustybuzz::UnicodeBuffer::new();
    buffer.push_str(text);
    rustybuzz::shape(face, &[], buffer)
}

/// Feeds font-unit outlines into a canvas path, flipping the y axis.
struct GlyphSink<'a> {
    pb: &'a mut PathBuilder,
    scale: f32,
    x: f32,
    y: f32,
}

impl GlyphSink<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x * self.scale, self.y - y * self.scale)
    }
}

impl OutlineBuilder for GlyphSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.pb.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.pb.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.pb.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.pb.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.pb.close();
    }
}

/// Font database plus a cache of scaled faces.
pub struct FontCache {
    db: fontdb::Database,
    sources: HashMap<fontdb::ID, (Arc<Vec<u8>>, u32)>,
    faces: IndexMap<(fontdb::ID, u32), Arc<ScaledFace>>,
    policy: EvictionPolicy,
}

impl std::fmt::Debug for FontCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontCache")
            .field("fonts", &self.db.len())
            .field("faces", &self.faces.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl FontCache {
    /// A cache with no fonts loaded.
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            db: fontdb::Database::new(),
            sources: HashMap::new(),
            faces: IndexMap::new(),
            policy,
        }
    }

    /// A cache preloaded with the system fonts.
    pub fn with_system_fonts(policy: EvictionPolicy) -> Self {
        let mut cache = Self::new(policy);
        cache.db.load_system_fonts();
        log::debug!("loaded {} system font faces", cache.db.len());
        cache
    }

    /// Add a font from memory.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
    }

    /// Add a font file.
    pub fn load_font_file(&mut self, path: impl AsRef<FsPath>) -> Result<()> {
        let path = path.as_ref();
        self.db
            .load_font_file(path)
            .map_err(|e| Error::Font(format!("{}: {}", path.display(), e)))
    }

    /// Number of known font faces.
    pub fn font_count(&self) -> usize {
        self.db.len()
    }

    /// Number of cached scaled faces.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Whether no scaled face is cached.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Whether `(font, size)` is cached.
    pub fn contains(&self, font: fontdb::ID, size: u32) -> bool {
        self.faces.contains_key(&(font, size))
    }

    /// Find a face for a CSS-like family name (`serif`, `sans-serif`,
    /// `monospace` or a concrete name).
    pub fn resolve(&self, family: &str) -> Option<fontdb::ID> {
        let family = family.trim();
        let families = [if family.eq_ignore_ascii_case("serif") {
            fontdb::Family::Serif
        } else if family.eq_ignore_ascii_case("sans-serif") {
            fontdb::Family::SansSerif
        } else if family.eq_ignore_ascii_case("monospace") {
            fontdb::Family::Monospace
        } else {
            fontdb::Family::Name(family)
        }];
        self.db.query(&fontdb::Query {
            families: &families,
            weight: fontdb::Weight::NORMAL,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        })
    }

    /// The face `font` at `size` pixels, cached.
    pub fn face(&mut self, font: fontdb::ID, size: u32) -> Result<Arc<ScaledFace>> {
        let key = (font, size);
        if let Some(face) = self.policy.touch(&mut self.faces, &key) {
            return Ok(face);
        }

        let (data, index) = match self.sources.get(&font) {
            Some(source) => source.clone(),
            None => {
                let source = self
                    .db
                    .with_face_data(font, |data, index| (Arc::new(data.to_vec()), index))
                    .ok_or_else(|| Error::Font(format!("unknown font {:?}", font)))?;
                self.sources.insert(font, source.clone());
                source
            },
        };

        let face = rustybuzz::Face::from_slice(&data, index)
            .ok_or_else(|| Error::Font(format!("cannot parse font {:?}", font)))?;
        let units = face.units_per_em().max(1) as f32;
        let scale = size as f32 / units;
        let scaled = Arc::new(ScaledFace {
            ascender: f32::from(face.ascender()) * scale,
            descender: f32::from(face.descender()) * scale,
            data: data.clone(),
            index,
            size,
            scale,
        });

        self.faces.insert(key, scaled.clone());
        self.policy.enforce(&mut self.faces);
        Ok(scaled)
    }
}

/// Fit a font size so that text fills a `width` x `height` box.
///
/// Starts at 30 px and rescales by `0.7 * width / w + 0.3 * height / h` at
/// most five times, stopping once the factor is within 5 % of one.
/// `measure` returns the text extent at a given size. Returns `None` when
/// measuring fails or yields an empty extent.
pub fn fit_font_size(
    mut measure: impl FnMut(u32) -> Option<(f32, f32)>,
    width: f32,
    height: f32,
) -> Option<u32> {
    let mut size = INITIAL_SIZE;
    let mut factor = 0.0f32;
    let mut tries = 0;
    while (factor - 1.0).abs() > FIT_TOLERANCE && tries < MAX_TRIES {
        let (w, h) = measure(size)?;
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        factor = WIDTH_WEIGHT * width / w + (1.0 - WIDTH_WEIGHT) * height / h;
        size = ((size as f32 * factor) as u32).max(1);
        tries += 1;
    }
    Some(size)
}
