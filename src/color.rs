//! RGBA colors and the segment-type color table.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// An 8-bit straight-alpha color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha, 255 is opaque
    pub a: u8,
}

impl Rgba {
    /// Opaque red, used for types missing from the color table.
    pub const FALLBACK: Rgba = Rgba::new(0xFF, 0x00, 0x00, 0xFF);
    /// Opaque white.
    pub const WHITE: Rgba = Rgba::new(0xFF, 0xFF, 0xFF, 0xFF);
    /// Opaque black.
    pub const BLACK: Rgba = Rgba::new(0x00, 0x00, 0x00, 0xFF);

    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `RRGGBB` or `RRGGBBAA`, with or without a leading `#`.
    ///
    /// # Examples
    ///
    /// ```
    /// use segview::color::Rgba;
    ///
    /// let c = Rgba::from_hex("#22DD227F").unwrap();
    /// assert_eq!((c.r, c.g, c.b, c.a), (0x22, 0xDD, 0x22, 0x7F));
    /// assert_eq!(Rgba::from_hex("0000FF").unwrap().a, 0xFF);
    /// ```
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(Error::InvalidColor(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Error::InvalidColor(s.to_string()))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 0xFF };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Convert to a tiny-skia color.
    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Default type colors, keyed by `Type` or `Type:subtype`.
const CLASSES: &[(&str, &str)] = &[
    ("Glyph", "2E8B08FF"),
    ("Word", "B22222FF"),
    ("TextLine", "32CD32FF"),
    ("Baseline", "22DD227F"),
    ("Border", "FFFFFFFF"),
    ("PrintSpace", "CCCCCCFF"),
    ("TableRegion", "8B4513FF"),
    ("AdvertRegion", "4682B4FF"),
    ("ChemRegion", "FF8C00FF"),
    ("MusicRegion", "9400D3FF"),
    ("MapRegion", "9ACDD2FF"),
    ("TextRegion", "0000FFFF"),
    ("TextRegion:paragraph", "0000FFFA"),
    ("TextRegion:heading", "0000FFF5"),
    ("TextRegion:caption", "0000FFF0"),
    ("TextRegion:header", "0000FFEB"),
    ("TextRegion:footer", "0000FFE6"),
    ("TextRegion:page-number", "0000FFE1"),
    ("TextRegion:drop-capital", "0000FFDC"),
    ("TextRegion:credit", "0000FFD7"),
    ("TextRegion:floating", "0000FFD2"),
    ("TextRegion:signature-mark", "0000FFCD"),
    ("TextRegion:catch-word", "0000FFC8"),
    ("TextRegion:marginalia", "0000FFC3"),
    ("TextRegion:footnote", "0000FFBE"),
    ("TextRegion:footnote-continued", "0000FFB9"),
    ("TextRegion:endnote", "0000FFB4"),
    ("TextRegion:TOC-entry", "0000FFAF"),
    ("TextRegion:list-label", "0000FFA5"),
    ("TextRegion:other", "0000FFA0"),
    ("ChartRegion", "800080FF"),
    ("ChartRegion:bar", "800080FA"),
    ("ChartRegion:line", "800080F5"),
    ("ChartRegion:pie", "800080F0"),
    ("ChartRegion:scatter", "800080EB"),
    ("ChartRegion:surface", "800080E6"),
    ("ChartRegion:other", "800080E1"),
    ("GraphicRegion", "008000FF"),
    ("GraphicRegion:logo", "008000FA"),
    ("GraphicRegion:letterhead", "008000F0"),
    ("GraphicRegion:decoration", "008000EB"),
    ("GraphicRegion:frame", "008000E6"),
    ("GraphicRegion:handwritten-annotation", "008000E1"),
    ("GraphicRegion:stamp", "008000DC"),
    ("GraphicRegion:signature", "008000D7"),
    ("GraphicRegion:barcode", "008000D2"),
    ("GraphicRegion:paper-grow", "008000CD"),
    ("GraphicRegion:punch-hole", "008000C8"),
    ("GraphicRegion:other", "008000C3"),
    ("ImageRegion", "00CED1FF"),
    ("LineDrawingRegion", "B8860BFF"),
    ("MathsRegion", "00BFFFFF"),
    ("NoiseRegion", "FF0000FF"),
    ("SeparatorRegion", "FF00FFFF"),
    ("UnknownRegion", "646464FF"),
    ("CustomRegion", "637C81FF"),
];

/// Segment type to color mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    colors: HashMap<String, Rgba>,
}

impl Default for ColorTable {
    fn default() -> Self {
        let colors = CLASSES
            .iter()
            .filter_map(|(name, hex)| Rgba::from_hex(hex).ok().map(|c| (name.to_string(), c)))
            .collect();
        Self { colors }
    }
}

impl ColorTable {
    /// The default table with `overrides` applied on top.
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = (&'a String, &'a Rgba)>) -> Self {
        let mut table = Self::default();
        for (name, color) in overrides {
            table.set(name.clone(), *color);
        }
        table
    }

    /// Set or replace the color of a type.
    pub fn set(&mut self, region_type: impl Into<String>, color: Rgba) {
        self.colors.insert(region_type.into(), color);
    }

    /// Color for `Type[:subtype]`: exact entry, then the base type, then red.
    pub fn get(&self, region_type: &str) -> Rgba {
        if let Some(color) = self.colors.get(region_type) {
            return *color;
        }
        region_type
            .split_once(':')
            .and_then(|(base, _)| self.colors.get(base))
            .copied()
            .unwrap_or(Rgba::FALLBACK)
    }
}
