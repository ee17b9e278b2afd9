//! Feature toggles controlling what a render pass draws.

use crate::document::SegmentKind;
use crate::error::{Error, Result};
use bitflags::bitflags;
use std::str::FromStr;

bitflags! {
    /// Independent render toggles.
    ///
    /// Combine with `|`; the renderer tests `features.intersects(flag)`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    pub struct Features: u32 {
        /// Draw the page raster as background
        const IMAGE = 1 << 0;
        /// Page border
        const BORDER = 1 << 1;
        /// Print space
        const PRINT_SPACE = 1 << 2;
        /// Reading-order arrows between text regions
        const ORDER = 1 << 3;
        /// Layout regions
        const REGIONS = 1 << 4;
        /// Text lines
        const LINES = 1 << 5;
        /// Words
        const WORDS = 1 << 6;
        /// Glyphs
        const GLYPHS = 1 << 7;
        /// Graphemes (reserved, never drawn)
        const GRAPHEMES = 1 << 8;
        /// Highlight segments that needed repair or carry warnings
        const WARNINGS = 1 << 9;
        /// Text line baselines
        const BASELINES = 1 << 10;

        /// Image, border, regions, lines and baselines
        const DEFAULT = Self::IMAGE.bits()
            | Self::BORDER.bits()
            | Self::REGIONS.bits()
            | Self::LINES.bits()
            | Self::BASELINES.bits();
    }
}

/// Single flags in menu order with their config name, label and icon.
const NAMED: &[(Features, &str, &str, &str)] = &[
    (Features::IMAGE, "image", "Image", "\u{1F5BC}"),
    (Features::BORDER, "border", "Border", "\u{25AD}"),
    (Features::PRINT_SPACE, "print_space", "Print Space", "\u{25AF}"),
    (Features::ORDER, "order", "Reading Order", "\u{219D}"),
    (Features::REGIONS, "regions", "Regions", "\u{25A6}"),
    (Features::LINES, "lines", "Lines", "\u{2630}"),
    (Features::WORDS, "words", "Words", "\u{2423}"),
    (Features::GLYPHS, "glyphs", "Glyphs", "\u{1D4D0}"),
    (Features::GRAPHEMES, "graphemes", "Graphemes", "\u{1D552}"),
    (Features::WARNINGS, "warnings", "Warnings", "\u{26A0}"),
    (Features::BASELINES, "baselines", "Baselines", "\u{23C1}"),
];

impl Default for Features {
    fn default() -> Self {
        Features::DEFAULT
    }
}

impl Features {
    /// Whether segments of `kind` are drawn under these flags.
    ///
    /// The page root and graphemes are never drawn.
    pub fn should_render(self, kind: SegmentKind) -> bool {
        let flag = match kind {
            SegmentKind::Border => Features::BORDER,
            SegmentKind::PrintSpace => Features::PRINT_SPACE,
            SegmentKind::Region(_) => Features::REGIONS,
            SegmentKind::TextLine => Features::LINES,
            SegmentKind::Word => Features::WORDS,
            SegmentKind::Glyph => Features::GLYPHS,
            SegmentKind::Page | SegmentKind::Grapheme => return false,
        };
        self.intersects(flag)
    }

    /// Human label of a single flag, e.g. `Reading Order`.
    pub fn label(self) -> Option<&'static str> {
        NAMED
            .iter()
            .find(|(flag, ..)| *flag == self)
            .map(|(_, _, label, _)| *label)
    }

    /// One-glyph icon of a single flag.
    pub fn icon(self) -> Option<&'static str> {
        NAMED
            .iter()
            .find(|(flag, ..)| *flag == self)
            .map(|(_, _, _, icon)| *icon)
    }

    /// Config name of a single flag, e.g. `print_space`.
    pub fn name(self) -> Option<&'static str> {
        NAMED
            .iter()
            .find(|(flag, ..)| *flag == self)
            .map(|(_, name, ..)| *name)
    }

    /// All single flags in menu order.
    pub fn each() -> impl Iterator<Item = Features> {
        NAMED.iter().map(|(flag, ..)| *flag)
    }
}

impl FromStr for Features {
    type Err = Error;

    /// Parse a comma separated list of flag names.
    ///
    /// Names are case-insensitive; `default` and `none` are accepted too.
    fn from_str(s: &str) -> Result<Self> {
        let mut features = Features::empty();
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let lower = name.to_ascii_lowercase();
            let flag = match lower.as_str() {
                "default" => Features::DEFAULT,
                "none" => Features::empty(),
                _ => NAMED
                    .iter()
                    .find(|(_, n, ..)| *n == lower)
                    .map(|(flag, ..)| *flag)
                    .ok_or_else(|| Error::UnknownFeature(name.to_string()))?,
            };
            features |= flag;
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RegionKind;

    #[test]
    fn test_default_subset() {
        let d = Features::default();
        assert_eq!(d.bits(), 1 | 2 | 16 | 32 | 1024);
        assert!(d.contains(Features::IMAGE | Features::BASELINES));
        assert!(!d.intersects(Features::ORDER | Features::WORDS | Features::WARNINGS));
    }

    #[test]
    fn test_should_render() {
        let f = Features::REGIONS | Features::WORDS;
        assert!(f.should_render(SegmentKind::Region(RegionKind::Separator)));
        assert!(f.should_render(SegmentKind::Word));
        assert!(!f.should_render(SegmentKind::TextLine));
        assert!(!f.should_render(SegmentKind::Border));
        assert!(!Features::all().should_render(SegmentKind::Grapheme));
        assert!(!Features::all().should_render(SegmentKind::Page));
    }

    #[test]
    fn test_parse_names() {
        let f: Features = "regions, lines,WARNINGS".parse().unwrap();
        assert_eq!(f, Features::REGIONS | Features::LINES | Features::WARNINGS);
        assert_eq!("".parse::<Features>().unwrap(), Features::empty());
        assert_eq!("default".parse::<Features>().unwrap(), Features::DEFAULT);
    }

    #[test]
    fn test_parse_unknown_name() {
        let err = "regions,tables".parse::<Features>().unwrap_err();
        assert!(matches!(err, Error::UnknownFeature(ref n) if n == "tables"));
    }

    #[test]
    fn test_labels_and_icons() {
        assert_eq!(Features::ORDER.label(), Some("Reading Order"));
        assert_eq!(Features::PRINT_SPACE.name(), Some("print_space"));
        assert!(Features::WARNINGS.icon().is_some());
        assert_eq!((Features::IMAGE | Features::ORDER).label(), None);
        assert_eq!(Features::each().count(), 11);
    }
}
