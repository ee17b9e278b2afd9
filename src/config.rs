//! Configuration for a render pass.

use crate::color::{ColorTable, Rgba};
use crate::error::Result;
use crate::features::Features;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Render pass configuration.
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes:
///
/// ```
/// use segview::{Features, RenderOptions};
///
/// let json = r#"{"features": "REGIONS | WORDS", "fill_alpha": 255}"#;
/// let opts = RenderOptions::from_json(json).unwrap();
/// assert_eq!(opts.features, Features::REGIONS | Features::WORDS);
/// assert_eq!(opts.fill_alpha, 255);
/// assert_eq!(opts.outline_alpha, 0x96);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Page id used in log lines
    pub page_id: String,

    /// Enabled features
    pub features: Features,

    /// Type color overrides (`Type` or `Type:subtype` to color)
    pub colors: HashMap<String, Rgba>,

    /// Alpha of polygon fills
    pub fill_alpha: u8,

    /// Alpha of polygon outlines
    pub outline_alpha: u8,

    /// Outline stroke width in pixels
    pub outline_width: f32,

    /// Fill of segments with warnings when WARNINGS is enabled
    pub warning_fill: Rgba,

    /// Outline of segments with warnings when WARNINGS is enabled
    pub warning_outline: Rgba,

    /// Baseline stroke width in pixels
    pub baseline_width: f32,

    /// Reading-order arrow color
    pub arrow_color: Rgba,

    /// Reading-order arrow stroke width in pixels
    pub arrow_width: f32,

    /// Length of the arrowhead wings in pixels
    pub arrow_head_size: f32,

    /// Draw word transcriptions inside their boxes
    pub label_words: bool,

    /// Font family used for word labels
    pub label_font_family: String,

    /// Word label color
    pub label_color: Rgba,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_id: "<unknown>".to_string(),
            features: Features::DEFAULT,
            colors: HashMap::new(),
            fill_alpha: 0x1E,
            outline_alpha: 0x96,
            outline_width: 1.0,
            warning_fill: Rgba::new(0xFF, 0x00, 0x00, 0x3E),
            warning_outline: Rgba::new(0xFF, 0x00, 0x00, 0x76),
            baseline_width: 4.0,
            arrow_color: Rgba::new(0xFF, 0x00, 0x00, 0xCF),
            arrow_width: 3.0,
            arrow_head_size: 30.0,
            label_words: false,
            label_font_family: "sans-serif".to_string(),
            label_color: Rgba::BLACK,
        }
    }
}

impl RenderOptions {
    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize options to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the page id used in log lines.
    pub fn with_page_id(mut self, page_id: impl Into<String>) -> Self {
        self.page_id = page_id.into();
        self
    }

    /// Set the enabled features.
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Override the color of one segment type.
    pub fn with_color(mut self, region_type: impl Into<String>, color: Rgba) -> Self {
        self.colors.insert(region_type.into(), color);
        self
    }

    /// Set fill and outline alpha.
    pub fn with_alpha(mut self, fill: u8, outline: u8) -> Self {
        self.fill_alpha = fill;
        self.outline_alpha = outline;
        self
    }

    /// Enable word labels in the given font family.
    pub fn with_word_labels(mut self, family: impl Into<String>) -> Self {
        self.label_words = true;
        self.label_font_family = family.into();
        self
    }

    /// The default color table with this configuration's overrides.
    pub fn color_table(&self) -> ColorTable {
        ColorTable::with_overrides(&self.colors)
    }
}
