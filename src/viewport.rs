//! Mapping between the rendered page image and a zoomed, centred view.
//!
//! The UI shows the rendered image scaled by a logarithmic zoom level and
//! centred in its widget. Pointer positions come back in widget pixels and
//! must be mapped to image pixels before hit-testing the
//! [`RegionMap`](crate::region::RegionMap).

use crate::error::{Error, Result};
use crate::geometry::{Affine, Point};
use std::str::FromStr;

/// Scale `width` x `height` to a target width or height, keeping the
/// aspect ratio.
///
/// With no target the size is unchanged. Asking for both is an error.
///
/// # Examples
///
/// ```
/// use segview::viewport::scaled_size;
///
/// assert_eq!(scaled_size(200, 100, None, Some(50)).unwrap(), (100, 50));
/// assert!(scaled_size(200, 100, Some(10), Some(10)).is_err());
/// ```
pub fn scaled_size(
    width: u32,
    height: u32,
    target_width: Option<u32>,
    target_height: Option<u32>,
) -> Result<(u32, u32)> {
    let scale = match (target_width, target_height) {
        (Some(_), Some(_)) => {
            return Err(Error::Viewport("cannot scale both width and height".to_string()));
        },
        (None, Some(h)) if height > 0 => h as f64 / height as f64,
        (Some(w), None) if width > 0 => w as f64 / width as f64,
        _ => 1.0,
    };
    Ok(((width as f64 * scale) as u32, (height as f64 * scale) as u32))
}

/// Named zoom presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomTarget {
    /// 1:1
    Original,
    /// Fit the page width
    Width,
    /// Fit the page height
    Height,
    /// Show the whole page
    Page,
    /// Fill the whole viewport
    Viewport,
}

impl FromStr for ZoomTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "original" => Ok(ZoomTarget::Original),
            "width" => Ok(ZoomTarget::Width),
            "height" => Ok(ZoomTarget::Height),
            "page" => Ok(ZoomTarget::Page),
            "viewport" => Ok(ZoomTarget::Viewport),
            other => Err(Error::Viewport(format!(
                "zoom target was \"{}\", but needs to be one of \
                 original, width, height, page, viewport",
                other
            ))),
        }
    }
}

/// Logarithmic zoom: the scale factor is `base ^ exponent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLevel {
    base: f64,
    exponent: f64,
    min: f64,
    max: f64,
    step: f64,
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self {
            base: 2.0,
            exponent: 0.0,
            min: -4.0,
            max: 2.0,
            step: 0.1,
        }
    }
}

impl ZoomLevel {
    /// Zoom with a custom base, exponent range and step.
    pub fn new(base: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            base,
            exponent: 0.0_f64.clamp(min, max),
            min,
            max,
            step,
        }
    }

    /// Current exponent.
    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    /// Scale factor.
    pub fn factor(&self) -> f64 {
        self.base.powf(self.exponent)
    }

    /// Set the exponent, clamped to the allowed range.
    pub fn set(&mut self, exponent: f64) {
        self.exponent = exponent.clamp(self.min, self.max);
    }

    /// Zoom in (`steps > 0`) or out (`steps < 0`).
    pub fn zoom_by(&mut self, steps: i32) {
        self.set(self.exponent + steps as f64 * self.step);
    }

    /// Jump to a preset given the fit-to-width and fit-to-height ratios.
    pub fn zoom_to(&mut self, target: ZoomTarget, width_ratio: f64, height_ratio: f64) {
        let ratio = match target {
            ZoomTarget::Original => 1.0,
            ZoomTarget::Width => width_ratio,
            ZoomTarget::Height => height_ratio,
            ZoomTarget::Page => width_ratio.min(height_ratio),
            ZoomTarget::Viewport => width_ratio.max(height_ratio),
        };
        if ratio > 0.0 {
            self.set(ratio.log(self.base));
        }
    }
}

/// Rendered image shown zoomed and centred inside a widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    image_width: u32,
    image_height: u32,
    widget_width: f64,
    widget_height: f64,
    pan: Point,
    zoom: ZoomLevel,
}

impl Viewport {
    /// A 1:1 view of an image in a widget of the same size.
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Self {
            image_width,
            image_height,
            widget_width: image_width as f64,
            widget_height: image_height as f64,
            pan: Point::default(),
            zoom: ZoomLevel::default(),
        }
    }

    /// Set the widget size.
    pub fn with_widget_size(mut self, width: f64, height: f64) -> Self {
        self.widget_width = width;
        self.widget_height = height;
        self
    }

    /// Set the zoom level.
    pub fn with_zoom(mut self, zoom: ZoomLevel) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the pan offset, used when the image is larger than the
    /// widget.
    pub fn with_pan(mut self, x: f64, y: f64) -> Self {
        self.pan = Point::new(x, y);
        self
    }

    /// The zoom level.
    pub fn zoom(&self) -> &ZoomLevel {
        &self.zoom
    }

    /// Mutable zoom level.
    pub fn zoom_mut(&mut self) -> &mut ZoomLevel {
        &mut self.zoom
    }

    /// Fit-to-width and fit-to-height ratios for [`ZoomLevel::zoom_to`].
    pub fn fit_ratios(&self) -> (f64, f64) {
        (
            self.widget_width / self.image_width.max(1) as f64,
            self.widget_height / self.image_height.max(1) as f64,
        )
    }

    /// Size of the image as displayed; the height follows the zoom factor.
    pub fn displayed_size(&self) -> (u32, u32) {
        let height = ((self.zoom.factor() * self.image_height as f64) as u32).max(1);
        scaled_size(self.image_width, self.image_height, None, Some(height))
            .map(|(w, h)| (w.max(1), h.max(1)))
            .unwrap_or((self.image_width, self.image_height))
    }

    /// Image-to-widget transform.
    pub fn transform(&self) -> Affine {
        let (dw, dh) = self.displayed_size();
        let sx = dw as f64 / self.image_width.max(1) as f64;
        let sy = dh as f64 / self.image_height.max(1) as f64;
        let ox = ((self.widget_width - dw as f64) / 2.0).max(0.0) - self.pan.x;
        let oy = ((self.widget_height - dh as f64) / 2.0).max(0.0) - self.pan.y;
        Affine::scale(sx, sy).then(&Affine::translate(ox, oy))
    }

    /// Widget position of an image pixel.
    pub fn image_to_view(&self, p: Point) -> Point {
        self.transform().apply(p)
    }

    /// Image pixel under a widget position, `None` outside the image.
    pub fn view_to_image(&self, p: Point) -> Option<Point> {
        let image = self.transform().invert()?.apply(p);
        let inside = (0.0..=self.image_width as f64).contains(&image.x)
            && (0.0..=self.image_height as f64).contains(&image.y);
        inside.then_some(image)
    }
}
