//! Conversion between `image` buffers and tiny-skia pixmaps.
//!
//! `RgbaImage` stores straight alpha, `Pixmap` premultiplied alpha.

use crate::color::Rgba;
use crate::error::{Error, Result};
use image::RgbaImage;
use std::path::Path;
use tiny_skia::{ColorU8, Pixmap};

/// Allocate a pixmap, mapping failure to [`Error::Canvas`].
pub fn new_pixmap(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height).ok_or(Error::Canvas { width, height })
}

/// Copy an image into a new pixmap.
pub fn to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let mut pixmap = new_pixmap(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Copy a pixmap into a new image.
pub fn to_image(pixmap: &Pixmap) -> Result<RgbaImage> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for p in pixmap.pixels() {
        let c = p.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data).ok_or_else(|| {
        Error::Image(format!(
            "buffer does not match {}x{}",
            pixmap.width(),
            pixmap.height()
        ))
    })
}

/// An image of the given size filled with `color`.
pub fn blank(width: u32, height: u32, color: Rgba) -> RgbaImage {
    RgbaImage::from_pixel(width, height, image::Rgba([color.r, color.g, color.b, color.a]))
}

/// Decode an image file (PNG, JPEG or TIFF) into RGBA.
pub fn load(path: impl AsRef<Path>) -> Result<RgbaImage> {
    let path = path.as_ref();
    let decoded =
        image::open(path).map_err(|e| Error::Image(format!("{}: {}", path.display(), e)))?;
    Ok(decoded.to_rgba8())
}

/// Encode an image; the format follows the file extension.
pub fn save(image: &RgbaImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    image
        .save(path)
        .map_err(|e| Error::Image(format!("{}: {}", path.display(), e)))
}
