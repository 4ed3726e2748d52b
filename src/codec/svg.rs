//! SVG rasterization.
//!
//! Vector sources are rendered oversampled (300 DPI against the 96-per-inch
//! CSS default, rounded to a whole factor) and then downscaled, so the final
//! bitmap comes from a sharp render instead of an upscaled one. The target
//! size is fixed before rendering: the viewport is fitted inside the
//! requested box first and the render surface is an exact integer multiple
//! of that fit, so the downscale lands precisely on the fitted size with the
//! aspect ratio intact.

use crate::config::Dimensions;
use crate::error::ConvertError;
use image::{DynamicImage, RgbaImage};
use resvg::tiny_skia;
use resvg::usvg;
use tracing::debug;

/// Rasterization density in dots per inch.
const DENSITY_DPI: f32 = 300.0;

/// SVG units per inch, per CSS.
const SVG_UNITS_PER_INCH: f32 = 96.0;

/// Largest size with the same aspect ratio that fits inside `dims`.
fn fit_inside(width: f32, height: f32, dims: Dimensions) -> (u32, u32) {
    let ratio = f32::min(
        dims.width as f32 / width,
        dims.height as f32 / height,
    );
    let w = (width * ratio).round().max(1.0) as u32;
    let h = (height * ratio).round().max(1.0) as u32;
    (w, h)
}

/// Parse and render an SVG document to an RGBA image fitted inside `dims`,
/// preserving aspect ratio.
///
/// Malformed documents, zero-sized viewports, and renders too large to
/// allocate are all surfaced as [`ConvertError::Codec`].
pub fn rasterize(data: &[u8], dims: Dimensions) -> Result<DynamicImage, ConvertError> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default())
        .map_err(ConvertError::codec)?;

    // usvg guarantees a positive viewport size.
    let size = tree.size();
    let (fit_w, fit_h) = fit_inside(size.width(), size.height(), dims);
    let oversample = (DENSITY_DPI / SVG_UNITS_PER_INCH).round().max(1.0) as u32;
    let (render_w, render_h) = (fit_w * oversample, fit_h * oversample);

    let mut pixmap = tiny_skia::Pixmap::new(render_w, render_h)
        .ok_or_else(|| ConvertError::codec("SVG render surface too large"))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(
            render_w as f32 / size.width(),
            render_h as f32 / size.height(),
        ),
        &mut pixmap.as_mut(),
    );
    debug!(render_w, render_h, fit_w, fit_h, "rasterized SVG");

    // tiny-skia stores premultiplied RGBA; undo that before handing the
    // pixels to the image crate.
    let mut raw = Vec::with_capacity(render_w as usize * render_h as usize * 4);
    for px in pixmap.pixels() {
        let px = px.demultiply();
        raw.extend_from_slice(&[px.red(), px.green(), px.blue(), px.alpha()]);
    }
    let rgba = RgbaImage::from_raw(render_w, render_h, raw)
        .ok_or_else(|| ConvertError::codec("SVG pixel buffer size mismatch"))?;

    let img = DynamicImage::ImageRgba8(rgba);
    Ok(super::raster::resize_to_fit(&img, dims))
}
