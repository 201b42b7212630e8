use std::path::Path;

use anyhow::Context;
use tracing::warn;

use crate::{
    assets::cache::LayerImage,
    foundation::core::{Canvas, Offset},
    foundation::error::{DollError, DollResult},
    foundation::math::mul_div255_u16,
};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Merged output raster in premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8.
    pub data: Vec<u8>,
}

/// A decoded layer and where to draw it.
#[derive(Clone, Debug)]
pub struct PlacedLayer {
    /// Source raster.
    pub image: LayerImage,
    /// Top-left position on the output.
    pub offset: Offset,
}

impl Raster {
    /// Fully transparent raster.
    pub fn transparent(canvas: Canvas) -> Self {
        let len = canvas.width as usize * canvas.height as usize * 4;
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; len],
        }
    }

    /// Pixel at `(x, y)`, premultiplied.
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Straight-alpha copy of the pixel data, as PNG expects.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    /// Encode as PNG at `path`.
    pub fn save_png(&self, path: &Path) -> DollResult<()> {
        image::save_buffer_with_format(
            path,
            &self.to_straight_rgba8(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = (u16::from(src[i]) + dc).min(255) as u8;
    }
    out
}

/// Draw `src` onto `dst` at `offset`, clipping to `dst`.
pub fn draw_over(dst: &mut Raster, src: &LayerImage, offset: Offset) {
    let dw = i64::from(dst.width);
    let dh = i64::from(dst.height);
    let sw = src.width as usize;

    for sy in 0..i64::from(src.height) {
        let ty = sy + i64::from(offset.y);
        if ty < 0 || ty >= dh {
            continue;
        }
        for sx in 0..i64::from(src.width) {
            let tx = sx + i64::from(offset.x);
            if tx < 0 || tx >= dw {
                continue;
            }
            let si = (sy as usize * sw + sx as usize) * 4;
            let di = (ty as usize * dst.width as usize + tx as usize) * 4;
            let s = &src.rgba8_premul[si..si + 4];
            let d = &mut dst.data[di..di + 4];
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
}

/// Merge `layers` in paint order onto a canvas sized like the first layer.
///
/// A layer whose size differs from the first one is drawn as-is, with a warning.
pub fn merge_layers(layers: &[PlacedLayer]) -> DollResult<Raster> {
    let first = layers
        .first()
        .ok_or_else(|| DollError::config("nothing to composite: no layers"))?;
    let canvas = Canvas {
        width: first.image.width,
        height: first.image.height,
    };

    let mut out = Raster::transparent(canvas);
    for (i, layer) in layers.iter().enumerate() {
        if layer.image.width != canvas.width || layer.image.height != canvas.height {
            warn!(
                layer = i,
                expected = %format!("{}x{}", canvas.width, canvas.height),
                actual = %format!("{}x{}", layer.image.width, layer.image.height),
                "dimension mismatch detected"
            );
        }
        draw_over(&mut out, &layer.image, layer.offset);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
