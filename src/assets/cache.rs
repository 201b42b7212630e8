use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::Context;
use tracing::debug;

use crate::foundation::{
    error::{DollError, DollResult},
    math::mul_div255_u8,
};

#[derive(Clone, Debug)]
/// Decoded layer raster in premultiplied RGBA8 form.
pub struct LayerImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> DollResult<LayerImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(LayerImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = mul_div255_u8(u16::from(px[0]), a);
        px[1] = mul_div255_u8(u16::from(px[1]), a);
        px[2] = mul_div255_u8(u16::from(px[2]), a);
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    images: HashMap<PathBuf, LayerImage>,
    decodes: HashMap<PathBuf, u64>,
}

/// Process-lifetime decode cache keyed by resolved file path.
///
/// Entries are never evicted or replaced, so a reader never sees a stale image. Lookups and
/// inserts are serialized by a mutex; decoding itself runs outside the lock so that
/// concurrent loads of different files proceed in parallel.
#[derive(Debug, Default)]
pub struct ImageCache {
    inner: Mutex<CacheInner>,
}

impl ImageCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached decode of `path`, reading and decoding it on first use.
    pub fn get_or_load(&self, path: &Path) -> DollResult<LayerImage> {
        if let Some(hit) = self.lock()?.images.get(path) {
            debug!(path = %path.display(), "image cache hit");
            return Ok(hit.clone());
        }

        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        let decoded = decode_image(&bytes)
            .map_err(|e| DollError::Other(anyhow::anyhow!("{e} ('{}')", path.display())))?;

        let mut inner = self.lock()?;
        *inner.decodes.entry(path.to_path_buf()).or_default() += 1;
        let kept = inner
            .images
            .entry(path.to_path_buf())
            .or_insert(decoded)
            .clone();
        Ok(kept)
    }

    /// How many times `path` was decoded.
    pub fn decode_count(&self, path: &Path) -> DollResult<u64> {
        Ok(self.lock()?.decodes.get(path).copied().unwrap_or(0))
    }

    /// Number of cached images.
    pub fn len(&self) -> DollResult<usize> {
        Ok(self.lock()?.images.len())
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> DollResult<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> DollResult<std::sync::MutexGuard<'_, CacheInner>> {
        self.inner
            .lock()
            .map_err(|_| DollError::Other(anyhow::anyhow!("image cache lock poisoned")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
