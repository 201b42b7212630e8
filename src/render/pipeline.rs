use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    assets::cache::ImageCache,
    config::model::Config,
    foundation::core::{FrameIndex, padded_number},
    foundation::error::DollResult,
    generate::combination::Combination,
    render::composite::{PlacedLayer, Raster, merge_layers},
    render::resolve::resolve_layer_file,
    schedule::frames::FramePlan,
};

/// Everything a render needs besides the combination itself.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    /// Prepared config.
    pub config: &'a Config,
    /// Root holding one sub-directory per component folder.
    pub data_dir: &'a Path,
    /// Output root.
    pub out_dir: &'a Path,
    /// Shared decode cache.
    pub cache: &'a ImageCache,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Counters for one rendered item.
pub struct RenderStats {
    /// Frames in the item's cycle.
    pub frames_total: u64,
    /// PNG files written.
    pub files_written: u64,
}

/// Output file for `frame` of item `id`.
///
/// `<out>/<id>.png` without animation, `<out>/<id>/<frame+1:02>.png` with it.
pub fn output_path(out_dir: &Path, id: u64, animate: bool, frame: FrameIndex) -> PathBuf {
    if animate {
        out_dir
            .join(id.to_string())
            .join(format!("{}.png", padded_number(frame.0)))
    } else {
        out_dir.join(format!("{id}.png"))
    }
}

/// Resolve, load and merge every layer of one frame.
///
/// Layer files are loaded in parallel; compositing starts once all of them are available.
pub fn render_frame(
    ctx: &RenderContext<'_>,
    plan: &FramePlan,
    combination: &Combination,
    frame: FrameIndex,
) -> DollResult<Raster> {
    let selections = plan.frame(ctx.config, combination, frame);
    let layers = selections
        .par_iter()
        .map(|s| -> DollResult<PlacedLayer> {
            let path = resolve_layer_file(ctx.data_dir, s)?;
            let image = ctx.cache.get_or_load(&path)?;
            Ok(PlacedLayer {
                image,
                offset: s.offset,
            })
        })
        .collect::<DollResult<Vec<_>>>()?;
    merge_layers(&layers)
}

/// Render all frames of item `id` in frame order and write them to disk.
#[tracing::instrument(skip(ctx, combination), fields(key = %combination.key()))]
pub fn render_item(
    ctx: &RenderContext<'_>,
    id: u64,
    combination: &Combination,
) -> DollResult<RenderStats> {
    let plan = FramePlan::new(ctx.config, combination)?;
    let animate = ctx.config.animation;
    debug!(
        frames = plan.total_frames(),
        layer_frames = ?plan.layer_frames(),
        "frame plan"
    );

    if animate {
        let dir = ctx.out_dir.join(id.to_string());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
    }

    let mut stats = RenderStats {
        frames_total: plan.total_frames(),
        files_written: 0,
    };
    for f in 0..plan.total_frames() {
        let frame = FrameIndex(f);
        let raster = render_frame(ctx, &plan, combination, frame)?;
        raster.save_png(&output_path(ctx.out_dir, id, animate, frame))?;
        stats.files_written += 1;
    }
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
