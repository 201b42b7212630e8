use crate::{
    config::model::Config,
    foundation::core::{FrameIndex, Offset, padded_number},
    foundation::error::{DollError, DollResult},
    foundation::math::lcm_all,
    generate::combination::Combination,
};

/// Frame schedule of one item: how many output frames it has and which sub-frame and
/// offset every layer uses in each of them.
///
/// Each layer cycles through the sub-frames of its selected item (item `frames`, else layer
/// `frames`, else 1). With more than one animation entry, the entry count joins the cycle.
/// The total is the LCM of all those counts, so every cycle ends in phase 0 and the output
/// loops seamlessly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePlan {
    layer_frames: Vec<u64>,
    animation_entries: usize,
    total_frames: u64,
}

/// What to draw for one layer in one output frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerSelection<'a> {
    /// Layer position (paint order).
    pub layer: usize,
    /// Component folder holding the file.
    pub folder: &'a str,
    /// Selected item index.
    pub item: usize,
    /// Layer suffix, if any.
    pub suffix: Option<&'a str>,
    /// 0-based sub-frame, `None` when the layer is not animated.
    pub sub_frame: Option<u64>,
    /// Offset from the active animation entry.
    pub offset: Offset,
}

impl LayerSelection<'_> {
    /// Expected file name: `NN[-suffix][-FF].png`, numbers 1-based and two-digit padded.
    pub fn file_name(&self) -> String {
        let mut name = padded_number(self.item as u64);
        if let Some(suffix) = self.suffix {
            name.push('-');
            name.push_str(suffix);
        }
        if let Some(f) = self.sub_frame {
            name.push('-');
            name.push_str(&padded_number(f));
        }
        name.push_str(".png");
        name
    }
}

impl FramePlan {
    /// Schedule `combination` under a prepared `config`.
    pub fn new(config: &Config, combination: &Combination) -> DollResult<Self> {
        let layer_frames = config
            .layers
            .iter()
            .map(|layer| {
                let item = combination.item(&config.components, layer.component);
                u64::from(item.frames.or(layer.frames).unwrap_or(1))
            })
            .collect();
        Self::from_counts(layer_frames, config.animations.len(), config.animation)
    }

    /// Schedule from raw per-layer frame counts.
    ///
    /// A cycle longer than `u64::MAX` frames is a configuration error.
    pub fn from_counts(
        layer_frames: Vec<u64>,
        animation_entries: usize,
        animate: bool,
    ) -> DollResult<Self> {
        let total_frames = if animate {
            let mut terms = layer_frames.clone();
            if animation_entries > 1 {
                terms.push(animation_entries as u64);
            }
            lcm_all(terms)
                .ok_or_else(|| {
                    DollError::config(format!(
                        "animation cycle of frame counts {layer_frames:?} overflows u64"
                    ))
                })?
                .max(1)
        } else {
            1
        };

        Ok(Self {
            layer_frames,
            animation_entries,
            total_frames,
        })
    }

    /// Number of output frames.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Per-layer sub-frame counts.
    pub fn layer_frames(&self) -> &[u64] {
        &self.layer_frames
    }

    /// Sub-frame of `layer` at `frame`; `None` for single-frame layers.
    pub fn sub_frame(&self, layer: usize, frame: FrameIndex) -> Option<u64> {
        let fc = self.layer_frames.get(layer).copied().unwrap_or(1);
        (fc > 1).then(|| frame.0 % fc)
    }

    /// Index of the animation entry active at `frame`, if any entries exist.
    pub fn animation_entry(&self, frame: FrameIndex) -> Option<usize> {
        (self.animation_entries > 0).then(|| (frame.0 % self.animation_entries as u64) as usize)
    }

    /// Per-layer selections for `frame`, in paint order.
    pub fn frame<'a>(
        &self,
        config: &'a Config,
        combination: &Combination,
        frame: FrameIndex,
    ) -> Vec<LayerSelection<'a>> {
        let mut offsets = vec![Offset::ZERO; config.layers.len()];
        if let Some(entry) = self
            .animation_entry(frame)
            .and_then(|i| config.animations.get(i))
        {
            for t in &entry.translates {
                if let Some(slot) = offsets.get_mut(t.layer) {
                    *slot = Offset::new(t.x, t.y);
                }
            }
        }

        config
            .layers
            .iter()
            .enumerate()
            .map(|(i, layer)| LayerSelection {
                layer: i,
                folder: config.components[layer.component].folder.as_str(),
                item: combination.parts()[layer.component],
                suffix: layer.suffix.as_deref(),
                sub_frame: self.sub_frame(i, frame),
                offset: offsets[i],
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/frames.rs"]
mod tests;
