//! Dollforge generates collections of unique layered doll images.
//!
//! A run samples one item per component from weighted pools, rejecting combinations already
//! emitted, then composites the matching PNG layers into one image per id. Layers with
//! multiple frames animate together over the least common multiple of their frame counts.
//!
//! - Load a [`Config`] with [`load_config`] and [`Config::prepare`] it
//! - Create a [`RunSession`]
//! - [`RunSession::run`] a range of ids and persist the [`RunReport`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod foundation;
mod generate;
mod metadata;
mod render;
mod schedule;
mod session;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
mod testing;

pub use crate::assets::cache::{ImageCache, LayerImage, decode_image};
pub use crate::assets::scan::{glob_case_insensitive, list_subdirs};
pub use crate::config::hook::{OverrideHook, RuleHook};
pub use crate::config::load::{discover_components, discover_layers, export_config, load_config};
pub use crate::config::model::{
    AnimationEntry, Component, Config, Item, Layer, MetadataTemplate, Rule, Selector, Translation,
};
pub use crate::foundation::core::{Canvas, FrameIndex, Offset};
pub use crate::foundation::error::{DollError, DollResult};
pub use crate::foundation::math::{gcd, lcm, lcm_all};
pub use crate::generate::combination::{
    Combination, CombinationGenerator, FALLBACK_SCAN_LIMIT, GeneratedSet, MAX_ATTEMPTS,
    replay_combinations, sequential_combination, sequential_combinations,
};
pub use crate::generate::sampler::{Weighted, pick_weighted, pick_weighted_index};
pub use crate::metadata::record::{
    Attribute, Metadata, build_metadata, extract_attributes, load_metadata, save_json,
};
pub use crate::render::composite::{PlacedLayer, PremulRgba8, Raster, draw_over, merge_layers, over};
pub use crate::render::pipeline::{
    RenderContext, RenderStats, output_path, render_frame, render_item,
};
pub use crate::render::resolve::resolve_layer_file;
pub use crate::schedule::frames::{FramePlan, LayerSelection};
pub use crate::session::run::{OccurrenceTable, PartsSource, RunOptions, RunReport, RunSession};
