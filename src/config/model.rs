use std::collections::HashMap;

use crate::foundation::error::{DollError, DollResult};

fn default_count() -> u64 {
    100
}

fn default_weight() -> u32 {
    1
}

fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Fully resolved generation config.
///
/// A config is plain data that can be:
/// - loaded from YAML (see [`crate::load_config`]), with auto-discovery filling gaps
/// - built programmatically in tests
///
/// Call [`Config::prepare`] exactly once before generating. It validates the config and
/// back-fills the cross-reference indices (`Item::index`, `Layer::component`,
/// `Translation::layer`, `Selector::component`), which are never serialized.
pub struct Config {
    /// Number of items to generate when neither `--count` nor replayed parts say otherwise.
    #[serde(default = "default_count")]
    pub count: u64,
    /// Render every item as an LCM-cycled frame sequence.
    #[serde(default, skip_serializing_if = "is_false")]
    pub animation: bool,
    /// Seed for the sampler RNG. Entropy-seeded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Template for per-item metadata records. No records are built without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataTemplate>,
    /// Repeating animation cycle entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<AnimationEntry>,
    /// Trait categories, in combination order.
    #[serde(default)]
    pub components: Vec<Component>,
    /// Paint steps, bottom to top.
    #[serde(default)]
    pub layers: Vec<Layer>,
    /// Declarative overrides applied to every sampled combination.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            count: default_count(),
            animation: false,
            seed: None,
            metadata: None,
            animations: vec![],
            components: vec![],
            layers: vec![],
            rules: vec![],
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A trait category contributing exactly one item to every combination.
pub struct Component {
    /// Attribute name emitted in metadata.
    pub trait_type: String,
    /// Data sub-directory holding this component's layer files. Also its stable key.
    pub folder: String,
    /// Choices, in file-number order.
    pub items: Vec<Item>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One concrete choice within a [`Component`].
pub struct Item {
    /// Attribute value; items without one contribute no attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trait_value: Option<String>,
    /// Relative selection weight.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Animation sub-frames of this item. Overrides the layer default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<u32>,
    /// 0-based position within the component (back-filled).
    #[serde(skip)]
    pub index: usize,
}

impl Item {
    /// Convenience constructor used by auto-discovery and tests.
    pub fn new(trait_value: Option<&str>, weight: u32) -> Self {
        Self {
            trait_value: trait_value.map(str::to_string),
            weight,
            frames: None,
            index: 0,
        }
    }

    /// Builder-style setter for [`Item::frames`].
    pub fn with_frames(mut self, frames: u32) -> Self {
        self.frames = Some(frames);
        self
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A paint step drawing the selected item of one component.
pub struct Layer {
    /// Folder of the referenced component.
    pub folder: String,
    /// File-name suffix (`01-<suffix>.png`); lets several layers share one component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    /// Default sub-frame count for items that do not set their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<u32>,
    /// Index of the referenced component (back-filled).
    #[serde(skip)]
    pub component: usize,
}

impl Layer {
    /// Layer for `folder` without suffix or frame default.
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            suffix: None,
            frames: None,
            component: 0,
        }
    }

    /// Builder-style setter for [`Layer::suffix`].
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// One point in the repeating animation cycle.
pub struct AnimationEntry {
    /// Optional label for authoring/debugging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Per-layer offsets active at this point.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub translates: Vec<Translation>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Pixel offset for the layer matching `folder` + `suffix`.
pub struct Translation {
    /// Folder of the target layer.
    pub folder: String,
    /// Suffix of the target layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    /// Horizontal offset in pixels.
    #[serde(default)]
    pub x: i32,
    /// Vertical offset in pixels.
    #[serde(default)]
    pub y: i32,
    /// Index of the target layer (back-filled).
    #[serde(skip)]
    pub layer: usize,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Master record every per-item metadata record is derived from.
pub struct MetadataTemplate {
    /// Item name; `{}` is replaced by the id, otherwise ` #<id>` is appended.
    pub name: String,
    /// Copied verbatim.
    pub description: String,
    /// Image URI template; `{}` is replaced by the id.
    pub image: String,
    /// Copied verbatim when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// When every `when` selector matches the sampled combination, apply every `then` selector.
pub struct Rule {
    /// Conditions, all of which must hold.
    pub when: Vec<Selector>,
    /// Assignments applied when the rule fires.
    pub then: Vec<Selector>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A (component, item index) pair addressed by folder.
pub struct Selector {
    /// Folder of the component.
    pub folder: String,
    /// 0-based item index within the component.
    pub index: usize,
    /// Index of the component (back-filled).
    #[serde(skip)]
    pub component: usize,
}

impl Config {
    /// Validate the config, then back-fill all cross-reference indices.
    pub fn prepare(&mut self) -> DollResult<()> {
        self.validate()?;
        self.fill_index()
    }

    /// Check structural invariants that do not depend on cross-references.
    pub fn validate(&self) -> DollResult<()> {
        if self.components.is_empty() {
            return Err(DollError::config("config has no components"));
        }
        if self.layers.is_empty() {
            return Err(DollError::config("config has no layers"));
        }

        for c in &self.components {
            if c.items.is_empty() {
                return Err(DollError::config(format!(
                    "component '{}' has no items",
                    c.folder
                )));
            }
            let total: u64 = c.items.iter().map(|i| u64::from(i.weight)).sum();
            if total == 0 {
                return Err(DollError::config(format!(
                    "component '{}' has zero total weight",
                    c.folder
                )));
            }
            if c.items.iter().any(|i| i.frames == Some(0)) {
                return Err(DollError::config(format!(
                    "component '{}' has an item with frames: 0",
                    c.folder
                )));
            }
        }

        for layer in &self.layers {
            if layer.frames == Some(0) {
                return Err(DollError::config(format!(
                    "layer '{}' has frames: 0",
                    layer.folder
                )));
            }
        }

        Ok(())
    }

    /// Resolve folder references into indices and number every item by position.
    pub fn fill_index(&mut self) -> DollResult<()> {
        let mut folder_index = HashMap::<String, usize>::new();
        for (ci, c) in self.components.iter_mut().enumerate() {
            if folder_index.insert(c.folder.clone(), ci).is_some() {
                return Err(DollError::config(format!(
                    "duplicate component folder '{}'",
                    c.folder
                )));
            }
            for (ii, item) in c.items.iter_mut().enumerate() {
                item.index = ii;
            }
        }

        let lookup = |folder: &str| {
            folder_index
                .get(folder)
                .copied()
                .ok_or_else(|| DollError::config(format!("unknown folder '{folder}'")))
        };

        for layer in &mut self.layers {
            layer.component = lookup(&layer.folder)?;
        }

        for entry in &mut self.animations {
            for t in &mut entry.translates {
                t.layer = self
                    .layers
                    .iter()
                    .position(|l| l.folder == t.folder && l.suffix == t.suffix)
                    .ok_or_else(|| {
                        DollError::config(format!(
                            "translation targets no layer (folder '{}', suffix {:?})",
                            t.folder, t.suffix
                        ))
                    })?;
            }
        }

        for rule in &mut self.rules {
            for s in rule.when.iter_mut().chain(rule.then.iter_mut()) {
                s.component = lookup(&s.folder)?;
                let len = self.components[s.component].items.len();
                if s.index >= len {
                    return Err(DollError::config(format!(
                        "rule selects item {} of '{}' which has {len} items",
                        s.index, s.folder
                    )));
                }
            }
        }

        Ok(())
    }

    /// Total number of distinct combinations (saturating).
    pub fn combination_space(&self) -> u64 {
        self.components
            .iter()
            .fold(1u64, |acc, c| acc.saturating_mul(c.items.len() as u64))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
