use std::{collections::HashMap, path::Path};

use anyhow::Context;
use tracing::info;

use crate::{
    assets::scan::{glob_case_insensitive, list_subdirs},
    config::model::{Component, Config, Item, Layer},
    foundation::core::padded_number,
    foundation::error::{DollError, DollResult},
};

/// Highest item number probed during auto-discovery.
const MAX_DISCOVERED_ITEMS: u64 = 899;

/// Load `config_path` (YAML) if it exists, then auto-discover whatever it leaves empty.
///
/// - no `layers`: every sub-directory of `data_dir` becomes a layer, sorted by name
/// - no `components`: every distinct layer folder becomes a component whose items are found
///   by probing `NN.png` / `NN-*.png` from `01` until the first missing number
///
/// The returned config is not yet prepared.
pub fn load_config(config_path: &Path, data_dir: &Path) -> DollResult<Config> {
    let mut config = if config_path.exists() {
        let text = std::fs::read_to_string(config_path)
            .with_context(|| format!("read config '{}'", config_path.display()))?;
        serde_yaml_ng::from_str::<Config>(&text).map_err(|e| {
            DollError::serde(format!("parse config '{}': {e}", config_path.display()))
        })?
    } else {
        info!(
            "no {} found, using auto-discovery mode",
            config_path.display()
        );
        Config::default()
    };

    if config.layers.is_empty() {
        config.layers = discover_layers(data_dir)?;
        let folders: Vec<&str> = config.layers.iter().map(|l| l.folder.as_str()).collect();
        info!(
            "{} folders detected ({})",
            folders.len(),
            folders.join(", ")
        );
    }

    if config.components.is_empty() {
        info!("auto-discovering components");
        config.components = discover_components(data_dir, &config.layers)?;
    }

    Ok(config)
}

/// Serialize `config` as YAML to `path`.
pub fn export_config(config: &Config, path: &Path) -> DollResult<()> {
    let text = serde_yaml_ng::to_string(config)
        .map_err(|e| DollError::serde(format!("serialize config: {e}")))?;
    std::fs::write(path, text).with_context(|| format!("write config '{}'", path.display()))?;
    Ok(())
}

/// One layer per sub-directory of `data_dir`.
pub fn discover_layers(data_dir: &Path) -> DollResult<Vec<Layer>> {
    Ok(list_subdirs(data_dir)?
        .into_iter()
        .map(Layer::new)
        .collect())
}

/// One component per distinct layer folder, in first-use order.
pub fn discover_components(data_dir: &Path, layers: &[Layer]) -> DollResult<Vec<Component>> {
    let mut layers_per_folder = HashMap::<&str, u64>::new();
    for layer in layers {
        *layers_per_folder.entry(layer.folder.as_str()).or_default() += 1;
    }

    let mut components = Vec::<Component>::new();
    for layer in layers {
        let folder = layer.folder.as_str();
        if components.iter().any(|c| c.folder == folder) {
            continue;
        }

        let dir = data_dir.join(folder);
        let sharing = layers_per_folder.get(folder).copied().unwrap_or(1);
        let mut items = Vec::new();
        for n in 0..MAX_DISCOVERED_ITEMS {
            let number = padded_number(n);
            let mut files = glob_case_insensitive(&dir, &format!("{number}.png"))?;
            files.extend(glob_case_insensitive(&dir, &format!("{number}-*.png"))?);
            if files.is_empty() {
                break;
            }

            let frames = (files.len() as u64).div_ceil(sharing);
            let label = format!("{folder} #{}", n + 1);
            let mut item = Item::new(Some(&label), 1);
            if frames > 1 {
                item.frames = Some(u32::try_from(frames).unwrap_or(u32::MAX));
            }
            items.push(item);
        }

        info!("folder {folder} {} items", items.len());
        components.push(Component {
            trait_type: folder.to_string(),
            folder: folder.to_string(),
            items,
        });
    }

    Ok(components)
}

#[cfg(test)]
#[path = "../../tests/unit/config/load.rs"]
mod tests;
