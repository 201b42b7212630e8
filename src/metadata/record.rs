use std::path::Path;

use anyhow::Context;

use crate::{
    config::model::{Component, MetadataTemplate},
    foundation::error::{DollError, DollResult},
    generate::combination::Combination,
};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One `{trait_type, value}` pair.
pub struct Attribute {
    /// Component trait type.
    pub trait_type: String,
    /// Selected item's trait value.
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Per-item descriptive record.
pub struct Metadata {
    /// Item name.
    pub name: String,
    /// Copied from the template.
    pub description: String,
    /// Image URI.
    pub image: String,
    /// 1-based item id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Copied from the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Selected item index per component; replay mode rebuilds combinations from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<usize>>,
    /// Attributes of items that define a trait value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
}

/// Attributes for `combination`, in component order.
///
/// Items without a `trait_value` are skipped.
pub fn extract_attributes(components: &[Component], combination: &Combination) -> Vec<Attribute> {
    components
        .iter()
        .zip(combination.parts())
        .filter_map(|(c, &i)| {
            let value = c.items.get(i)?.trait_value.as_ref()?;
            Some(Attribute {
                trait_type: c.trait_type.clone(),
                value: value.clone(),
            })
        })
        .collect()
}

/// Build the record for item `id` from the master template.
pub fn build_metadata(
    template: &MetadataTemplate,
    components: &[Component],
    id: u64,
    combination: &Combination,
) -> Metadata {
    let id_str = id.to_string();
    let name = if template.name.contains("{}") {
        template.name.replace("{}", &id_str)
    } else {
        format!("{} #{id}", template.name)
    };

    Metadata {
        name,
        description: template.description.clone(),
        image: template.image.replace("{}", &id_str),
        id: Some(id),
        source: template.source.clone(),
        parts: Some(combination.parts().to_vec()),
        attributes: Some(extract_attributes(components, combination)),
    }
}

/// Read a JSON array of [`Metadata`] records.
pub fn load_metadata(path: &Path) -> DollResult<Vec<Metadata>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read metadata '{}'", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| DollError::serde(format!("parse metadata '{}': {e}", path.display())))
}

/// Write `value` as compact JSON to `path`.
pub fn save_json<T: serde::Serialize + ?Sized>(value: &T, path: &Path) -> DollResult<()> {
    let text = serde_json::to_string(value)
        .map_err(|e| DollError::serde(format!("serialize '{}': {e}", path.display())))?;
    std::fs::write(path, text).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/metadata/record.rs"]
mod tests;
