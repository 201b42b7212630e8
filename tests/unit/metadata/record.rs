use super::*;
use crate::testing::{component, temp_dir};

fn template() -> MetadataTemplate {
    MetadataTemplate {
        name: "Doll".to_string(),
        description: "hand made".to_string(),
        image: "ipfs://cid/{}.png".to_string(),
        source: Some("https://example.invalid".to_string()),
    }
}

#[test]
fn attributes_skip_items_without_trait_value() {
    let components = vec![
        component("Background", "background", &[(Some("Blue"), 1), (None, 1)]),
        component("Hat", "hat", &[(Some("Red"), 1)]),
    ];

    let attrs = extract_attributes(&components, &Combination::new(vec![1, 0]));
    assert_eq!(
        attrs,
        vec![Attribute {
            trait_type: "Hat".to_string(),
            value: "Red".to_string(),
        }]
    );

    let attrs = extract_attributes(&components, &Combination::new(vec![0, 0]));
    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs[0].trait_type, "Background");
    assert_eq!(attrs[0].value, "Blue");
}

#[test]
fn build_interpolates_id() {
    let hat = component("Hat", "hat", &[(Some("Red"), 1), (Some("Blue"), 1)]);
    let components = vec![hat];
    let record = build_metadata(&template(), &components, 42, &Combination::new(vec![1]));

    assert_eq!(record.name, "Doll #42");
    assert_eq!(record.image, "ipfs://cid/42.png");
    assert_eq!(record.description, "hand made");
    assert_eq!(record.source.as_deref(), Some("https://example.invalid"));
    assert_eq!(record.id, Some(42));
    assert_eq!(record.parts, Some(vec![1]));
    assert_eq!(record.attributes.unwrap()[0].value, "Blue");
}

#[test]
fn name_template_token_is_replaced() {
    let mut t = template();
    t.name = "Doll no. {}".to_string();
    let components = vec![component("Hat", "hat", &[(None, 1)])];
    let record = build_metadata(&t, &components, 3, &Combination::new(vec![0]));
    assert_eq!(record.name, "Doll no. 3");
    assert_eq!(record.attributes, Some(vec![]));
}

#[test]
fn json_omits_absent_fields_and_reloads() {
    let tmp = temp_dir("metadata_json");
    let record = Metadata {
        name: "Doll #1".to_string(),
        description: "d".to_string(),
        image: "1.png".to_string(),
        id: Some(1),
        source: None,
        parts: Some(vec![0, 1]),
        attributes: None,
    };

    let json = serde_json::to_string(&record).unwrap();
    assert!(!json.contains("source"));
    assert!(!json.contains("attributes"));

    let path = tmp.join("metadata.json");
    save_json(&[record.clone()], &path).unwrap();
    assert_eq!(load_metadata(&path).unwrap(), vec![record]);

    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(load_metadata(&path), Err(DollError::Serde(_))));

    std::fs::remove_dir_all(&tmp).ok();
}
