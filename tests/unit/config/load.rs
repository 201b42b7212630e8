use super::*;
use crate::testing::temp_dir;

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"png").unwrap();
}

#[test]
fn auto_discovery_without_config_file() {
    let tmp = temp_dir("load_auto_discovery");
    let data = tmp.join("data");
    touch(&data.join("background/01.png"));
    touch(&data.join("background/02.PNG"));
    touch(&data.join("background/04.png"));
    touch(&data.join("hat/01-01.png"));
    touch(&data.join("hat/01-02.png"));
    touch(&data.join("hat/01-03.png"));

    let config = load_config(&tmp.join("config.yaml"), &data).unwrap();
    assert_eq!(config.count, 100);
    let folders: Vec<&str> = config.layers.iter().map(|l| l.folder.as_str()).collect();
    assert_eq!(folders, vec!["background", "hat"]);

    let bg = &config.components[0];
    assert_eq!(bg.trait_type, "background");
    assert_eq!(bg.items.len(), 2, "probing stops at the first gap");
    assert_eq!(bg.items[1].trait_value.as_deref(), Some("background #2"));
    assert_eq!(bg.items[0].frames, None);

    let hat = &config.components[1];
    assert_eq!(hat.items.len(), 1);
    assert_eq!(hat.items[0].frames, Some(3));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn shared_folder_splits_frames_across_layers() {
    let tmp = temp_dir("load_shared_folder");
    let data = tmp.join("data");
    for name in [
        "01-back-01.png",
        "01-back-02.png",
        "01-front-01.png",
        "01-front-02.png",
    ] {
        touch(&data.join("hair").join(name));
    }
    let layers = vec![
        Layer::new("hair").with_suffix("back"),
        Layer::new("hair").with_suffix("front"),
    ];

    let components = discover_components(&data, &layers).unwrap();
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].items[0].frames, Some(2));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn yaml_config_is_loaded_and_kept() {
    let tmp = temp_dir("load_yaml");
    let path = tmp.join("config.yaml");
    std::fs::write(
        &path,
        r#"
count: 7
animation: true
seed: 9
components:
  - trait_type: Hat
    folder: hat
    items:
      - { trait_value: Red, weight: 3 }
layers:
  - folder: hat
animations:
  - translates:
      - { folder: hat, x: 2, y: 3 }
  - {}
"#,
    )
    .unwrap();

    let mut config = load_config(&path, &tmp.join("data")).unwrap();
    config.prepare().unwrap();
    assert_eq!(config.count, 7);
    assert!(config.animation);
    assert_eq!(config.seed, Some(9));
    assert_eq!(config.animations.len(), 2);
    assert_eq!(config.animations[0].translates[0].x, 2);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn malformed_yaml_is_serde_error() {
    let tmp = temp_dir("load_bad_yaml");
    let path = tmp.join("config.yaml");
    std::fs::write(&path, "count: [1, 2").unwrap();
    let err = load_config(&path, &tmp).unwrap_err();
    assert!(matches!(err, DollError::Serde(_)));
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn export_round_trips_through_yaml() {
    let tmp = temp_dir("load_export");
    let mut config = crate::testing::doll_config();
    config.count = 2;
    let path = tmp.join("exported.yaml");
    export_config(&config, &path).unwrap();

    let mut loaded = load_config(&path, &tmp).unwrap();
    loaded.prepare().unwrap();
    assert_eq!(loaded.count, 2);
    assert_eq!(loaded.components, config.components);
    assert_eq!(loaded.layers, config.layers);

    std::fs::remove_dir_all(&tmp).ok();
}
