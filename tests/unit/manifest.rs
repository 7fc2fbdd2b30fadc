use super::*;

const MANIFEST: &str = r#"{
  "chunk": { "x": 3, "z": 7 },
  "textures": ["grass.blp", "rock.blp"],
  "layers": [
    { "texture_id": 0, "flags": 0, "alpha_offset": 0, "effect_id": 0 },
    { "texture_id": 1, "flags": 768, "alpha_offset": 0, "effect_id": 4 }
  ],
  "alpha_file": "chunk.alpha"
}"#;

#[test]
fn parses_without_a_format() {
    let m = ChunkManifest::from_json_str(MANIFEST).unwrap();
    assert_eq!(m.chunk, ChunkId::new(3, 7));
    assert_eq!(m.layers[1].effect_id, 4);
    assert_eq!(m.format, None);
}

#[test]
fn rejects_unknown_texture_ids() {
    let bad = MANIFEST.replace("\"texture_id\": 1", "\"texture_id\": 2");
    let err = ChunkManifest::from_json_str(&bad).unwrap_err();
    assert!(matches!(err, LayerSetError::Validation(_)));
}

#[test]
fn rejects_malformed_json() {
    let err = ChunkManifest::from_json_str("{").unwrap_err();
    assert!(matches!(err, LayerSetError::Serde(_)));
}

#[test]
fn missing_alpha_file_is_an_io_error() {
    let m = ChunkManifest::from_json_str(MANIFEST).unwrap();
    let err = m
        .load_layer_set(Path::new("/nonexistent-layerset-dir"))
        .unwrap_err();
    assert!(matches!(err, LayerSetError::Other(_)));
    assert!(err.to_string().contains("chunk.alpha"), "{err}");
}

#[test]
fn describe_lists_slots_in_order() {
    let mut set = LayerSet::new();
    set.add_layer("rock.blp".to_string());
    set.add_layer("grass.blp".to_string());
    let opts = AlphaWriteOpts {
        legacy_cascading: true,
        ..AlphaWriteOpts::default()
    };
    let payload = set.serialize_alpha(&opts).unwrap();
    let m = ChunkManifest::describe(
        ChunkId::new(1, 1),
        &set,
        &payload,
        &opts,
        PathBuf::from("out.alpha"),
    )
    .unwrap();

    assert_eq!(m.textures, ["rock.blp", "grass.blp"]);
    assert_eq!(m.layers[1].texture_id, 1);
    assert!(!m.format.unwrap().big_alpha);
    m.validate().unwrap();
}

#[test]
fn config_supplies_geometry_and_missing_format() {
    let dir = PathBuf::from("target").join("manifest_config");
    std::fs::create_dir_all(&dir).unwrap();

    // Two-layer chunk in the 4-bit layout: layer 1 at 0x8 (136) everywhere.
    std::fs::write(dir.join("chunk.alpha"), vec![0x88u8; 2048]).unwrap();
    let json = MANIFEST.replace("\"flags\": 768", "\"flags\": 256");
    let m = ChunkManifest::from_json_str(&json).unwrap();

    let cfg = LayerSetConfig::from_json_str(
        r#"{ "geometry": { "chunk_size": 64.0 }, "load": { "big_alpha": false } }"#,
    )
    .unwrap();
    let set = m.load_layer_set_with(&dir, &cfg).unwrap();
    assert_eq!(set.geometry().chunk_size, 64.0);
    assert_eq!(set.alpha(1, 0), Some(136));
    assert_eq!(set.alpha(0, 0), Some(119));

    // The same payload read as 4096-byte maps is too short.
    let err = m.load_layer_set(&dir).unwrap_err();
    assert!(matches!(err, LayerSetError::ChunkLoad { .. }));
}
