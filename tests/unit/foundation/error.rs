use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LayerSetError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        LayerSetError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        LayerSetError::upload("x")
            .to_string()
            .contains("upload error:")
    );
    assert!(
        LayerSetError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn chunk_load_names_the_chunk() {
    let err = LayerSetError::chunk_load(ChunkId::new(3, 14), "stream truncated");
    let msg = err.to_string();
    assert!(msg.contains("(3, 14)"));
    assert!(msg.contains("stream truncated"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LayerSetError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
