use super::*;

#[test]
fn texel_index_is_row_major() {
    assert_eq!(texel_index(0, 0), 0);
    assert_eq!(texel_index(63, 0), 63);
    assert_eq!(texel_index(0, 1), 64);
    assert_eq!(texel_index(63, 63), ALPHA_MAP_TEXELS - 1);
}

#[test]
fn chunk_id_display() {
    assert_eq!(ChunkId::new(7, 2).to_string(), "(7, 2)");
}

#[test]
fn chunk_is_a_sixteenth_of_a_tile() {
    assert!((CHUNK_SIZE * 16.0 - TILE_SIZE).abs() < 1e-9);
    assert_eq!(PACKED_CHANNELS, 3);
}
