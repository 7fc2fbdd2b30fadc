use super::*;

fn map_from_fn(mut f: impl FnMut(usize) -> u8) -> OpacityMap {
    let mut m = OpacityMap::new();
    for t in 0..ALPHA_MAP_TEXELS {
        m.set(t, f(t));
    }
    m
}

fn pseudo_random_map(seed: u32) -> OpacityMap {
    let mut state = seed;
    map_from_fn(|_| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        // Bias towards short runs so both entry modes show up.
        let v = (state >> 24) as u8;
        if v < 96 { 0 } else { v }
    })
}

fn assert_roundtrip(m: &OpacityMap) {
    let stream = encode(m);
    let (decoded, consumed) = decode(&stream).unwrap();
    assert_eq!(&decoded, m);
    assert_eq!(consumed, stream.len());
}

#[test]
fn all_zero_map_is_one_fill_per_row() {
    let stream = encode(&OpacityMap::new());
    assert_eq!(stream.len(), 64 * 2);
    for entry in stream.chunks_exact(2) {
        assert_eq!(entry, &[0x80 | 64, 0]);
    }
    assert_roundtrip(&OpacityMap::new());
}

#[test]
fn all_opaque_map_roundtrips() {
    let m = OpacityMap::filled(255);
    let stream = encode(&m);
    assert_eq!(stream[..2], [0xC0, 255]);
    assert_roundtrip(&m);
}

#[test]
fn alternating_rows_use_one_copy_entry_each() {
    let m = map_from_fn(|t| (t % 2) as u8);
    let stream = encode(&m);
    assert_eq!(stream.len(), 64 * 65);
    assert_eq!(stream[0], 64);
    assert_eq!(stream[65], 64);
    assert_roundtrip(&m);
}

#[test]
fn mixed_content_roundtrips() {
    for seed in [1u32, 7, 42, 1234] {
        assert_roundtrip(&pseudo_random_map(seed));
    }
    assert_roundtrip(&map_from_fn(|t| (t / 64) as u8));
    assert_roundtrip(&map_from_fn(|t| (t % 64) as u8 * 4));
}

#[test]
fn runs_never_cross_rows() {
    // Constant map: a naive encoder would emit 4096/127 long fills.
    for m in [
        OpacityMap::filled(17),
        pseudo_random_map(99),
        map_from_fn(|t| if t % 64 > 60 { 5 } else { (t % 3) as u8 }),
    ] {
        let list = entries(&encode(&m)).unwrap();
        assert!(list.iter().all(RleEntry::within_row));
        assert!(list.iter().all(|e| (1..=MAX_RUN).contains(&e.count)));
        assert_eq!(list.iter().map(|e| e.count).sum::<usize>(), ALPHA_MAP_TEXELS);
    }
}

#[test]
fn fill_is_preferred_for_pairs() {
    let mut m = OpacityMap::new();
    // Row 0: 1, 2, 2, 3, then zeros.
    m.set(0, 1);
    m.set(1, 2);
    m.set(2, 2);
    m.set(3, 3);
    let list = entries(&encode(&m)).unwrap();
    assert_eq!(list[0].mode, RleMode::Copy);
    assert_eq!(list[0].count, 1);
    assert_eq!(list[1].mode, RleMode::Fill);
    assert_eq!(list[1].count, 2);
    assert_eq!(list[2].mode, RleMode::Copy);
    assert_eq!(list[2].count, 1);
    assert_eq!(list[3].mode, RleMode::Fill);
    assert_eq!(list[3].count, 60);
}

#[test]
fn decode_reports_consumed_bytes_for_concatenated_streams() {
    let a = OpacityMap::filled(3);
    let b = pseudo_random_map(5);
    let mut stream = encode(&a);
    let first_len = stream.len();
    stream.extend(encode(&b));

    let (da, used) = decode(&stream).unwrap();
    assert_eq!(da, a);
    assert_eq!(used, first_len);
    let (db, _) = decode(&stream[used..]).unwrap();
    assert_eq!(db, b);
}

#[test]
fn decode_rejects_corrupt_streams() {
    // Empty.
    assert!(matches!(decode(&[]), Err(LayerSetError::Decode(_))));
    // Zero-count header.
    assert!(decode(&[0x80, 1]).is_err());
    // Fill without its value byte.
    assert!(decode(&[0x80 | 10]).is_err());
    // Copy entry missing payload.
    assert!(decode(&[5, 1, 2]).is_err());
    // Stream too short to fill the map.
    assert!(decode(&[0x80 | 64, 0]).is_err());

    // Overflow: 4095 texels then a 2-texel fill.
    let mut stream = encode(&OpacityMap::new());
    stream.truncate(stream.len() - 2);
    stream.extend([0x80 | 63, 0, 0x80 | 2, 0]);
    let err = decode(&stream).unwrap_err();
    assert!(err.to_string().contains("overflows"));
}
