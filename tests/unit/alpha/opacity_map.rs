use super::*;

#[test]
fn new_map_is_zero() {
    let m = OpacityMap::new();
    assert!(m.is_zero());
    assert_eq!(m.as_bytes().len(), ALPHA_MAP_TEXELS);
}

#[test]
fn from_bytes_rejects_wrong_size() {
    assert!(OpacityMap::from_bytes(&[0u8; 100]).is_err());
    assert!(OpacityMap::from_bytes(&[0u8; 4097]).is_err());
    assert!(OpacityMap::from_bytes(&[7u8; 4096]).is_ok());
}

#[test]
fn xy_and_rows_follow_row_major_layout() {
    let mut m = OpacityMap::new();
    m.set(64 * 3 + 5, 42);
    assert_eq!(m.get_xy(5, 3), 42);
    assert_eq!(m.row(3)[5], 42);
    assert_eq!(m.row(2).iter().copied().max(), Some(0));
    assert!(!m.is_zero());
}

#[test]
fn fill_and_copy_from() {
    let mut m = OpacityMap::filled(9);
    assert!(m.as_bytes().iter().all(|&v| v == 9));
    m.fill(0);
    assert!(m.is_zero());

    let src = [200u8; ALPHA_MAP_TEXELS];
    m.copy_from(&src);
    assert_eq!(m.get(4095), 200);
}

#[test]
fn debug_is_compact() {
    let s = format!("{:?}", OpacityMap::filled(3));
    assert!(s.contains("covered_texels: 4096"));
    assert!(s.len() < 100);
}
