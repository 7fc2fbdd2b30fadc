//! Uncompressed alpha layouts.
//!
//! Big alpha stores one byte per texel (4096 bytes). The older layout packs two texels per byte
//! (2048 bytes, low nibble first) and is always paired with cascading encoding.

use crate::alpha::opacity_map::OpacityMap;
use crate::foundation::core::{ALPHA_MAP_DIM, ALPHA_MAP_TEXELS, texel_index};
use crate::foundation::error::{LayerSetError, LayerSetResult};

/// Byte length of a big-alpha map.
pub const BIG_ALPHA_LEN: usize = ALPHA_MAP_TEXELS;

/// Byte length of a 4-bit legacy map.
pub const LEGACY_ALPHA_LEN: usize = ALPHA_MAP_TEXELS / 2;

/// Read a 4096-byte big-alpha map from the front of `bytes`.
pub fn read_big_alpha(bytes: &[u8]) -> LayerSetResult<OpacityMap> {
    let payload = bytes.get(..BIG_ALPHA_LEN).ok_or_else(|| {
        LayerSetError::decode(format!(
            "big alpha map needs {BIG_ALPHA_LEN} bytes, {} available",
            bytes.len()
        ))
    })?;
    OpacityMap::from_bytes(payload)
}

/// Read a 2048-byte 4-bit map from the front of `bytes`.
///
/// Nibble `n` expands to `n * 17`. With `fix_alpha` the last column and last row are copied from
/// their neighbours, since old writers left them undefined.
pub fn read_legacy_alpha(bytes: &[u8], fix_alpha: bool) -> LayerSetResult<OpacityMap> {
    let payload = bytes.get(..LEGACY_ALPHA_LEN).ok_or_else(|| {
        LayerSetError::decode(format!(
            "legacy alpha map needs {LEGACY_ALPHA_LEN} bytes, {} available",
            bytes.len()
        ))
    })?;

    let mut map = OpacityMap::new();
    let out = map.as_bytes_mut();
    for (i, &b) in payload.iter().enumerate() {
        out[i * 2] = (b & 0x0f) * 17;
        out[i * 2 + 1] = (b >> 4) * 17;
    }

    if fix_alpha {
        let last = ALPHA_MAP_DIM - 1;
        for z in 0..ALPHA_MAP_DIM {
            out[texel_index(last, z)] = out[texel_index(last - 1, z)];
        }
        for x in 0..ALPHA_MAP_DIM {
            out[texel_index(x, last)] = out[texel_index(x, last - 1)];
        }
    }

    Ok(map)
}

/// Pack `map` into the 4-bit layout, rounding each texel to the nearest nibble.
pub fn write_legacy_alpha(map: &OpacityMap) -> Vec<u8> {
    fn nibble(v: u8) -> u8 {
        ((u16::from(v) + 8) / 17) as u8
    }

    map.as_bytes()
        .chunks_exact(2)
        .map(|pair| nibble(pair[0]) | (nibble(pair[1]) << 4))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/alpha/legacy.rs"]
mod tests;
