use crate::foundation::core::{ALPHA_MAP_DIM, ALPHA_MAP_TEXELS, texel_index};
use crate::foundation::error::{LayerSetError, LayerSetResult};

/// 64x64 grid of 8-bit opacity values for one non-base layer, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct OpacityMap {
    values: Box<[u8; ALPHA_MAP_TEXELS]>,
}

impl Default for OpacityMap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OpacityMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let covered = self.values.iter().filter(|&&v| v > 0).count();
        f.debug_struct("OpacityMap")
            .field("covered_texels", &covered)
            .field("max", &self.values.iter().copied().max().unwrap_or(0))
            .finish()
    }
}

impl OpacityMap {
    /// All-zero map.
    pub fn new() -> Self {
        Self::filled(0)
    }

    /// Map with every texel set to `value`.
    pub fn filled(value: u8) -> Self {
        Self {
            values: Box::new([value; ALPHA_MAP_TEXELS]),
        }
    }

    /// Build a map from exactly 4096 bytes.
    pub fn from_bytes(bytes: &[u8]) -> LayerSetResult<Self> {
        let values: [u8; ALPHA_MAP_TEXELS] = bytes.try_into().map_err(|_| {
            LayerSetError::validation(format!(
                "opacity map expects {ALPHA_MAP_TEXELS} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self {
            values: Box::new(values),
        })
    }

    /// Opacity at row-major `texel`.
    ///
    /// Panics if `texel >= 4096`.
    pub fn get(&self, texel: usize) -> u8 {
        self.values[texel]
    }

    /// Set opacity at row-major `texel`.
    ///
    /// Panics if `texel >= 4096`.
    pub fn set(&mut self, texel: usize, value: u8) {
        self.values[texel] = value;
    }

    /// Opacity at column `x`, row `z`.
    pub fn get_xy(&self, x: usize, z: usize) -> u8 {
        self.values[texel_index(x, z)]
    }

    /// One 64-texel row.
    pub fn row(&self, z: usize) -> &[u8] {
        let start = z * ALPHA_MAP_DIM;
        &self.values[start..start + ALPHA_MAP_DIM]
    }

    /// All 4096 values.
    pub fn as_bytes(&self) -> &[u8; ALPHA_MAP_TEXELS] {
        &self.values
    }

    /// Mutable access to all 4096 values.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; ALPHA_MAP_TEXELS] {
        &mut self.values
    }

    /// Overwrite the whole map.
    pub fn copy_from(&mut self, values: &[u8; ALPHA_MAP_TEXELS]) {
        self.values.copy_from_slice(values);
    }

    /// Set every texel to `value`.
    pub fn fill(&mut self, value: u8) {
        self.values.fill(value);
    }

    /// `true` when no texel carries any opacity.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/alpha/opacity_map.rs"]
mod tests;
