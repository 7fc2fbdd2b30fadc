use crate::foundation::core::{ALPHA_MAP_DIM, CHUNK_SIZE};
use crate::foundation::error::{LayerSetError, LayerSetResult};

/// World-space geometry of a chunk, used for brush coordinate math.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChunkGeometry {
    /// Side length of a chunk in world units.
    pub chunk_size: f64,
}

impl Default for ChunkGeometry {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
        }
    }
}

impl ChunkGeometry {
    /// Side length of one opacity texel in world units.
    pub fn texel_size(&self) -> f64 {
        self.chunk_size / ALPHA_MAP_DIM as f64
    }

    /// Reject non-finite or non-positive sizes.
    pub fn validate(&self) -> LayerSetResult<()> {
        if !self.chunk_size.is_finite() || self.chunk_size <= 0.0 {
            return Err(LayerSetError::validation(
                "chunk_size must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// How uncompressed alpha payloads are laid out when loading a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlphaLoadOpts {
    /// 4096-byte maps in independent encoding. When `false` the payload uses the 2048-byte
    /// 4-bit layout and cascading encoding, and is converted on load.
    pub big_alpha: bool,
    /// Repair the undefined last row/column of 4-bit maps.
    pub fix_alpha: bool,
}

impl Default for AlphaLoadOpts {
    fn default() -> Self {
        Self {
            big_alpha: true,
            fix_alpha: true,
        }
    }
}

/// Compression applied to each layer's alpha stream on save.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaCompression {
    /// Run-length encoded streams.
    #[default]
    Rle,
    /// Raw maps (4096 bytes, or 2048 bytes for the legacy layout).
    Uncompressed,
}

/// Options for [`crate::LayerSet::serialize_alpha`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlphaWriteOpts {
    /// Convert to cascading encoding before writing, for readers of the old format.
    pub legacy_cascading: bool,
    /// Stream compression.
    pub compression: AlphaCompression,
}

/// Engine configuration, typically loaded from JSON by tools.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayerSetConfig {
    /// Chunk geometry.
    pub geometry: ChunkGeometry,
    /// Load-side payload layout.
    pub load: AlphaLoadOpts,
    /// Save-side options.
    pub write: AlphaWriteOpts,
}

impl LayerSetConfig {
    /// Parse and validate a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> LayerSetResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| LayerSetError::serde(e.to_string()))?;
        cfg.geometry.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
