pub use kurbo::{Point, Rect, Vec2};

/// Maximum number of texture layers a chunk can carry.
pub const MAX_LAYERS: usize = 4;

/// Side length of an opacity map in texels.
pub const ALPHA_MAP_DIM: usize = 64;

/// Number of texels in one opacity map.
pub const ALPHA_MAP_TEXELS: usize = ALPHA_MAP_DIM * ALPHA_MAP_DIM;

/// Channels in the packed display buffer (one per non-base layer).
pub const PACKED_CHANNELS: usize = MAX_LAYERS - 1;

/// Opacity value meaning "fully covering".
pub const FULL_OPACITY: u8 = 255;

/// World size of one map tile.
pub const TILE_SIZE: f64 = 533.333_33;

/// World size of one chunk (a tile is 16x16 chunks).
pub const CHUNK_SIZE: f64 = TILE_SIZE / 16.0;

/// Identity of a map chunk, used to attribute load failures.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkId {
    /// Chunk column.
    pub x: u32,
    /// Chunk row.
    pub z: u32,
}

impl ChunkId {
    /// Create a chunk id.
    pub fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Row-major texel index for column `x` and row `z`.
pub(crate) fn texel_index(x: usize, z: usize) -> usize {
    z * ALPHA_MAP_DIM + x
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
