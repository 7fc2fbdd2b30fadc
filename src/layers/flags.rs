use crate::foundation::core::Vec2;

/// Per-layer flag word as stored in the chunk's layer table.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct LayerFlags(pub u32);

/// Scroll period of animated textures, in animation-time units.
const ANIM_PERIOD: u64 = 1600;

// Compass directions 0..8 for scrolling textures.
const ANIM_DIR_X: [f64; 8] = [0.0, 1.0, 1.0, 1.0, 0.0, -1.0, -1.0, -1.0];
const ANIM_DIR_Z: [f64; 8] = [1.0, 1.0, 0.0, -1.0, -1.0, -1.0, 0.0, 1.0];

impl LayerFlags {
    /// Scroll direction (3 bits).
    pub const ROTATION_MASK: u32 = 0x7;
    /// Scroll speed (3 bits).
    pub const SPEED_MASK: u32 = 0x38;
    /// Rotation and speed together; adding either replaces both.
    pub const ANIMATION_BITS: u32 = Self::ROTATION_MASK | Self::SPEED_MASK;
    /// Texture scrolls over time.
    pub const ANIMATE: u32 = 0x40;
    /// Layer has an alpha map in the chunk payload.
    pub const USE_ALPHA_MAP: u32 = 0x100;
    /// The layer's alpha map is run-length encoded.
    pub const ALPHA_COMPRESSED: u32 = 0x200;
    /// Layer uses a reflection cube map.
    pub const USE_CUBE_MAP: u32 = 0x400;

    /// No flags set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// `true` when every bit of `mask` is set.
    pub const fn contains(self, mask: u32) -> bool {
        self.0 & mask == mask
    }

    /// Set the bits of `mask`.
    pub fn insert(&mut self, mask: u32) {
        self.0 |= mask;
    }

    /// Clear the bits of `mask`.
    pub fn remove(&mut self, mask: u32) {
        self.0 &= !mask;
    }

    /// Scroll direction index in `0..8`.
    pub const fn anim_direction(self) -> u32 {
        self.0 & Self::ROTATION_MASK
    }

    /// Scroll speed in `0..8`.
    pub const fn anim_speed(self) -> u32 {
        (self.0 & Self::SPEED_MASK) >> 3
    }

    /// `true` when the texture scrolls.
    pub const fn is_animated(self) -> bool {
        self.contains(Self::ANIMATE)
    }

    /// Texture-space scroll offset at `anim_time`, or `None` for static layers.
    ///
    /// The offset is a fraction of one texture repeat along the layer's scroll direction.
    pub fn anim_offset(self, anim_time: u32) -> Option<Vec2> {
        if !self.is_animated() {
            return None;
        }
        let dir = self.anim_direction() as usize;
        let speed = f64::from(self.anim_speed()) / 7.0;
        let ticks = (f64::from(anim_time) * speed).floor() as u64;
        let f = (ticks % ANIM_PERIOD) as f64 / ANIM_PERIOD as f64;
        Some(Vec2::new(-ANIM_DIR_X[dir] * f, ANIM_DIR_Z[dir] * f))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/flags.rs"]
mod tests;
