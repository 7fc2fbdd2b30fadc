use smallvec::SmallVec;

use crate::alpha::opacity_map::OpacityMap;
use crate::config::ChunkGeometry;
use crate::foundation::core::{ALPHA_MAP_TEXELS, FULL_OPACITY, MAX_LAYERS, Vec2};
use crate::layers::blend::AlphaEncoding;
use crate::layers::display::PackedDisplay;
use crate::layers::flags::LayerFlags;

/// One texture slot. Slot 0 (the base layer) never owns an opacity map; every other slot does.
#[derive(Clone, Debug)]
pub(crate) struct LayerSlot<T> {
    pub(crate) texture: T,
    pub(crate) flags: LayerFlags,
    pub(crate) effect_id: u32,
    pub(crate) alpha: Option<OpacityMap>,
}

/// Up to four texture layers of one map chunk with their opacity maps.
///
/// `T` is the texture handle handed out by the caller's asset cache. The set only compares and
/// clones handles; it never owns the texture data.
///
/// The base layer's opacity is never stored: at every texel it is `255` minus the sum of the
/// other layers, so all layers together always cover the texel exactly.
#[derive(Clone, Debug)]
pub struct LayerSet<T> {
    pub(crate) slots: SmallVec<[LayerSlot<T>; MAX_LAYERS]>,
    pub(crate) encoding: AlphaEncoding,
    pub(crate) geometry: ChunkGeometry,
    pub(crate) display: PackedDisplay,
}

impl<T> Default for LayerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LayerSet<T> {
    /// Empty set using the default chunk geometry.
    pub fn new() -> Self {
        Self::with_geometry(ChunkGeometry::default())
    }

    /// Empty set using `geometry` for brush coordinate math.
    pub fn with_geometry(geometry: ChunkGeometry) -> Self {
        Self {
            slots: SmallVec::new(),
            encoding: AlphaEncoding::Independent,
            geometry,
            display: PackedDisplay::new(),
        }
    }

    /// Chunk geometry used by [`LayerSet::paint`].
    pub fn geometry(&self) -> ChunkGeometry {
        self.geometry
    }

    /// Replace the chunk geometry.
    pub fn set_geometry(&mut self, geometry: ChunkGeometry) {
        self.geometry = geometry;
    }

    /// Number of live layers, `0..=4`.
    pub fn layer_count(&self) -> usize {
        self.slots.len()
    }

    /// `true` when the chunk has no texture at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Texture in slot `index`.
    pub fn texture(&self, index: usize) -> Option<&T> {
        self.slots.get(index).map(|s| &s.texture)
    }

    /// Textures in slot order.
    pub fn textures(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().map(|s| &s.texture)
    }

    /// Flags of slot `index`.
    pub fn flags(&self, index: usize) -> Option<LayerFlags> {
        self.slots.get(index).map(|s| s.flags)
    }

    /// Replace the flags of slot `index`. Returns `false` for an unknown slot.
    pub fn set_flags(&mut self, index: usize, flags: LayerFlags) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.flags = flags;
                true
            }
            None => false,
        }
    }

    /// Ground-effect id of slot `index`.
    pub fn effect_id(&self, index: usize) -> Option<u32> {
        self.slots.get(index).map(|s| s.effect_id)
    }

    /// Replace the ground-effect id of slot `index`. Returns `false` for an unknown slot.
    pub fn set_effect_id(&mut self, index: usize, effect_id: u32) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.effect_id = effect_id;
                true
            }
            None => false,
        }
    }

    /// Stored opacity map of `layer`; `None` for the base layer and unknown slots.
    pub fn opacity_map(&self, layer: usize) -> Option<&OpacityMap> {
        self.slots.get(layer).and_then(|s| s.alpha.as_ref())
    }

    /// Stored opacity of `layer` at `texel`. For the base layer this is the derived value.
    pub fn alpha(&self, layer: usize, texel: usize) -> Option<u8> {
        if layer >= self.slots.len() || texel >= ALPHA_MAP_TEXELS {
            return None;
        }
        match &self.slots[layer].alpha {
            Some(map) => Some(map.get(texel)),
            None => Some(self.base_opacity(texel)),
        }
    }

    /// Implicit base-layer opacity at `texel`: `255` minus every visible layer above it.
    pub fn base_opacity(&self, texel: usize) -> u8 {
        if self.encoding == AlphaEncoding::Cascading {
            return if self.slots.is_empty() {
                FULL_OPACITY
            } else {
                self.layer_weights(texel)[0]
            };
        }
        let others: u32 = self
            .slots
            .iter()
            .filter_map(|s| s.alpha.as_ref())
            .map(|m| u32::from(m.get(texel)))
            .sum();
        u32::from(FULL_OPACITY).saturating_sub(others) as u8
    }

    /// Stored non-base values at `texel`, zero for absent layers.
    pub(crate) fn stored_alphas(&self, texel: usize) -> [u8; MAX_LAYERS - 1] {
        let mut out = [0u8; MAX_LAYERS - 1];
        for (k, slot) in self.slots.iter().enumerate().skip(1) {
            if let Some(map) = &slot.alpha {
                out[k - 1] = map.get(texel);
            }
        }
        out
    }

    /// Overwrite one stored texel of a non-base layer.
    ///
    /// A cascading set is switched to independent alpha first. The value is clamped so the
    /// layers never exceed full coverage. Returns `false` for the base layer or an unknown
    /// slot/texel.
    pub fn set_alpha(&mut self, layer: usize, texel: usize, value: u8) -> bool {
        if layer == 0 || layer >= self.slots.len() || texel >= ALPHA_MAP_TEXELS {
            return false;
        }
        self.ensure_independent();
        let stored = self.stored_alphas(texel);
        let others: u16 = stored
            .iter()
            .enumerate()
            .filter(|(k, _)| k + 1 != layer)
            .map(|(_, &v)| u16::from(v))
            .sum();
        let value = value.min(u16::from(FULL_OPACITY).saturating_sub(others) as u8);
        if let Some(map) = self.slots[layer].alpha.as_mut() {
            map.set(texel, value);
        }
        self.write_display_texel(texel, layer - 1, value);
        true
    }

    /// Overwrite the whole opacity map of a non-base layer, clamping like [`LayerSet::set_alpha`].
    pub fn set_alpha_map(&mut self, layer: usize, values: &OpacityMap) -> bool {
        if layer == 0 || layer >= self.slots.len() {
            return false;
        }
        self.ensure_independent();
        for texel in 0..ALPHA_MAP_TEXELS {
            self.set_alpha(layer, texel, values.get(texel));
        }
        true
    }

    /// `true` when layer `index` scrolls over time.
    pub fn is_animated(&self, index: usize) -> bool {
        self.flags(index).is_some_and(LayerFlags::is_animated)
    }

    /// Scroll offset of layer `index` at `anim_time`, for the renderer to apply.
    pub fn anim_offset(&self, index: usize, anim_time: u32) -> Option<Vec2> {
        self.flags(index).and_then(|f| f.anim_offset(anim_time))
    }

    /// Remove slot `index` without touching the display buffer.
    ///
    /// Slots above shift down; a slot promoted to base drops its map.
    pub(crate) fn remove_slot(&mut self, index: usize) {
        self.slots.remove(index);
        if index == 0
            && let Some(base) = self.slots.first_mut()
        {
            base.alpha = None;
        }
    }

    /// Erase layer `index`, shifting every slot above it down by one.
    ///
    /// Indices `>= 4` or past the live count are ignored. The removed layer's coverage is
    /// absorbed by the base layer.
    pub fn erase_layer(&mut self, index: usize) -> bool {
        if index >= MAX_LAYERS || index >= self.slots.len() {
            return false;
        }
        self.remove_slot(index);
        self.regenerate_display();
        true
    }

    /// Remove every layer.
    pub fn erase_all(&mut self) {
        self.slots.clear();
        self.encoding = AlphaEncoding::Independent;
        self.regenerate_display();
    }

    /// Which layers show up at one or more texels.
    ///
    /// A stored layer is visible where its weight is nonzero; the base layer is visible where the
    /// others leave any coverage.
    pub(crate) fn layer_visibility(&self) -> [bool; MAX_LAYERS] {
        let n = self.slots.len();
        let mut visible = [false; MAX_LAYERS];
        for texel in 0..ALPHA_MAP_TEXELS {
            let weights = self.texel_weights(texel);
            for k in 0..n {
                visible[k] |= weights[k] > 0.0;
            }
            if visible[..n].iter().all(|&v| v) {
                break;
            }
        }
        visible
    }

    /// Erase every layer not marked visible, highest index first.
    pub(crate) fn erase_invisible(&mut self, visible: [bool; MAX_LAYERS]) -> bool {
        let mut erased = false;
        for k in (0..self.slots.len()).rev() {
            if !visible[k] {
                self.remove_slot(k);
                erased = true;
            }
        }
        if erased {
            self.regenerate_display();
        }
        erased
    }

    /// Erase layers that contribute nothing anywhere on the chunk.
    ///
    /// Frees a slot before a fifth texture is painted. A base layer hidden everywhere is erased
    /// too; the layers above it already cover every texel, so the promoted base keeps its look.
    pub fn erase_unused_layers(&mut self) -> bool {
        if self.slots.len() < 2 {
            return false;
        }
        let visible = self.layer_visibility();
        let erased = self.erase_invisible(visible);
        if erased {
            tracing::debug!(layers = self.slots.len(), "erased unused texture layers");
        }
        erased
    }
}

impl<T: Clone + PartialEq> LayerSet<T> {
    /// Append a layer for `texture` with zeroed flags and effect id.
    ///
    /// Returns the new slot index, or `None` when all four slots are taken. A non-base layer
    /// starts fully transparent.
    pub fn add_layer(&mut self, texture: T) -> Option<usize> {
        let index = self.slots.len();
        if index >= MAX_LAYERS {
            return None;
        }
        self.slots.push(LayerSlot {
            texture,
            flags: LayerFlags::empty(),
            effect_id: 0,
            alpha: (index > 0).then(OpacityMap::new),
        });
        self.regenerate_display();
        Some(index)
    }

    /// First slot holding `texture`.
    pub fn find_slot(&self, texture: &T) -> Option<usize> {
        self.slots.iter().position(|s| s.texture == *texture)
    }

    /// `true` when `texture` is already present or a slot is free.
    pub fn can_paint(&self, texture: &T) -> bool {
        self.find_slot(texture).is_some() || self.slots.len() < MAX_LAYERS
    }

    /// Exchange two slots: texture, flags, effect id and opacity.
    ///
    /// When the base layer takes part, its implicit opacity is written out for the slot it moves
    /// to, and the incoming layer's opacity becomes implicit. Invalid or equal indices are
    /// ignored.
    pub fn swap_layers(&mut self, a: usize, b: usize) -> bool {
        let (lo, hi) = (a.min(b), a.max(b));
        if lo == hi || hi >= self.slots.len() {
            return false;
        }
        self.ensure_independent();

        if lo == 0 {
            let mut base = OpacityMap::new();
            for texel in 0..ALPHA_MAP_TEXELS {
                base.set(texel, self.base_opacity(texel));
            }
            self.slots.swap(0, hi);
            self.slots[0].alpha = None;
            self.slots[hi].alpha = Some(base);
        } else {
            self.slots.swap(lo, hi);
        }

        self.regenerate_display();
        true
    }

    /// Merge every duplicated texture into its first slot.
    pub fn deduplicate(&mut self) -> bool {
        let mut changed = false;
        let mut i = 0;
        while i < self.slots.len() {
            let mut j = i + 1;
            while j < self.slots.len() {
                if self.slots[i].texture == self.slots[j].texture {
                    self.merge_layers(i, j);
                    changed = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        changed
    }

    /// Replace `old` with `new` in place, keeping its opacity.
    ///
    /// Does nothing when `new` is already on the chunk or `old` is not.
    pub fn switch_texture(&mut self, old: &T, new: T) -> bool {
        if self.find_slot(&new).is_some() {
            return false;
        }
        match self.find_slot(old) {
            Some(i) => {
                self.slots[i].texture = new;
                true
            }
            None => false,
        }
    }

    /// Set or clear `flag` on the layer holding `texture`.
    ///
    /// Adding any rotation or speed bit first clears the previous rotation and speed.
    pub fn change_texture_flag(&mut self, texture: &T, flag: u32, add: bool) -> bool {
        let Some(i) = self.find_slot(texture) else {
            return false;
        };
        let flags = &mut self.slots[i].flags;
        if add {
            if flag & LayerFlags::ANIMATION_BITS != 0 {
                flags.remove(LayerFlags::ANIMATION_BITS);
            }
            flags.insert(flag);
        } else {
            flags.remove(flag);
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/set.rs"]
mod tests;
