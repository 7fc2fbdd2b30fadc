use crate::foundation::core::{ALPHA_MAP_DIM, ALPHA_MAP_TEXELS, PACKED_CHANNELS};
use crate::foundation::error::LayerSetResult;
use crate::layers::set::LayerSet;
use crate::upload::AlphaUploadSink;

const PACKED_LEN: usize = ALPHA_MAP_TEXELS * PACKED_CHANNELS;

/// Interleaved RGB copy of layers 1..=3 for sampling, plus whether the GPU copy is behind.
#[derive(Clone, Debug)]
pub(crate) struct PackedDisplay {
    pub(crate) bytes: Box<[u8; PACKED_LEN]>,
    pub(crate) stale: bool,
}

impl PackedDisplay {
    pub(crate) fn new() -> Self {
        Self {
            bytes: Box::new([0u8; PACKED_LEN]),
            stale: true,
        }
    }
}

impl<T> LayerSet<T> {
    /// Rebuild the whole packed buffer from the stored maps.
    pub(crate) fn regenerate_display(&mut self) {
        let bytes = &mut self.display.bytes;
        bytes.fill(0);
        for (channel, slot) in self.slots.iter().skip(1).enumerate() {
            let Some(map) = &slot.alpha else { continue };
            for (texel, &v) in map.as_bytes().iter().enumerate() {
                bytes[texel * PACKED_CHANNELS + channel] = v;
            }
        }
        self.display.stale = true;
        tracing::trace!(layers = self.slots.len(), "regenerated alpha display buffer");
    }

    pub(crate) fn write_display_texel(&mut self, texel: usize, channel: usize, value: u8) {
        self.display.bytes[texel * PACKED_CHANNELS + channel] = value;
        self.display.stale = true;
    }

    /// Packed display buffer: 4096 texels of 3 bytes, channel `k` holding layer `k + 1`.
    pub fn packed_display(&self) -> &[u8] {
        &self.display.bytes[..]
    }

    /// `true` when the packed buffer changed since the last [`LayerSet::flush_display`].
    pub fn display_is_stale(&self) -> bool {
        self.display.stale
    }

    /// Packed channel sampled for `layer`; `None` for the base layer and absent slots.
    pub fn display_channel(&self, layer: usize) -> Option<usize> {
        (layer > 0 && layer < self.slots.len()).then(|| layer - 1)
    }

    /// Upload the packed buffer through `sink` if it changed.
    ///
    /// Returns whether an upload happened. Sink errors propagate unchanged and leave the buffer
    /// marked stale.
    pub fn flush_display<S: AlphaUploadSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> LayerSetResult<bool> {
        if !self.display.stale {
            return Ok(false);
        }
        let dim = ALPHA_MAP_DIM as u32;
        sink.upload_rgb8(dim, dim, &self.display.bytes[..])?;
        self.display.stale = false;
        Ok(true)
    }

    /// Bind texture layer `index` for sampling. Absent layers are ignored.
    pub fn bind_layer<S: AlphaUploadSink + ?Sized>(
        &self,
        index: usize,
        sink: &mut S,
    ) -> LayerSetResult<bool> {
        if index >= self.slots.len() {
            return Ok(false);
        }
        sink.bind_layer_for_sampling(index)?;
        Ok(true)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/display.rs"]
mod tests;
