use crate::alpha::legacy::{read_big_alpha, read_legacy_alpha, write_legacy_alpha};
use crate::alpha::opacity_map::OpacityMap;
use crate::alpha::rle;
use crate::config::{AlphaCompression, AlphaLoadOpts, AlphaWriteOpts};
use crate::foundation::core::{ALPHA_MAP_TEXELS, ChunkId, FULL_OPACITY, MAX_LAYERS};
use crate::foundation::error::{LayerSetError, LayerSetResult};
use crate::layers::blend::AlphaEncoding;
use crate::layers::flags::LayerFlags;
use crate::layers::set::{LayerSet, LayerSlot};

/// Size of one on-disk layer record.
pub const LAYER_RECORD_LEN: usize = 16;

/// One entry of a chunk's layer table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayerDescriptor {
    /// Index into the map tile's texture list.
    pub texture_id: u32,
    /// Layer flags.
    pub flags: LayerFlags,
    /// Byte offset of this layer's alpha data in the chunk payload.
    pub alpha_offset: u32,
    /// Ground-effect id.
    pub effect_id: u32,
}

/// Parse a layer table of 16-byte little-endian records
/// (`texture_id`, `flags`, `alpha_offset`, `effect_id`).
pub fn read_layer_table(bytes: &[u8]) -> LayerSetResult<Vec<LayerDescriptor>> {
    if bytes.len() % LAYER_RECORD_LEN != 0 {
        return Err(LayerSetError::decode(format!(
            "layer table length {} is not a multiple of {LAYER_RECORD_LEN}",
            bytes.len()
        )));
    }
    let count = bytes.len() / LAYER_RECORD_LEN;
    if count > MAX_LAYERS {
        return Err(LayerSetError::decode(format!(
            "layer table has {count} records, at most {MAX_LAYERS} allowed"
        )));
    }

    let word = |rec: &[u8], i: usize| {
        u32::from_le_bytes([rec[i * 4], rec[i * 4 + 1], rec[i * 4 + 2], rec[i * 4 + 3]])
    };
    Ok(bytes
        .chunks_exact(LAYER_RECORD_LEN)
        .map(|rec| LayerDescriptor {
            texture_id: word(rec, 0),
            flags: LayerFlags(word(rec, 1)),
            alpha_offset: word(rec, 2),
            effect_id: word(rec, 3),
        })
        .collect())
}

/// Write `descriptors` as a layer table.
pub fn write_layer_table(descriptors: &[LayerDescriptor]) -> Vec<u8> {
    let mut out = Vec::with_capacity(descriptors.len() * LAYER_RECORD_LEN);
    for d in descriptors {
        out.extend_from_slice(&d.texture_id.to_le_bytes());
        out.extend_from_slice(&d.flags.bits().to_le_bytes());
        out.extend_from_slice(&d.alpha_offset.to_le_bytes());
        out.extend_from_slice(&d.effect_id.to_le_bytes());
    }
    out
}

/// Alpha data of one layer as written by [`LayerSet::serialize_alpha`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializedLayer {
    /// Flags with `USE_ALPHA_MAP` / `ALPHA_COMPRESSED` updated for the stream.
    pub flags: LayerFlags,
    /// Ground-effect id.
    pub effect_id: u32,
    /// Offset of `stream` in [`ChunkAlphaPayload::bytes`].
    pub alpha_offset: u32,
    /// This layer's alpha stream; empty for the base layer.
    pub stream: Vec<u8>,
}

/// Serialized alpha payload of a chunk: one entry per slot plus the concatenated streams.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkAlphaPayload {
    /// Per-slot metadata and streams, base layer first.
    pub layers: Vec<SerializedLayer>,
    /// Every stream back to back.
    pub bytes: Vec<u8>,
}

impl ChunkAlphaPayload {
    /// Layer table for this payload, given each slot's texture id.
    pub fn descriptors(&self, texture_ids: &[u32]) -> LayerSetResult<Vec<LayerDescriptor>> {
        if texture_ids.len() != self.layers.len() {
            return Err(LayerSetError::validation(format!(
                "{} texture ids given for {} layers",
                texture_ids.len(),
                self.layers.len()
            )));
        }
        Ok(self
            .layers
            .iter()
            .zip(texture_ids)
            .map(|(l, &texture_id)| LayerDescriptor {
                texture_id,
                flags: l.flags,
                alpha_offset: l.alpha_offset,
                effect_id: l.effect_id,
            })
            .collect())
    }
}

fn decode_layer(
    layer: usize,
    desc: &LayerDescriptor,
    alpha: &[u8],
    opts: AlphaLoadOpts,
) -> LayerSetResult<OpacityMap> {
    let offset = desc.alpha_offset as usize;
    let Some(stream) = alpha.get(offset..) else {
        return Err(LayerSetError::decode(format!(
            "layer {layer}: alpha offset {offset} past payload of {} bytes",
            alpha.len()
        )));
    };
    let map = if desc.flags.contains(LayerFlags::ALPHA_COMPRESSED) {
        rle::decode(stream).map(|(map, _)| map)
    } else if opts.big_alpha {
        read_big_alpha(stream)
    } else {
        read_legacy_alpha(stream, opts.fix_alpha)
    };
    map.map_err(|e| LayerSetError::decode(format!("layer {layer}: {e}")))
}

impl<T: Clone + PartialEq> LayerSet<T> {
    /// Build the layer set of a loaded chunk.
    ///
    /// `resolve` maps each descriptor to a texture handle. `alpha` is the chunk's alpha payload;
    /// each non-base layer flagged `USE_ALPHA_MAP` is read at its offset. Payloads in the legacy
    /// layout are cascading and converted to independent alpha. Any failure is reported as
    /// [`LayerSetError::ChunkLoad`] for `chunk`.
    #[tracing::instrument(skip(descriptors, resolve, alpha), fields(layers = descriptors.len()))]
    pub fn hydrate<F>(
        chunk: ChunkId,
        descriptors: &[LayerDescriptor],
        resolve: F,
        alpha: &[u8],
        opts: AlphaLoadOpts,
    ) -> LayerSetResult<Self>
    where
        F: FnMut(&LayerDescriptor) -> LayerSetResult<T>,
    {
        Self::hydrate_inner(descriptors, resolve, alpha, opts).map_err(|e| {
            tracing::warn!(%chunk, error = %e, "chunk alpha failed to load");
            LayerSetError::chunk_load(chunk, e)
        })
    }

    fn hydrate_inner<F>(
        descriptors: &[LayerDescriptor],
        mut resolve: F,
        alpha: &[u8],
        opts: AlphaLoadOpts,
    ) -> LayerSetResult<Self>
    where
        F: FnMut(&LayerDescriptor) -> LayerSetResult<T>,
    {
        if descriptors.len() > MAX_LAYERS {
            return Err(LayerSetError::validation(format!(
                "{} layers, at most {MAX_LAYERS} allowed",
                descriptors.len()
            )));
        }

        let mut set = Self::new();
        for (layer, desc) in descriptors.iter().enumerate() {
            let alpha = if layer == 0 {
                None
            } else if desc.flags.contains(LayerFlags::USE_ALPHA_MAP) {
                Some(decode_layer(layer, desc, alpha, opts)?)
            } else {
                Some(OpacityMap::new())
            };
            set.slots.push(LayerSlot {
                texture: resolve(desc)?,
                flags: desc.flags,
                effect_id: desc.effect_id,
                alpha,
            });
        }

        if opts.big_alpha {
            for texel in 0..ALPHA_MAP_TEXELS {
                let sum: u32 = set.stored_alphas(texel).iter().map(|&v| u32::from(v)).sum();
                if sum > u32::from(FULL_OPACITY) {
                    return Err(LayerSetError::decode(format!(
                        "texel {texel} is covered {sum}/255 by the stored layers"
                    )));
                }
            }
        } else {
            set.encoding = AlphaEncoding::Cascading;
            set.to_independent_alpha();
        }

        set.regenerate_display();
        Ok(set)
    }

    /// Serialize every non-base opacity map into a chunk alpha payload.
    ///
    /// The set itself is not modified; conversion to cascading alpha happens on a copy.
    #[tracing::instrument(skip(self), fields(layers = self.slots.len()))]
    pub fn serialize_alpha(&self, opts: &AlphaWriteOpts) -> LayerSetResult<ChunkAlphaPayload> {
        let mut work = self.clone();
        work.ensure_independent();
        if opts.legacy_cascading {
            work.to_cascading_alpha();
        }

        let mut payload = ChunkAlphaPayload::default();
        for slot in &work.slots {
            let mut flags = slot.flags;
            let alpha_offset = u32::try_from(payload.bytes.len())
                .map_err(|_| LayerSetError::validation("alpha payload exceeds 4 GiB"))?;
            let stream = match &slot.alpha {
                None => {
                    flags.remove(LayerFlags::USE_ALPHA_MAP | LayerFlags::ALPHA_COMPRESSED);
                    Vec::new()
                }
                Some(map) => {
                    flags.insert(LayerFlags::USE_ALPHA_MAP);
                    match (opts.compression, opts.legacy_cascading) {
                        (AlphaCompression::Rle, _) => {
                            flags.insert(LayerFlags::ALPHA_COMPRESSED);
                            rle::encode(map)
                        }
                        (AlphaCompression::Uncompressed, false) => {
                            flags.remove(LayerFlags::ALPHA_COMPRESSED);
                            map.as_bytes().to_vec()
                        }
                        (AlphaCompression::Uncompressed, true) => {
                            flags.remove(LayerFlags::ALPHA_COMPRESSED);
                            write_legacy_alpha(map)
                        }
                    }
                }
            };
            payload.bytes.extend_from_slice(&stream);
            payload.layers.push(SerializedLayer {
                flags,
                effect_id: slot.effect_id,
                alpha_offset: if stream.is_empty() { 0 } else { alpha_offset },
                stream,
            });
        }
        Ok(payload)
    }

    /// RLE streams of every non-base layer, in slot order.
    pub fn compressed_alpha_maps(&self) -> Vec<Vec<u8>> {
        self.slots
            .iter()
            .filter_map(|s| s.alpha.as_ref())
            .map(rle::encode)
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/io.rs"]
mod tests;
