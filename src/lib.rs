//! Layerset composites the texture layers of terrain map chunks.
//!
//! Each chunk carries up to four texture layers. The base layer covers whatever the others leave
//! uncovered; each layer above it stores a 64x64 opacity map. The engine keeps the layers summing
//! to full coverage at every texel while they are painted, merged, swapped or erased:
//!
//! - Build or [hydrate](LayerSet::hydrate) a [`LayerSet`]
//! - [Paint](LayerSet::paint) it with any [`Brush`]
//! - Push the packed display buffer through an [`AlphaUploadSink`]
//! - [Serialize](LayerSet::serialize_alpha) it back to run-length encoded or legacy alpha
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod alpha;
mod brush;
mod config;
mod foundation;
mod layers;
mod manifest;
mod preview;
mod upload;

pub use crate::foundation::core::{
    ALPHA_MAP_DIM, ALPHA_MAP_TEXELS, CHUNK_SIZE, ChunkId, FULL_OPACITY, MAX_LAYERS,
    PACKED_CHANNELS, Point, Rect, TILE_SIZE, Vec2,
};
pub use crate::foundation::error::{LayerSetError, LayerSetResult};

pub use crate::alpha::legacy::{
    BIG_ALPHA_LEN, LEGACY_ALPHA_LEN, read_big_alpha, read_legacy_alpha, write_legacy_alpha,
};
pub use crate::alpha::opacity_map::OpacityMap;
pub use crate::alpha::rle::{
    MAX_RUN, RleEntry, RleMode, decode as decode_rle, encode as encode_rle, entries as rle_entries,
};
pub use crate::brush::{Brush, FalloffBrush};
pub use crate::config::{
    AlphaCompression, AlphaLoadOpts, AlphaWriteOpts, ChunkGeometry, LayerSetConfig,
};
pub use crate::layers::blend::AlphaEncoding;
pub use crate::layers::flags::LayerFlags;
pub use crate::layers::io::{
    ChunkAlphaPayload, LAYER_RECORD_LEN, LayerDescriptor, SerializedLayer, read_layer_table,
    write_layer_table,
};
pub use crate::layers::set::LayerSet;
pub use crate::manifest::ChunkManifest;
pub use crate::upload::{AlphaUploadSink, InMemoryUploadSink, RecordedUpload};
