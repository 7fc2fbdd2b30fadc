//! Run-length codec for a single 4096-byte opacity map.
//!
//! A stream is a sequence of entries. Each entry starts with a header byte: bit 7 selects the
//! mode (`0` copy, `1` fill) and bits 0..=6 hold a count in `[1, 127]`.
//!
//! - fill: header + one value byte, expands to `count` copies of the value
//! - copy: header + `count` value bytes, expands verbatim
//!
//! The encoder restarts entries at every 64-texel row so no entry spans two rows.

use crate::alpha::opacity_map::OpacityMap;
use crate::foundation::core::{ALPHA_MAP_DIM, ALPHA_MAP_TEXELS};
use crate::foundation::error::{LayerSetError, LayerSetResult};

const FILL_BIT: u8 = 0x80;
const COUNT_MASK: u8 = 0x7f;

/// Longest run a single entry can describe.
pub const MAX_RUN: usize = COUNT_MASK as usize;

/// Entry mode encoded in the header's top bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RleMode {
    /// `count` literal bytes follow the header.
    Copy,
    /// One byte follows the header and is repeated `count` times.
    Fill,
}

/// One decoded stream entry, positioned in texel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RleEntry {
    /// Entry mode.
    pub mode: RleMode,
    /// Number of texels produced.
    pub count: usize,
    /// First texel written by this entry.
    pub texel_start: usize,
}

impl RleEntry {
    /// `true` when every texel of the entry lies in one 64-texel row.
    pub fn within_row(&self) -> bool {
        self.texel_start / ALPHA_MAP_DIM == (self.texel_start + self.count - 1) / ALPHA_MAP_DIM
    }
}

fn header(mode: RleMode, count: usize) -> u8 {
    debug_assert!((1..=MAX_RUN).contains(&count));
    let mode_bit = match mode {
        RleMode::Copy => 0,
        RleMode::Fill => FILL_BIT,
    };
    mode_bit | (count as u8 & COUNT_MASK)
}

fn split_header(byte: u8) -> (RleMode, usize) {
    let mode = if byte & FILL_BIT != 0 {
        RleMode::Fill
    } else {
        RleMode::Copy
    };
    (mode, usize::from(byte & COUNT_MASK))
}

fn run_length(values: &[u8]) -> usize {
    let Some(&first) = values.first() else {
        return 0;
    };
    values
        .iter()
        .take(MAX_RUN)
        .take_while(|&&v| v == first)
        .count()
}

/// Encode `map` into an RLE stream.
///
/// Fill entries are used whenever at least two equal bytes remain in the current row; everything
/// else is gathered into copy entries.
pub fn encode(map: &OpacityMap) -> Vec<u8> {
    let mut out = Vec::with_capacity(ALPHA_MAP_TEXELS / 4);

    for z in 0..ALPHA_MAP_DIM {
        let row = map.row(z);
        let mut copy_header: Option<usize> = None;
        let mut i = 0;

        while i < row.len() {
            let run = run_length(&row[i..]);
            if run >= 2 {
                out.push(header(RleMode::Fill, run));
                out.push(row[i]);
                copy_header = None;
                i += run;
                continue;
            }

            match copy_header {
                Some(h) if usize::from(out[h] & COUNT_MASK) < MAX_RUN => out[h] += 1,
                _ => {
                    copy_header = Some(out.len());
                    out.push(header(RleMode::Copy, 1));
                }
            }
            out.push(row[i]);
            i += 1;
        }
    }

    out
}

/// Decode one map from the front of `stream`.
///
/// Returns the map and the number of stream bytes consumed. Streams are untrusted file data: a
/// zero-length entry, a truncated payload, an entry overflowing the map, or a stream that ends
/// before 4096 texels are produced is a [`LayerSetError::Decode`].
pub fn decode(stream: &[u8]) -> LayerSetResult<(OpacityMap, usize)> {
    let mut map = OpacityMap::new();
    let out = map.as_bytes_mut();
    let mut written = 0usize;
    let mut pos = 0usize;

    while written < ALPHA_MAP_TEXELS {
        let Some(&byte) = stream.get(pos) else {
            return Err(LayerSetError::decode(format!(
                "rle stream ended after {written} of {ALPHA_MAP_TEXELS} texels"
            )));
        };
        let (mode, count) = split_header(byte);
        if count == 0 {
            return Err(LayerSetError::decode(format!(
                "zero-length rle entry at byte {pos}"
            )));
        }
        if written + count > ALPHA_MAP_TEXELS {
            return Err(LayerSetError::decode(format!(
                "rle entry at byte {pos} overflows the map ({} texels)",
                written + count
            )));
        }
        pos += 1;

        match mode {
            RleMode::Fill => {
                let &value = stream.get(pos).ok_or_else(|| {
                    LayerSetError::decode(format!("rle fill entry truncated at byte {pos}"))
                })?;
                out[written..written + count].fill(value);
                pos += 1;
            }
            RleMode::Copy => {
                let payload = stream.get(pos..pos + count).ok_or_else(|| {
                    LayerSetError::decode(format!(
                        "rle copy entry at byte {pos} needs {count} bytes, {} left",
                        stream.len().saturating_sub(pos)
                    ))
                })?;
                out[written..written + count].copy_from_slice(payload);
                pos += count;
            }
        }
        written += count;
    }

    Ok((map, pos))
}

/// List the entries of one encoded map without materializing it.
pub fn entries(stream: &[u8]) -> LayerSetResult<Vec<RleEntry>> {
    let mut out = Vec::new();
    let mut texel = 0usize;
    let mut pos = 0usize;

    while texel < ALPHA_MAP_TEXELS {
        let &byte = stream
            .get(pos)
            .ok_or_else(|| LayerSetError::decode("rle stream ended early"))?;
        let (mode, count) = split_header(byte);
        if count == 0 || texel + count > ALPHA_MAP_TEXELS {
            return Err(LayerSetError::decode(format!(
                "invalid rle entry at byte {pos}"
            )));
        }
        pos += 1 + match mode {
            RleMode::Fill => 1,
            RleMode::Copy => count,
        };
        if pos > stream.len() {
            return Err(LayerSetError::decode("rle payload truncated"));
        }
        out.push(RleEntry {
            mode,
            count,
            texel_start: texel,
        });
        texel += count;
    }

    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/alpha/rle.rs"]
mod tests;
