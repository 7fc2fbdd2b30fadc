use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::config::{AlphaLoadOpts, AlphaWriteOpts, LayerSetConfig};
use crate::foundation::core::{ChunkId, MAX_LAYERS};
use crate::foundation::error::{LayerSetError, LayerSetResult};
use crate::layers::io::{ChunkAlphaPayload, LayerDescriptor};
use crate::layers::set::LayerSet;

/// JSON description of one chunk's texture layers and where its alpha payload lives.
///
/// ```json
/// {
///   "chunk": { "x": 3, "z": 7 },
///   "textures": ["grass.blp", "rock.blp"],
///   "layers": [
///     { "texture_id": 0, "flags": 0, "alpha_offset": 0, "effect_id": 0 },
///     { "texture_id": 1, "flags": 768, "alpha_offset": 0, "effect_id": 0 }
///   ],
///   "alpha_file": "chunk_3_7.alpha"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkManifest {
    /// Chunk identity, reported in load errors.
    #[serde(default)]
    pub chunk: ChunkId,
    /// Texture names referenced by `layers[..].texture_id`.
    pub textures: Vec<String>,
    /// Layer table, base layer first.
    pub layers: Vec<LayerDescriptor>,
    /// Alpha payload, relative to the manifest's directory.
    pub alpha_file: PathBuf,
    /// Layout of the alpha payload; the loading configuration decides when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<AlphaLoadOpts>,
}

impl ChunkManifest {
    /// Parse and validate a manifest.
    pub fn from_json_str(s: &str) -> LayerSetResult<Self> {
        let manifest: Self =
            serde_json::from_str(s).map_err(|e| LayerSetError::serde(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> LayerSetResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Write the manifest as pretty JSON.
    pub fn save(&self, path: &Path) -> LayerSetResult<()> {
        let s = serde_json::to_string_pretty(self).map_err(|e| LayerSetError::serde(e.to_string()))?;
        std::fs::write(path, s).with_context(|| format!("write manifest '{}'", path.display()))?;
        Ok(())
    }

    /// Check layer count and texture references.
    pub fn validate(&self) -> LayerSetResult<()> {
        if self.layers.len() > MAX_LAYERS {
            return Err(LayerSetError::validation(format!(
                "manifest has {} layers, at most {MAX_LAYERS} allowed",
                self.layers.len()
            )));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.texture_id as usize >= self.textures.len() {
                return Err(LayerSetError::validation(format!(
                    "layer {i} references texture {} of {}",
                    layer.texture_id,
                    self.textures.len()
                )));
            }
        }
        Ok(())
    }

    /// Read the alpha payload next to the manifest and hydrate the chunk's layer set.
    pub fn load_layer_set(&self, base_dir: &Path) -> LayerSetResult<LayerSet<String>> {
        self.load_layer_set_with(base_dir, &LayerSetConfig::default())
    }

    /// Like [`ChunkManifest::load_layer_set`], taking the chunk geometry from `cfg` and the
    /// payload layout from `cfg.load` unless the manifest names one.
    pub fn load_layer_set_with(
        &self,
        base_dir: &Path,
        cfg: &LayerSetConfig,
    ) -> LayerSetResult<LayerSet<String>> {
        let path = base_dir.join(&self.alpha_file);
        let alpha = std::fs::read(&path)
            .with_context(|| format!("read alpha payload '{}'", path.display()))?;
        let mut set = LayerSet::hydrate(
            self.chunk,
            &self.layers,
            |d| {
                self.textures
                    .get(d.texture_id as usize)
                    .cloned()
                    .ok_or_else(|| {
                        LayerSetError::validation(format!("unknown texture id {}", d.texture_id))
                    })
            },
            &alpha,
            self.format.unwrap_or(cfg.load),
        )?;
        set.set_geometry(cfg.geometry);
        Ok(set)
    }

    /// Manifest describing `payload`, serialized from `set` with `opts`.
    ///
    /// Every slot gets its own texture entry in slot order.
    pub fn describe(
        chunk: ChunkId,
        set: &LayerSet<String>,
        payload: &ChunkAlphaPayload,
        opts: &AlphaWriteOpts,
        alpha_file: PathBuf,
    ) -> LayerSetResult<Self> {
        let textures: Vec<String> = set.textures().cloned().collect();
        let ids: Vec<u32> = (0..textures.len() as u32).collect();
        Ok(Self {
            chunk,
            textures,
            layers: payload.descriptors(&ids)?,
            alpha_file,
            format: Some(AlphaLoadOpts {
                big_alpha: !opts.legacy_cascading,
                ..AlphaLoadOpts::default()
            }),
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/manifest.rs"]
mod tests;
