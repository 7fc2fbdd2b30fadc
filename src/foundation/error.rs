use crate::foundation::core::ChunkId;

/// Convenience result type used across the crate.
pub type LayerSetResult<T> = Result<T, LayerSetError>;

/// Error taxonomy for layer-set operations that can actually fail.
///
/// Capacity exhaustion and invalid slot indices are soft failures and never surface here; see
/// [`crate::LayerSet::add_layer`] and [`crate::LayerSet::erase_layer`].
#[derive(thiserror::Error, Debug)]
pub enum LayerSetError {
    /// Invalid caller-provided data (buffer sizes, manifests, configuration).
    #[error("validation error: {0}")]
    Validation(String),

    /// Corrupt or undersized alpha payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// A chunk could not be hydrated. Only that chunk is affected.
    #[error("chunk {chunk} failed to load: {reason}")]
    ChunkLoad {
        /// Identity of the chunk being loaded.
        chunk: ChunkId,
        /// Underlying failure.
        reason: String,
    },

    /// The graphics backend rejected an upload or bind.
    #[error("upload error: {0}")]
    Upload(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayerSetError {
    /// Build a [`LayerSetError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LayerSetError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`LayerSetError::ChunkLoad`] value.
    pub fn chunk_load(chunk: ChunkId, reason: impl std::fmt::Display) -> Self {
        Self::ChunkLoad {
            chunk,
            reason: reason.to_string(),
        }
    }

    /// Build a [`LayerSetError::Upload`] value.
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    /// Build a [`LayerSetError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
