use crate::foundation::error::LayerSetResult;

/// Graphics-side consumer of the packed display buffer.
///
/// Implementations perform bind/upload/unbind as one scoped operation. Backend failures are
/// returned as [`crate::LayerSetError::Upload`] and treated as fatal to the frame; the engine
/// never retries.
pub trait AlphaUploadSink {
    /// Upload a tightly packed RGB8 pixel buffer of `width * height * 3` bytes.
    fn upload_rgb8(&mut self, width: u32, height: u32, bytes: &[u8]) -> LayerSetResult<()>;

    /// Bind texture layer `index` for sampling.
    fn bind_layer_for_sampling(&mut self, index: usize) -> LayerSetResult<()>;
}

/// One recorded upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedUpload {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// RGB8 bytes as uploaded.
    pub bytes: Vec<u8>,
}

/// In-memory sink for tests and tools.
#[derive(Debug, Default)]
pub struct InMemoryUploadSink {
    uploads: Vec<RecordedUpload>,
    binds: Vec<usize>,
}

impl InMemoryUploadSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads in call order.
    pub fn uploads(&self) -> &[RecordedUpload] {
        &self.uploads
    }

    /// Most recent upload, if any.
    pub fn last_upload(&self) -> Option<&RecordedUpload> {
        self.uploads.last()
    }

    /// Layer indices bound for sampling, in call order.
    pub fn binds(&self) -> &[usize] {
        &self.binds
    }
}

impl AlphaUploadSink for InMemoryUploadSink {
    fn upload_rgb8(&mut self, width: u32, height: u32, bytes: &[u8]) -> LayerSetResult<()> {
        self.uploads.push(RecordedUpload {
            width,
            height,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    fn bind_layer_for_sampling(&mut self, index: usize) -> LayerSetResult<()> {
        self.binds.push(index);
        Ok(())
    }
}
