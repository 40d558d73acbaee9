//! Open handle on an image layout

use crate::{
    errors::{BlobRole, CasError},
    image::ContentDigest,
    layout,
    manifest::Descriptor,
    storage::{BlobReader, FileStorage},
};
use std::{fs::File, path::Path};

/// Default upper bound on the size of index, manifest and config documents
pub const DEFAULT_MAX_DOCUMENT_SIZE: u64 = 4 * 1024 * 1024;

/// Builder for configuring custom [Engine] instances
#[derive(Clone, Debug)]
pub struct EngineBuilder {
    max_document_size: u64,
    verify_sizes: bool,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        EngineBuilder::new()
    }
}

impl EngineBuilder {
    /// Start configuring an engine with default options
    pub fn new() -> Self {
        EngineBuilder {
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            verify_sizes: false,
        }
    }

    /// Change the limit on json documents read into memory
    ///
    /// Index, manifest and config documents larger than this fail to load
    /// instead of being buffered. Layer content is never buffered, so it is
    /// not subject to this limit.
    pub fn max_document_size(mut self, bytes: u64) -> Self {
        self.max_document_size = bytes;
        self
    }

    /// Choose whether blobs must match the size recorded in their descriptor
    ///
    /// Off by default, since summaries are computed from descriptor sizes and
    /// never depend on the stored length. The digest is verified either way.
    pub fn verify_sizes(mut self, verify: bool) -> Self {
        self.verify_sizes = verify;
        self
    }

    /// Validate the layout at `path` and open it
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<Engine, CasError> {
        let storage = FileStorage::new(path.as_ref().to_path_buf());
        layout::validate(&storage)?;
        let root = File::open(storage.path())?;
        log::debug!("opened image layout {:?}", storage.path());
        Ok(Engine {
            storage,
            root: Some(root),
            max_document_size: self.max_document_size,
            verify_sizes: self.verify_sizes,
        })
    }
}

/// An opened OCI image layout
///
/// The engine holds a handle on the layout directory from [Engine::open]
/// until [Engine::close], or until it is dropped. Every read-only operation
/// takes `&self`, so one engine can be shared between threads.
#[derive(Debug)]
pub struct Engine {
    storage: FileStorage,
    root: Option<File>,
    max_document_size: u64,
    verify_sizes: bool,
}

impl Engine {
    /// Open the image layout at `path` with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Engine, CasError> {
        EngineBuilder::new().open(path)
    }

    /// Configure an engine with custom options, via EngineBuilder
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Path this engine was opened on
    pub fn path(&self) -> &Path {
        self.storage.path()
    }

    pub fn is_closed(&self) -> bool {
        self.root.is_none()
    }

    /// Release the handles held by this engine
    ///
    /// Closing twice is not an error. Any operation after closing fails with
    /// [CasError::EngineClosed]. Results obtained before closing stay valid.
    pub fn close(&mut self) -> Result<(), CasError> {
        if let Some(root) = self.root.take() {
            drop(root);
            log::debug!("closed image layout {:?}", self.storage.path());
        }
        Ok(())
    }

    pub(crate) fn storage(&self) -> Result<&FileStorage, CasError> {
        match self.root {
            Some(_) => Ok(&self.storage),
            None => Err(CasError::EngineClosed),
        }
    }

    pub(crate) fn max_document_size(&self) -> u64 {
        self.max_document_size
    }

    /// Open a blob, verifying its digest as it is read
    ///
    /// The returned reader reports an error in place of end of stream if the
    /// content does not match `digest`. See [BlobReader].
    pub fn get_blob(&self, digest: &ContentDigest) -> Result<BlobReader<File>, CasError> {
        self.storage()?.open_blob(digest, BlobRole::Blob, None)
    }

    /// Size of a blob in bytes, without reading it
    pub fn stat_blob(&self, digest: &ContentDigest) -> Result<u64, CasError> {
        self.storage()?.blob_size(digest, BlobRole::Blob)
    }

    /// Read and verify the json document a descriptor points at
    pub(crate) fn read_document(
        &self,
        descriptor: &Descriptor,
        role: BlobRole,
    ) -> Result<Vec<u8>, CasError> {
        let expected_size = if self.verify_sizes {
            Some(descriptor.size)
        } else {
            None
        };
        self.storage()?.read_document(
            &descriptor.digest,
            role,
            expected_size,
            self.max_document_size,
        )
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("error closing image layout {:?}, {}", self.storage.path(), err);
        }
    }
}
