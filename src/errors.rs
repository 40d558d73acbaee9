//! Error types you might see while reading an image layout

use crate::image::{ContentDigest, MediaType};
use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// Which link in the index → manifest → config/layer chain a blob plays
///
/// Errors that concern a particular blob carry its role, so a failure can be
/// attributed to the manifest or the config rather than to "some blob".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobRole {
    Manifest,
    Config,
    Layer,
    /// Raw blob access with no structural role
    Blob,
}

impl BlobRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobRole::Manifest => "manifest",
            BlobRole::Config => "config",
            BlobRole::Layer => "layer",
            BlobRole::Blob => "blob",
        }
    }
}

impl fmt::Display for BlobRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors while opening an image layout or reading its contents
#[derive(Error, Debug)]
pub enum CasError {
    /// the directory does not declare itself as a supported OCI image layout
    #[error("invalid image layout at {path:?}: {reason}")]
    InvalidLayout { path: PathBuf, reason: String },

    /// no content is stored for this digest
    #[error("{role} not found: {digest}")]
    BlobNotFound {
        role: BlobRole,
        digest: ContentDigest,
    },

    /// calculated digest of stored content is not what we asked for
    #[error("calculated digest of {role} is not what we asked for, expected {expected}, found {found}")]
    DigestMismatch {
        role: BlobRole,
        expected: ContentDigest,
        found: ContentDigest,
    },

    /// stored content does not have the size its descriptor records
    #[error("{role} {digest} has unexpected size, expected {expected} bytes, found {found}")]
    SizeMismatch {
        role: BlobRole,
        digest: ContentDigest,
        expected: u64,
        found: u64,
    },

    /// a json document is larger than the configured limit
    #[error("{role} document {digest} is larger than the {limit} byte limit")]
    DocumentTooLarge {
        role: BlobRole,
        digest: ContentDigest,
        limit: u64,
    },

    /// a path-addressed file such as index.json is larger than the configured limit
    #[error("{path:?} is larger than the {limit} byte limit")]
    FileTooLarge { path: PathBuf, limit: u64 },

    /// no index entry carries the requested reference name
    #[error("reference not found: {0:?}")]
    ReferenceNotFound(String),

    /// more than one index entry carries the requested reference name
    #[error("reference {name:?} is ambiguous, {count} index entries carry it")]
    AmbiguousReference { name: String, count: usize },

    /// the descriptor does not point at something we know how to walk
    #[error("unsupported media type for {role}: {media_type}")]
    UnsupportedMediaType {
        role: BlobRole,
        media_type: MediaType,
    },

    /// index.json exists but is not a valid image index
    #[error("malformed image index: {0}")]
    MalformedIndex(#[source] serde_json::Error),

    /// manifest blob was verified but is not a valid image manifest
    #[error("malformed manifest {digest}: {source}")]
    MalformedManifest {
        digest: ContentDigest,
        source: serde_json::Error,
    },

    /// config blob was verified but is not a valid image configuration
    #[error("malformed config {digest}: {reason}")]
    MalformedConfig {
        digest: ContentDigest,
        reason: String,
    },

    /// string is not in `algorithm:hex` digest format
    #[error("invalid digest format: {0:?}")]
    InvalidDigest(String),

    /// digest is well formed, but uses an algorithm or length we can't verify
    #[error("unsupported digest algorithm or length: {0}")]
    UnsupportedDigest(ContentDigest),

    /// the engine was already closed
    #[error("image engine is closed")]
    EngineClosed,

    /// storage io error
    #[error("storage io error: {0}")]
    Storage(io::Error),

    /// json error
    #[error("json error: {0}")]
    JSON(#[from] serde_json::Error),
}

impl CasError {
    /// Wrap this error so it can travel through an [io::Read] implementation
    ///
    /// The conversion back with `CasError::from` recovers the original error
    /// rather than a generic storage error.
    pub(crate) fn into_io(self) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, self)
    }
}

impl From<io::Error> for CasError {
    fn from(err: io::Error) -> Self {
        if !err.get_ref().map_or(false, |inner| inner.is::<CasError>()) {
            return CasError::Storage(err);
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<CasError>()) {
            Some(Ok(inner)) => *inner,
            Some(Err(other)) => CasError::Storage(io::Error::new(kind, other)),
            None => CasError::Storage(kind.into()),
        }
    }
}
