//! Read access to the files of an image layout
//!
//! Blobs are immutable once written, so any number of readers can open them
//! at once. Nothing here writes; a writer would share [StorageKey] for its
//! path mapping.

mod key;
mod reader;

pub use key::StorageKey;
pub use reader::BlobReader;

use crate::{
    errors::{BlobRole, CasError},
    image::ContentDigest,
};
use std::{
    fs,
    fs::File,
    io,
    io::Read,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        FileStorage { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open one object from local storage, as a File
    pub fn open(&self, key: &StorageKey) -> Result<Option<File>, CasError> {
        let path = key.to_path(&self.path);
        match File::open(path) {
            Err(e) => match e.kind() {
                io::ErrorKind::NotFound => Ok(None),
                _ => Err(e.into()),
            },
            Ok(f) => Ok(Some(f)),
        }
    }

    /// Check whether a stored file exists without actually opening it
    ///
    /// Returns true if and only if the storage exists as a regular file. Any
    /// errors will cause this to return false.
    pub fn exists(&self, key: &StorageKey) -> bool {
        let path = key.to_path(&self.path);
        match fs::metadata(path) {
            Err(_) => false,
            Ok(metadata) => metadata.is_file(),
        }
    }

    /// Check whether a directory exists at this key
    pub fn dir_exists(&self, key: &StorageKey) -> bool {
        let path = key.to_path(&self.path);
        match fs::metadata(path) {
            Err(_) => false,
            Ok(metadata) => metadata.is_dir(),
        }
    }

    /// Size of a stored blob, without reading any of its content
    pub fn blob_size(&self, digest: &ContentDigest, role: BlobRole) -> Result<u64, CasError> {
        digest.algorithm()?;
        let path = StorageKey::Blob(digest.clone()).to_path(&self.path);
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => Ok(metadata.len()),
            Ok(_) => Err(CasError::BlobNotFound {
                role,
                digest: digest.clone(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CasError::BlobNotFound {
                role,
                digest: digest.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Open a blob for reading, with digest verification as it streams
    pub fn open_blob(
        &self,
        digest: &ContentDigest,
        role: BlobRole,
        expected_size: Option<u64>,
    ) -> Result<BlobReader<File>, CasError> {
        // unverifiable digests fail before touching the filesystem
        digest.algorithm()?;
        let key = StorageKey::Blob(digest.clone());
        let not_found = || CasError::BlobNotFound {
            role,
            digest: digest.clone(),
        };
        let file = self.open(&key)?.ok_or_else(not_found)?;
        if !file.metadata()?.is_file() {
            return Err(not_found());
        }
        log::trace!("opened {} blob {:?}", role, key.to_path(&self.path));
        BlobReader::new(file, role, digest.clone(), expected_size)
    }

    /// Read a whole blob into memory, verified, refusing anything over `limit`
    ///
    /// Used for the json documents an image is made of. Returns only after the
    /// digest (and size, if given) has been checked.
    pub fn read_document(
        &self,
        digest: &ContentDigest,
        role: BlobRole,
        expected_size: Option<u64>,
        limit: u64,
    ) -> Result<Vec<u8>, CasError> {
        let too_large = || CasError::DocumentTooLarge {
            role,
            digest: digest.clone(),
            limit,
        };
        if expected_size.map_or(false, |size| size > limit) {
            return Err(too_large());
        }
        let mut reader = self.open_blob(digest, role, expected_size)?;
        let mut content = Vec::new();
        (&mut reader)
            .take(limit.saturating_add(1))
            .read_to_end(&mut content)?;
        if content.len() as u64 > limit {
            return Err(too_large());
        }
        // take() only stops short of the limit when the blob ended, and the
        // end is where verification happens
        debug_assert!(reader.is_verified());
        Ok(content)
    }

    /// Read a file which is addressed by path rather than by digest
    pub fn read_file(&self, key: &StorageKey, limit: u64) -> Result<Option<Vec<u8>>, CasError> {
        let file = match self.open(key)? {
            Some(file) => file,
            None => return Ok(None),
        };
        let mut content = Vec::new();
        file.take(limit.saturating_add(1)).read_to_end(&mut content)?;
        if content.len() as u64 > limit {
            return Err(CasError::FileTooLarge {
                path: key.to_path(&self.path),
                limit,
            });
        }
        Ok(Some(content))
    }
}
