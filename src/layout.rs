//! Checks that a directory is an OCI image layout we understand

use crate::{
    errors::CasError,
    manifest::{LayoutMarker, LAYOUT_VERSION},
    storage::{FileStorage, StorageKey},
};

/// The marker file is a tiny json object; anything bigger is not one
const MARKER_SIZE_LIMIT: u64 = 64 * 1024;

fn invalid(storage: &FileStorage, reason: String) -> CasError {
    CasError::InvalidLayout {
        path: storage.path().to_path_buf(),
        reason,
    }
}

/// Verify the layout marker and basic directory structure
///
/// This must succeed before anything else in the layout is trusted.
pub fn validate(storage: &FileStorage) -> Result<LayoutMarker, CasError> {
    if !storage.path().is_dir() {
        return Err(invalid(storage, "not a directory".to_owned()));
    }

    let content = match storage.read_file(&StorageKey::LayoutMarker, MARKER_SIZE_LIMIT) {
        Ok(Some(content)) => content,
        Ok(None) => return Err(invalid(storage, "missing oci-layout file".to_owned())),
        Err(err) => return Err(invalid(storage, format!("unreadable oci-layout file, {}", err))),
    };
    let marker: LayoutMarker = serde_json::from_slice(&content)
        .map_err(|err| invalid(storage, format!("malformed oci-layout file, {}", err)))?;
    if marker.image_layout_version != LAYOUT_VERSION {
        return Err(invalid(
            storage,
            format!(
                "unsupported image layout version {:?}",
                marker.image_layout_version
            ),
        ));
    }

    if !storage.dir_exists(&StorageKey::BlobDir) {
        return Err(invalid(storage, "missing blobs directory".to_owned()));
    }
    if !storage.exists(&StorageKey::Index) {
        return Err(invalid(storage, "missing index.json".to_owned()));
    }

    log::debug!(
        "image layout {:?} version {}",
        storage.path(),
        marker.image_layout_version
    );
    Ok(marker)
}
