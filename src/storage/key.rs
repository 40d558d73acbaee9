use crate::image::ContentDigest;
use std::{
    hash::Hash,
    path::{Path, PathBuf},
};

/// Everything we read from an image layout has one of these keys
///
/// Blob paths come straight from the digest. The digest grammar only admits
/// alphanumerics and `+ . _ -` separators in the algorithm and lowercase hex
/// in the hash, so a parsed digest can't name anything outside `blobs/`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum StorageKey {
    LayoutMarker,
    Index,
    BlobDir,
    Blob(ContentDigest),
}

impl StorageKey {
    pub fn to_path(&self, base_dir: &Path) -> PathBuf {
        let mut path = base_dir.to_path_buf();
        match self {
            StorageKey::LayoutMarker => path.push("oci-layout"),
            StorageKey::Index => path.push("index.json"),
            StorageKey::BlobDir => path.push("blobs"),
            StorageKey::Blob(content_digest) => {
                path.push("blobs");
                path.push(content_digest.format_str());
                path.push(content_digest.hex_str());
            }
        }
        path
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn storage_paths() {
        assert_eq!(
            StorageKey::LayoutMarker
                .to_path(Path::new("root"))
                .to_str()
                .unwrap(),
            "root/oci-layout"
        );
        assert_eq!(
            StorageKey::Index.to_path(Path::new("root")).to_str().unwrap(),
            "root/index.json"
        );
        assert_eq!(
            StorageKey::BlobDir.to_path(Path::new("root")).to_str().unwrap(),
            "root/blobs"
        );
        assert_eq!(
            StorageKey::Blob("sha256:00112233445566778899aabbccddeeff".parse().unwrap())
                .to_path(Path::new("root"))
                .to_str()
                .unwrap(),
            "root/blobs/sha256/00112233445566778899aabbccddeeff"
        );
        assert_eq!(
            StorageKey::Blob(
                "bla-a1.a2+a3:00112233445566778899aabbccddeeff"
                    .parse()
                    .unwrap()
            )
            .to_path(Path::new("/images/foo"))
            .to_str()
            .unwrap(),
            "/images/foo/blobs/bla-a1.a2+a3/00112233445566778899aabbccddeeff"
        );
    }
}
