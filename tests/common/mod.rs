#![allow(dead_code)]

use ocicas::{
    manifest::{Filesystem, History, ImageConfig, Index, Manifest, FS_TYPE},
    ContentDigest, Descriptor, MediaType, REF_NAME_ANNOTATION,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An image layout in a temporary directory, written the way tools lay it out
pub struct TestLayout {
    dir: TempDir,
    manifests: Vec<Descriptor>,
}

impl TestLayout {
    pub fn new() -> Self {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("oci-layout"),
            r#"{"imageLayoutVersion":"1.0.0"}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("blobs").join("sha256")).unwrap();
        let layout = TestLayout {
            dir,
            manifests: Vec::new(),
        };
        layout.write_index();
        layout
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn blob_path(&self, digest: &ContentDigest) -> PathBuf {
        self.path()
            .join("blobs")
            .join(digest.format_str())
            .join(digest.hex_str())
    }

    pub fn put_blob(&self, content: &[u8]) -> ContentDigest {
        let digest = ContentDigest::from_content(content);
        fs::write(self.blob_path(&digest), content).unwrap();
        digest
    }

    /// Store a json document, optionally padded with trailing whitespace
    pub fn put_json<T: serde::Serialize>(
        &self,
        media_type: MediaType,
        value: &T,
        pad_to: Option<usize>,
    ) -> Descriptor {
        let mut content = serde_json::to_vec(value).unwrap();
        if let Some(len) = pad_to {
            assert!(content.len() <= len, "document doesn't fit in {} bytes", len);
            content.resize(len, b' ');
        }
        let digest = self.put_blob(&content);
        Descriptor::new(media_type, digest, content.len() as u64)
    }

    /// Flip one bit in a stored blob, leaving its name alone
    pub fn tamper(&self, digest: &ContentDigest) {
        let path = self.blob_path(digest);
        let mut content = fs::read(&path).unwrap();
        let middle = content.len() / 2;
        content[middle] ^= 0x01;
        fs::write(&path, content).unwrap();
    }

    pub fn add_manifest(&mut self, descriptor: Descriptor) {
        self.manifests.push(descriptor);
        self.write_index();
    }

    pub fn tag(&mut self, name: &str, descriptor: Descriptor) {
        self.add_manifest(descriptor.with_annotation(REF_NAME_ANNOTATION, name));
    }

    pub fn write_raw_index(&self, content: &str) {
        fs::write(self.path().join("index.json"), content).unwrap();
    }

    fn write_index(&self) {
        let index = Index {
            schema_version: 2,
            media_type: Some(MediaType::ImageIndex),
            manifests: self.manifests.clone(),
            annotations: None,
        };
        fs::write(
            self.path().join("index.json"),
            serde_json::to_vec(&index).unwrap(),
        )
        .unwrap();
    }

    /// Store a config and manifest for layers of the given sizes
    ///
    /// Layer content is not stored; only descriptors for it.
    pub fn put_image(&self, layer_sizes: &[u64], history: Vec<History>) -> Descriptor {
        let layers: Vec<Descriptor> = layer_sizes
            .iter()
            .enumerate()
            .map(|(i, size)| fake_layer(i, *size))
            .collect();
        let config = self.put_json(MediaType::ImageConfig, &image_config(&layers, history), None);
        self.put_manifest(config, layers, None)
    }

    pub fn put_manifest(
        &self,
        config: Descriptor,
        layers: Vec<Descriptor>,
        pad_to: Option<usize>,
    ) -> Descriptor {
        let manifest = Manifest {
            schema_version: 2,
            media_type: Some(MediaType::ImageManifest),
            config,
            layers,
            annotations: None,
        };
        self.put_json(MediaType::ImageManifest, &manifest, pad_to)
    }
}

pub fn fake_layer(i: usize, size: u64) -> Descriptor {
    Descriptor::new(
        MediaType::ImageLayerGzip,
        ContentDigest::from_content(format!("layer {}", i).as_bytes()),
        size,
    )
}

pub fn image_config(layers: &[Descriptor], history: Vec<History>) -> ImageConfig {
    ImageConfig {
        created: Some("2020-06-01T12:00:00Z".to_owned()),
        architecture: Some("amd64".to_owned()),
        os: Some("linux".to_owned()),
        rootfs: Some(Filesystem {
            fs_type: FS_TYPE.to_owned(),
            diff_ids: layers
                .iter()
                .map(|layer| ContentDigest::from_content(layer.digest.as_str().as_bytes()))
                .collect(),
        }),
        history,
        ..ImageConfig::default()
    }
}

pub fn history(created_by: &str, empty_layer: bool) -> History {
    History {
        created: Some("2020-06-01T12:00:00Z".to_owned()),
        created_by: Some(created_by.to_owned()),
        empty_layer,
        ..History::default()
    }
}
