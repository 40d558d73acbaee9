//! Dereferencing a manifest descriptor into the documents it points at

use crate::{
    engine::Engine,
    errors::{BlobRole, CasError},
    image::MediaType,
    manifest::{Descriptor, ImageConfig, Manifest},
};
use serde::de::Error as _;

/// The only manifest schema version we can read
const MANIFEST_SCHEMA_VERSION: u32 = 2;

/// Everything reachable from one manifest descriptor, without layer content
#[derive(Clone, Debug)]
pub struct ImageGraph {
    pub manifest: Manifest,
    pub config: ImageConfig,
    pub layers: Vec<Descriptor>,
}

impl Engine {
    /// Load the manifest and config a descriptor points at
    ///
    /// Only single-platform image manifests are walked. Any other media type,
    /// manifest lists included, is rejected before anything is read. Both
    /// documents are digest-verified; layers are described from the manifest
    /// alone and their content is never opened.
    pub fn walk(&self, descriptor: &Descriptor) -> Result<ImageGraph, CasError> {
        match descriptor.media_type {
            MediaType::ImageManifest => (),
            ref other => {
                return Err(CasError::UnsupportedMediaType {
                    role: BlobRole::Manifest,
                    media_type: other.clone(),
                })
            }
        }

        let manifest = self.load_manifest(descriptor)?;
        let config = self.load_config(&manifest.config)?;
        log::debug!(
            "walked {}: config {}, {} layers",
            descriptor.digest,
            manifest.config.digest,
            manifest.layers.len()
        );
        Ok(ImageGraph {
            layers: manifest.layers.clone(),
            manifest,
            config,
        })
    }

    fn load_manifest(&self, descriptor: &Descriptor) -> Result<Manifest, CasError> {
        let content = self.read_document(descriptor, BlobRole::Manifest)?;
        log::trace!("raw json manifest, {}", String::from_utf8_lossy(&content));
        let malformed = |source| CasError::MalformedManifest {
            digest: descriptor.digest.clone(),
            source,
        };
        let manifest: Manifest = serde_json::from_slice(&content).map_err(malformed)?;
        if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
            return Err(malformed(serde_json::Error::custom(format!(
                "unsupported schemaVersion {}",
                manifest.schema_version
            ))));
        }
        // a manifest may repeat its own media type, and it must agree
        match &manifest.media_type {
            None | Some(MediaType::ImageManifest) => Ok(manifest),
            Some(other) => Err(CasError::UnsupportedMediaType {
                role: BlobRole::Manifest,
                media_type: other.clone(),
            }),
        }
    }

    fn load_config(&self, descriptor: &Descriptor) -> Result<ImageConfig, CasError> {
        let content = self.read_document(descriptor, BlobRole::Config)?;
        log::trace!("raw json config, {}", String::from_utf8_lossy(&content));
        serde_json::from_slice(&content).map_err(|err| CasError::MalformedConfig {
            digest: descriptor.digest.clone(),
            reason: err.to_string(),
        })
    }
}
