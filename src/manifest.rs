//! JSON documents found in an OCI image layout
//!
//! Reference: <https://github.com/opencontainers/image-spec>

use crate::image::{ContentDigest, MediaType};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Annotation key that names an index entry
pub const REF_NAME_ANNOTATION: &str = "org.opencontainers.image.ref.name";

/// Content of the `oci-layout` marker file
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LayoutMarker {
    #[serde(rename = "imageLayoutVersion")]
    pub image_layout_version: String,
}

pub const LAYOUT_VERSION: &str = "1.0.0";

/// Identifies and sizes a blob without containing it
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Descriptor {
    #[serde(rename = "mediaType")]
    pub media_type: MediaType,
    pub digest: ContentDigest,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

impl Descriptor {
    pub fn new(media_type: MediaType, digest: ContentDigest, size: u64) -> Self {
        Descriptor {
            media_type,
            digest,
            size,
            urls: None,
            annotations: None,
        }
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations
            .as_ref()
            .and_then(|map| map.get(key))
            .map(String::as_str)
    }

    /// The reference name this descriptor is tagged with in an index, if any
    pub fn ref_name(&self) -> Option<&str> {
        self.annotation(REF_NAME_ANNOTATION)
    }

    /// Builder-style helper to add one annotation
    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_owned(), value.to_owned());
        self
    }
}

/// Root document of an image layout, stored as `index.json`
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Index {
    #[serde(rename = "schemaVersion")]
    pub schema_version: u32,
    #[serde(rename = "mediaType", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    pub manifests: Vec<Descriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// Single-platform image manifest
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Manifest {
    #[serde(rename = "schemaVersion")]
    pub schema_version: u32,
    #[serde(rename = "mediaType", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    pub config: Descriptor,
    pub layers: Vec<Descriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// Image configuration, the blob a manifest's `config` descriptor points at
///
/// Only the fields needed to describe an image are decoded. Everything here
/// is optional, since the format treats most of it as advisory.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ImageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<RuntimeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rootfs: Option<Filesystem>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub history: Vec<History>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RuntimeConfig {
    #[serde(rename = "User", default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(rename = "Env", default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,
    #[serde(rename = "Entrypoint", default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,
    #[serde(rename = "Cmd", default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,
    #[serde(rename = "WorkingDir", default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    #[serde(rename = "Labels", default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

pub const FS_TYPE: &str = "layers";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Filesystem {
    #[serde(rename = "type")]
    pub fs_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub diff_ids: Vec<ContentDigest>,
}

/// Image tools written in Go emit `null` for empty lists
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry in the build history of an image
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct History {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub empty_layer: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "sha256:6c3c624b58dbbcd3c0dd82b4c53f04194d1247c6eebdaab7c610cf7d66709b3b";

    #[test]
    fn descriptor_ref_name() {
        let json = format!(
            r#"{{"mediaType":"{}","digest":"{}","size":7,"annotations":{{"{}":"v1"}}}}"#,
            crate::image::media_types::IMAGE_MANIFEST,
            DIGEST,
            REF_NAME_ANNOTATION
        );
        let descriptor: Descriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(descriptor.media_type, MediaType::ImageManifest);
        assert_eq!(descriptor.size, 7);
        assert_eq!(descriptor.ref_name(), Some("v1"));
        assert_eq!(serde_json::to_string(&descriptor).unwrap(), json);
    }

    #[test]
    fn descriptor_rejects_bad_digest() {
        let json = r#"{"mediaType":"x","digest":"sha256:zzz","size":1}"#;
        assert!(serde_json::from_str::<Descriptor>(json).is_err());
    }

    #[test]
    fn descriptor_rejects_negative_size() {
        let json = format!(r#"{{"mediaType":"x","digest":"{}","size":-1}}"#, DIGEST);
        assert!(serde_json::from_str::<Descriptor>(&json).is_err());
    }

    #[test]
    fn config_without_history() {
        let config: ImageConfig =
            serde_json::from_str(r#"{"architecture":"amd64","os":"linux"}"#).unwrap();
        assert_eq!(config.architecture.as_deref(), Some("amd64"));
        assert!(config.history.is_empty());
        assert!(config.rootfs.is_none());
    }

    #[test]
    fn config_with_null_lists() {
        let config: ImageConfig = serde_json::from_str(
            r#"{"os":"linux","history":null,"rootfs":{"type":"layers","diff_ids":null}}"#,
        )
        .unwrap();
        assert!(config.history.is_empty());
        assert!(config.rootfs.unwrap().diff_ids.is_empty());
    }

    #[test]
    fn config_history_fields() {
        let config: ImageConfig = serde_json::from_str(
            r#"{"history":[
                {"created":"2020-01-01T00:00:00Z","created_by":"/bin/sh -c #(nop) ADD file"},
                {"created_by":"/bin/sh -c #(nop) CMD [\"sh\"]","empty_layer":true,"comment":"hi"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(config.history.len(), 2);
        assert!(!config.history[0].empty_layer);
        assert!(config.history[1].empty_layer);
        assert_eq!(config.history[1].comment.as_deref(), Some("hi"));
    }
}
