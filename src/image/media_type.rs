use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{convert::Infallible, fmt, str::FromStr};

pub mod media_types {
    pub const IMAGE_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
    pub const IMAGE_INDEX: &str = "application/vnd.oci.image.index.v1+json";
    pub const IMAGE_CONFIG: &str = "application/vnd.oci.image.config.v1+json";
    pub const IMAGE_LAYER: &str = "application/vnd.oci.image.layer.v1.tar";
    pub const IMAGE_LAYER_GZIP: &str = "application/vnd.oci.image.layer.v1.tar+gzip";
    pub const IMAGE_LAYER_ZSTD: &str = "application/vnd.oci.image.layer.v1.tar+zstd";
    pub const DOCKER_MANIFEST: &str = "application/vnd.docker.distribution.manifest.v2+json";
    pub const DOCKER_MANIFEST_LIST: &str =
        "application/vnd.docker.distribution.manifest.list.v2+json";
    pub const DOCKER_CONFIG: &str = "application/vnd.docker.container.image.v1+json";
    pub const DOCKER_LAYER_GZIP: &str = "application/vnd.docker.image.rootfs.diff.tar.gzip";
}

/// Media type string from a descriptor, sorted into the variants we recognize
///
/// Unrecognized strings are kept as [MediaType::Other], and every variant
/// serializes back to exactly the string it was parsed from.
#[derive(Clone, Eq, PartialEq, Hash)]
pub enum MediaType {
    ImageManifest,
    ImageIndex,
    ImageConfig,
    ImageLayer,
    ImageLayerGzip,
    ImageLayerZstd,
    DockerManifest,
    DockerManifestList,
    DockerConfig,
    DockerLayerGzip,
    Other(String),
}

impl MediaType {
    pub fn as_str(&self) -> &str {
        match self {
            MediaType::ImageManifest => media_types::IMAGE_MANIFEST,
            MediaType::ImageIndex => media_types::IMAGE_INDEX,
            MediaType::ImageConfig => media_types::IMAGE_CONFIG,
            MediaType::ImageLayer => media_types::IMAGE_LAYER,
            MediaType::ImageLayerGzip => media_types::IMAGE_LAYER_GZIP,
            MediaType::ImageLayerZstd => media_types::IMAGE_LAYER_ZSTD,
            MediaType::DockerManifest => media_types::DOCKER_MANIFEST,
            MediaType::DockerManifestList => media_types::DOCKER_MANIFEST_LIST,
            MediaType::DockerConfig => media_types::DOCKER_CONFIG,
            MediaType::DockerLayerGzip => media_types::DOCKER_LAYER_GZIP,
            MediaType::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            media_types::IMAGE_MANIFEST => MediaType::ImageManifest,
            media_types::IMAGE_INDEX => MediaType::ImageIndex,
            media_types::IMAGE_CONFIG => MediaType::ImageConfig,
            media_types::IMAGE_LAYER => MediaType::ImageLayer,
            media_types::IMAGE_LAYER_GZIP => MediaType::ImageLayerGzip,
            media_types::IMAGE_LAYER_ZSTD => MediaType::ImageLayerZstd,
            media_types::DOCKER_MANIFEST => MediaType::DockerManifest,
            media_types::DOCKER_MANIFEST_LIST => MediaType::DockerManifestList,
            media_types::DOCKER_CONFIG => MediaType::DockerConfig,
            media_types::DOCKER_LAYER_GZIP => MediaType::DockerLayerGzip,
            other => MediaType::Other(other.to_owned()),
        }
    }
}

impl FromStr for MediaType {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MediaType::parse(s))
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl Serialize for MediaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MediaType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(MediaType::parse(&String::deserialize(deserializer)?))
    }
}
