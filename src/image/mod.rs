//! Content identity: digests and media types

#[cfg(test)] mod tests;

mod digest;
mod media_type;

pub use digest::{ContentDigest, DigestAlgorithm};
pub(crate) use digest::ContentHasher;
pub use media_type::{media_types, MediaType};
