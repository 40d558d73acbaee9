//! Read-only access to OCI image layouts
//!
//! Open a layout with [Engine::open], resolve a tag with
//! [Engine::get_reference], then [stat] the manifest it names. Every blob is
//! verified against its digest as it is read.
//!
//! ```no_run
//! # fn main() -> Result<(), ocicas::CasError> {
//! let mut engine = ocicas::Engine::open("/var/lib/images/busybox")?;
//! let descriptor = engine.get_reference("latest")?;
//! let summary = ocicas::stat(&engine, &descriptor)?;
//! summary.render_human(std::io::stdout())?;
//! engine.close()?;
//! # Ok(())
//! # }
//! ```

#[macro_use] extern crate lazy_static;
#[macro_use] extern crate serde;

pub mod errors;
pub mod image;
pub mod manifest;

mod engine;
mod index;
mod layout;
mod stat;
mod storage;
mod walk;

pub use crate::{
    engine::{Engine, EngineBuilder, DEFAULT_MAX_DOCUMENT_SIZE},
    errors::{BlobRole, CasError},
    image::{ContentDigest, DigestAlgorithm, MediaType},
    index::resolve,
    manifest::{Descriptor, Index, Manifest, REF_NAME_ANNOTATION},
    stat::{stat, HistoryStat, StatSummary},
    storage::BlobReader,
    walk::ImageGraph,
};
