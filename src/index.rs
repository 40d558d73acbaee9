//! Resolving reference names through the root index

use crate::{
    engine::Engine,
    errors::CasError,
    manifest::{Descriptor, Index},
    storage::StorageKey,
};

impl Engine {
    /// Load and parse `index.json`
    ///
    /// The index is read fresh on every call; nothing is cached on the engine.
    pub fn index(&self) -> Result<Index, CasError> {
        let storage = self.storage()?;
        let content = match storage.read_file(&StorageKey::Index, self.max_document_size())? {
            Some(content) => content,
            None => {
                return Err(CasError::InvalidLayout {
                    path: storage.path().to_path_buf(),
                    reason: "missing index.json".to_owned(),
                })
            }
        };
        log::trace!("raw json index, {}", String::from_utf8_lossy(&content));
        serde_json::from_slice(&content).map_err(CasError::MalformedIndex)
    }

    /// Resolve a reference name to the one descriptor that carries it
    pub fn get_reference(&self, name: &str) -> Result<Descriptor, CasError> {
        let descriptor = resolve(&self.index()?, name)?;
        log::debug!("reference {:?} -> {}", name, descriptor.digest);
        Ok(descriptor)
    }

    /// All reference names in the index, sorted, each listed once
    pub fn list_references(&self) -> Result<Vec<String>, CasError> {
        let mut names: Vec<String> = self
            .index()?
            .manifests
            .iter()
            .filter_map(|descriptor| descriptor.ref_name().map(str::to_owned))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Find the index entry named `name`
///
/// The layout format doesn't stop two entries from sharing a name. Rather
/// than pick one, that case is reported as [CasError::AmbiguousReference].
pub fn resolve(index: &Index, name: &str) -> Result<Descriptor, CasError> {
    let mut matches = index
        .manifests
        .iter()
        .filter(|descriptor| descriptor.ref_name() == Some(name));
    match (matches.next(), matches.count()) {
        (None, _) => Err(CasError::ReferenceNotFound(name.to_owned())),
        (Some(descriptor), 0) => Ok(descriptor.clone()),
        (Some(_), others) => Err(CasError::AmbiguousReference {
            name: name.to_owned(),
            count: others + 1,
        }),
    }
}
