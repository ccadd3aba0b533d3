use std::collections::BTreeMap;
use std::sync::Arc;

use super::{ClasspathFingerprinter, FileCollectionFingerprinter, FingerprintError, NormalizerId, PathFingerprinter};

/// Frozen mapping from normalizer to the fingerprinter implementing it.
#[derive(Debug, Clone)]
pub struct NormalizerRegistry {
  fingerprinters: BTreeMap<NormalizerId, Arc<dyn FileCollectionFingerprinter>>,
}

impl NormalizerRegistry {
  pub fn builder() -> NormalizerRegistryBuilder {
    NormalizerRegistryBuilder::default()
  }

  /// A registry holding every built-in normalizer, without ignore patterns.
  pub fn with_defaults() -> Self {
    let defaults: [Arc<dyn FileCollectionFingerprinter>; 6] = [
      Arc::new(PathFingerprinter::absolute_path()),
      Arc::new(PathFingerprinter::relative_path()),
      Arc::new(PathFingerprinter::name_only()),
      Arc::new(PathFingerprinter::ignored_path()),
      Arc::new(ClasspathFingerprinter::runtime()),
      Arc::new(ClasspathFingerprinter::compile()),
    ];
    Self {
      fingerprinters: defaults.into_iter().map(|f| (f.normalizer(), f)).collect(),
    }
  }

  pub fn get(&self, normalizer: NormalizerId) -> Result<Arc<dyn FileCollectionFingerprinter>, FingerprintError> {
    self
      .fingerprinters
      .get(&normalizer)
      .cloned()
      .ok_or(FingerprintError::NotRegistered { normalizer })
  }

  /// Look a fingerprinter up by its normalizer name.
  pub fn get_by_name(&self, name: &str) -> Result<Arc<dyn FileCollectionFingerprinter>, FingerprintError> {
    self.get(name.parse()?)
  }

  pub fn normalizers(&self) -> impl Iterator<Item = NormalizerId> + '_ {
    self.fingerprinters.keys().copied()
  }
}

/// Configuration phase of a [`NormalizerRegistry`].
#[derive(Debug, Default)]
pub struct NormalizerRegistryBuilder {
  fingerprinters: Vec<Arc<dyn FileCollectionFingerprinter>>,
}

impl NormalizerRegistryBuilder {
  pub fn register(mut self, fingerprinter: Arc<dyn FileCollectionFingerprinter>) -> Self {
    self.fingerprinters.push(fingerprinter);
    self
  }

  pub fn build(self) -> Result<NormalizerRegistry, FingerprintError> {
    let mut fingerprinters = BTreeMap::new();
    for fingerprinter in self.fingerprinters {
      let normalizer = fingerprinter.normalizer();
      if fingerprinters.insert(normalizer, fingerprinter).is_some() {
        return Err(FingerprintError::DuplicateNormalizer { normalizer });
      }
    }
    Ok(NormalizerRegistry { fingerprinters })
  }
}
