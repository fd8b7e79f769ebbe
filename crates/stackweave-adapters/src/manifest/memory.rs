//! Collects manifests in memory.

use std::sync::{Arc, RwLock};

use stackweave_core::{
    application::{ApplicationError, Manifest, ManifestSink},
    error::StackweaveResult,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryManifestSink {
    inner: Arc<RwLock<Vec<Manifest>>>,
}

impl MemoryManifestSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifests in the order they were written.
    pub fn manifests(&self) -> StackweaveResult<Vec<Manifest>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.clone())
    }

    pub fn stack_names(&self) -> StackweaveResult<Vec<String>> {
        Ok(self.manifests()?.into_iter().map(|m| m.stack_name).collect())
    }
}

impl ManifestSink for MemoryManifestSink {
    fn write(&self, manifest: &Manifest) -> StackweaveResult<()> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?
            .push(manifest.clone());
        Ok(())
    }
}
