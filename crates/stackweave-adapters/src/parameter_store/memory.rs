//! In-memory parameter store.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use stackweave_core::{
    application::{ApplicationError, ports::ParameterStore},
    domain::ParameterValue,
    error::StackweaveResult,
};

/// Thread-safe in-memory parameter store.
///
/// Clones share the same map, so a test can keep a handle while the
/// orchestrator owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryParameterStore {
    inner: Arc<RwLock<BTreeMap<String, ParameterValue>>>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored parameters.
    pub fn len(&self) -> StackweaveResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StackweaveResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Every stored `(name, value)` pair, ordered by name.
    pub fn entries(&self) -> StackweaveResult<Vec<(String, ParameterValue)>> {
        Ok(self
            .read()?
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect())
    }

    fn read(
        &self,
    ) -> StackweaveResult<std::sync::RwLockReadGuard<'_, BTreeMap<String, ParameterValue>>> {
        self.inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }
}

impl ParameterStore for InMemoryParameterStore {
    fn get(&self, name: &str) -> StackweaveResult<Option<ParameterValue>> {
        Ok(self.read()?.get(name).cloned())
    }

    fn put(&self, name: &str, value: ParameterValue) -> StackweaveResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.insert(name.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_overwrites() {
        let store = InMemoryParameterStore::new();
        store.put("dev-network-vpcId", "vpc-1".into()).unwrap();
        store.put("dev-network-vpcId", "vpc-2".into()).unwrap();

        assert_eq!(
            store.get("dev-network-vpcId").unwrap(),
            Some(ParameterValue::from("vpc-2"))
        );
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn unknown_name_is_none() {
        let store = InMemoryParameterStore::new();
        assert_eq!(store.get("dev-network-vpcId").unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn clones_share_state() {
        let store = InMemoryParameterStore::new();
        let handle = store.clone();
        store
            .put("dev-network-publicSubnetIds", vec!["a".to_string()].into())
            .unwrap();
        assert_eq!(handle.entries().unwrap().len(), 1);
    }
}
