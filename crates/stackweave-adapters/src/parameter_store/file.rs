//! Parameter store persisted as one JSON document.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::RwLock,
};

use stackweave_core::{
    application::{ApplicationError, ports::ParameterStore},
    domain::ParameterValue,
    error::StackweaveResult,
};
use tracing::debug;

/// A local stand-in for a cloud parameter store.
///
/// The whole map is kept in memory and rewritten on every `put`. Writes go
/// to a sibling temporary file first and are renamed into place.
#[derive(Debug)]
pub struct FileParameterStore {
    path: PathBuf,
    inner: RwLock<BTreeMap<String, ParameterValue>>,
}

impl FileParameterStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> StackweaveResult<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| ApplicationError::store("open", path.display().to_string(), e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(ApplicationError::store("open", path.display().to_string(), e).into()),
        };
        debug!(path = %path.display(), parameters = values.len(), "parameter store opened");

        Ok(Self {
            path,
            inner: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, ParameterValue>, name: &str) -> StackweaveResult<()> {
        let failed = |e: &dyn std::fmt::Display| ApplicationError::store("put", name, e);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| failed(&e))?;
        }
        let body = serde_json::to_string_pretty(values).map_err(|e| failed(&e))?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body).map_err(|e| failed(&e))?;
        fs::rename(&staging, &self.path).map_err(|e| failed(&e))?;
        Ok(())
    }
}

impl ParameterStore for FileParameterStore {
    fn get(&self, name: &str) -> StackweaveResult<Option<ParameterValue>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.get(name).cloned())
    }

    fn put(&self, name: &str, value: ParameterValue) -> StackweaveResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let mut staged = inner.clone();
        staged.insert(name.to_string(), value);
        self.persist(&staged, name)?;
        *inner = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn values_survive_reopening() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("parameters.json");

        let store = FileParameterStore::open(&path).unwrap();
        store.put("dev-network-vpcId", "vpc-1".into()).unwrap();
        store
            .put(
                "dev-network-isolatedSubnetIds",
                vec!["subnet-a".to_string(), "subnet-b".to_string()].into(),
            )
            .unwrap();

        let reopened = FileParameterStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("dev-network-vpcId").unwrap(),
            Some(ParameterValue::from("vpc-1"))
        );
        assert_eq!(
            reopened.get("dev-network-isolatedSubnetIds").unwrap(),
            Some(ParameterValue::StringList(vec!["subnet-a".into(), "subnet-b".into()]))
        );
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileParameterStore::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_a_store_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("parameters.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FileParameterStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("open"));
    }

    #[test]
    fn failed_write_leaves_the_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("parameters.json");
        let store = FileParameterStore::open(&path).unwrap();
        store.put("dev-network-clusterName", "dev-ecs-cluster".into()).unwrap();

        // A directory in the file's place makes the rename fail.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(store.put("dev-network-vpcId", "vpc-1".into()).is_err());
        assert_eq!(store.get("dev-network-vpcId").unwrap(), None);
        assert_eq!(
            store.get("dev-network-clusterName").unwrap(),
            Some(ParameterValue::from("dev-ecs-cluster"))
        );
    }
}
