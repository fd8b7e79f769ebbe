//! Writes each manifest to `<dir>/<stack-name>.template.json`.
//!
//! The database manifest carries the generated master password, so files
//! are created readable by the owner only.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use stackweave_core::{
    application::{ApplicationError, Manifest, ManifestSink},
    error::StackweaveResult,
};
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct LocalManifestWriter {
    dir: PathBuf,
}

impl LocalManifestWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the manifest for `stack_name` lands.
    pub fn path_for(&self, stack_name: &str) -> PathBuf {
        self.dir.join(format!("{stack_name}.template.json"))
    }
}

impl ManifestSink for LocalManifestWriter {
    #[instrument(skip_all, fields(stack = %manifest.stack_name))]
    fn write(&self, manifest: &Manifest) -> StackweaveResult<()> {
        let failed = |reason: String| ApplicationError::ManifestWriteFailed {
            stack: manifest.stack_name.clone(),
            reason,
        };

        fs::create_dir_all(&self.dir)
            .map_err(|e| failed(format!("cannot create {}: {e}", self.dir.display())))?;

        let body = serde_json::to_string_pretty(manifest).map_err(|e| failed(e.to_string()))?;
        let path = self.path_for(&manifest.stack_name);
        write_private(&path, body.as_bytes())
            .map_err(|e| failed(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), "manifest written");
        Ok(())
    }
}

/// Write `body` to `path`, leaving the file readable by its owner only.
pub fn write_private(path: &Path, body: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        // `mode` only applies on creation.
        if path.exists() {
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
    }
    options.open(path)?.write_all(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stackweave_core::domain::StackKind;
    use tempfile::TempDir;

    fn manifest() -> Manifest {
        Manifest {
            stack_name: "dev-network-stack".into(),
            kind: StackKind::Network,
            account: "123456789012".into(),
            region: "eu-central-1".into(),
            template: json!({ "Resources": {} }),
        }
    }

    #[test]
    fn writes_one_file_per_stack() {
        let dir = TempDir::new().unwrap();
        let writer = LocalManifestWriter::new(dir.path().join("out"));
        writer.write(&manifest()).unwrap();

        let written = fs::read_to_string(writer.path_for("dev-network-stack")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["stack_name"], "dev-network-stack");
        assert_eq!(value["region"], "eu-central-1");
        assert!(value["template"]["Resources"].is_object());
    }

    #[cfg(unix)]
    #[test]
    fn manifests_are_readable_by_the_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let writer = LocalManifestWriter::new(dir.path());
        let path = writer.path_for("dev-network-stack");
        fs::write(&path, "stale").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        writer.write(&manifest()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(fs::read_to_string(&path).unwrap().contains("dev-network-stack"));
    }

    #[test]
    fn unwritable_directory_reports_the_stack() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let err = LocalManifestWriter::new(&blocker).write(&manifest()).unwrap_err();
        assert!(err.to_string().contains("dev-network-stack"));
    }
}
