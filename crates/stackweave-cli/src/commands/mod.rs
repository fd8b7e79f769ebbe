//! Command handlers. Each translates parsed arguments into calls on the
//! core services and renders the result; no deployment logic lives here.

pub mod completions;
pub mod config;
pub mod deploy;
pub mod init;
pub mod params;
pub mod plan;
pub mod synth;

use std::sync::Arc;

use stackweave_adapters::{FileParameterStore, LocalManifestWriter, RandomSecretGenerator};
use stackweave_core::application::{ContractStore, Orchestrator, SynthesisService};
use tracing::debug;

use crate::{config::AppConfig, error::CliResult};

/// The wired application: the file-backed store, the manifest directory,
/// and the orchestrator on top of them.
pub struct Runtime {
    pub store: Arc<FileParameterStore>,
    pub orchestrator: Orchestrator,
}

impl Runtime {
    pub fn from_config(config: &AppConfig) -> CliResult<Self> {
        let store = Arc::new(FileParameterStore::open(&config.store.path)?);
        let writer = LocalManifestWriter::new(&config.output.manifest_dir);
        debug!(
            store = %config.store.path.display(),
            manifests = %config.output.manifest_dir.display(),
            scheme = ?config.store.key_scheme,
            "runtime wired"
        );

        let contracts = ContractStore::new(store.clone(), config.store.key_scheme);
        let synthesis = SynthesisService::new(
            contracts,
            Arc::new(RandomSecretGenerator::new()),
            config.constructs(),
        );

        Ok(Self {
            store,
            orchestrator: Orchestrator::new(synthesis, Arc::new(writer)),
        })
    }
}
