//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only sees the pieces handed to it
//! ([`ConstructSettings`], [`DeploymentInputs`], [`KeyScheme`]).
//!
//! # Resolution order (highest priority first)
//!
//! 1. `--input key=value` flags (applied by [`AppConfig::deployment_inputs`])
//! 2. `STACKWEAVE__*` environment variables, `__` separating sections
//!    (`STACKWEAVE__INPUTS__IMAGE_TAG`, `STACKWEAVE__STORE__KEY_SCHEME`)
//! 3. The TOML file (`--config` or [`AppConfig::config_path`])
//! 4. Built-in defaults

use std::{collections::BTreeMap, path::PathBuf, str::FromStr};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use stackweave_core::{
    application::ConstructSettings,
    domain::{
        DeploymentInputs, InputName, KeyScheme,
        constructs::{
            bastion::BastionConfig, database::DatabaseConfig, frontend::FrontendConfig,
            identity::IdentityConfig, network::NetworkConfig, registry::RegistryConfig,
            service::ServiceConfig, storage::StorageConfig,
        },
    },
};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// File name looked up in the working directory before the user config dir.
pub const LOCAL_CONFIG_FILE: &str = "stackweave.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Deployment inputs by name (`stage`, `region`, `image_tag`, ...).
    pub inputs: BTreeMap<String, String>,
    pub store: StoreConfig,
    pub output: OutputConfig,
    pub network: NetworkConfig,
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub registry: RegistryConfig,
    pub storage: StorageConfig,
    pub frontend: FrontendConfig,
    pub bastion: BastionConfig,
}

/// Where published parameters live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub key_scheme: KeyScheme,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".stackweave/parameters.json"),
            key_scheme: KeyScheme::Uniform,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub manifest_dir: PathBuf,
    pub no_color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            manifest_dir: PathBuf::from(".stackweave/manifests"),
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Layer defaults, the config file, and the environment.
    ///
    /// An explicit `config_file` must exist; the implicit locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::discover(), false),
        };
        debug!(path = %path.display(), required, "loading configuration");

        let settings = Config::builder()
            .add_source(Config::try_from(&Self::default()).context("encoding defaults")?)
            .add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix("STACKWEAVE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("reading {}", path.display()))?;

        settings
            .try_deserialize()
            .context("configuration does not match the expected layout")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `stackweave.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "stackweave", "stackweave")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// `./stackweave.toml` when present, the user config otherwise.
    fn discover() -> PathBuf {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() { local } else { Self::config_path() }
    }

    pub fn constructs(&self) -> ConstructSettings {
        ConstructSettings {
            network: self.network.clone(),
            service: self.service.clone(),
            database: self.database.clone(),
            identity: self.identity.clone(),
            registry: self.registry.clone(),
            storage: self.storage.clone(),
            frontend: self.frontend.clone(),
            bastion: self.bastion.clone(),
        }
    }

    /// The `[inputs]` table with `overrides` applied on top.
    pub fn deployment_inputs(&self, overrides: &[(String, String)]) -> CliResult<DeploymentInputs> {
        let mut inputs = DeploymentInputs::new();
        let layered = self
            .inputs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(overrides.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        for (key, value) in layered {
            let name = InputName::from_str(key).map_err(|_| CliError::UnknownInput {
                name: key.to_string(),
            })?;
            inputs.set(name, value);
        }
        Ok(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_use_the_uniform_scheme() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.store.key_scheme, KeyScheme::Uniform);
        assert!(cfg.inputs.is_empty());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stackweave.toml");
        fs::write(
            &path,
            r#"
[inputs]
stage = "prod"
application_name = "finance-log"

[store]
key_scheme = "legacy"

[registry]
max_image_count = 5
"#,
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.inputs.get("stage").map(String::as_str), Some("prod"));
        assert_eq!(cfg.store.key_scheme, KeyScheme::Legacy);
        assert_eq!(cfg.registry.max_image_count, 5);
        assert_eq!(cfg.database, DatabaseConfig::default());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn overrides_win_over_the_inputs_table() {
        let mut cfg = AppConfig::default();
        cfg.inputs.insert("stage".into(), "dev".into());
        cfg.inputs.insert("region".into(), "eu-central-1".into());

        let inputs = cfg
            .deployment_inputs(&[("stage".into(), "prod".into())])
            .unwrap();
        assert_eq!(inputs.optional(InputName::Stage), Some("prod"));
        assert_eq!(inputs.optional(InputName::Region), Some("eu-central-1"));
    }

    #[test]
    fn unknown_input_names_are_rejected() {
        let err = AppConfig::default()
            .deployment_inputs(&[("colour".into(), "blue".into())])
            .unwrap_err();
        assert!(matches!(err, CliError::UnknownInput { ref name } if name == "colour"));
    }

    #[test]
    fn defaults_survive_a_toml_round_trip() {
        let encoded = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let decoded: AppConfig = toml::from_str(&encoded).unwrap();
        assert_eq!(decoded, AppConfig::default());
    }
}
