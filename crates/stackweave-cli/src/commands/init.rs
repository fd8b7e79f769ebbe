//! `stackweave init`: create a default configuration file.

use std::path::PathBuf;

use stackweave_core::domain::InputName;

use crate::{
    cli::InitArgs,
    config::{AppConfig, LOCAL_CONFIG_FILE},
    error::{CliError, CliResult, write_failed},
    output::OutputManager,
};

pub fn execute(args: InitArgs, output: OutputManager) -> CliResult<()> {
    let config_path = if args.local {
        PathBuf::from(LOCAL_CONFIG_FILE)
    } else {
        AppConfig::config_path()
    };

    if config_path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            config_path.display(),
        ))?;
        return Ok(());
    }

    let toml = toml::to_string_pretty(&starter_config()).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise default config: {e}"),
        source: Some(Box::new(e)),
    })?;

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_failed(parent, e))?;
    }
    std::fs::write(&config_path, &toml).map_err(|e| write_failed(&config_path, e))?;

    output.success(&format!("Configuration created at {}", config_path.display()))?;
    Ok(())
}

/// Defaults plus the inputs every stack needs, ready to edit.
fn starter_config() -> AppConfig {
    let mut config = AppConfig::default();
    for (name, value) in [
        (InputName::Stage, "dev"),
        (InputName::ApplicationName, "finance-log"),
        (InputName::AccountId, "000000000000"),
        (InputName::Region, "eu-central-1"),
    ] {
        config.inputs.insert(name.as_str().to_string(), value.to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_config_resolves_an_environment() {
        let inputs = starter_config().deployment_inputs(&[]).unwrap();
        assert_eq!(inputs.environment().unwrap().to_string(), "dev-finance-log");
    }
}
