//! `stackweave params`: inspect what stacks have published.

use stackweave_core::application::{ContractEntry, ParameterStore};

use crate::{
    cli::{ParamsCommands, global::GlobalArgs},
    commands::Runtime,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(
    cmd: ParamsCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let runtime = Runtime::from_config(&config)?;

    match cmd {
        ParamsCommands::List { family } => {
            let inputs = config.deployment_inputs(&global.inputs)?;
            let env = inputs
                .environment()
                .map_err(stackweave_core::error::StackweaveError::from)?;
            let entries: Vec<ContractEntry> = runtime
                .orchestrator
                .contracts()
                .snapshot(&env)?
                .into_iter()
                .filter(|e| family.is_none_or(|f| e.family == f))
                .collect();

            if output.is_json() {
                return output.json(&entries);
            }

            output.header(&format!("Parameters for {env}:"))?;
            for entry in &entries {
                let value = entry
                    .value
                    .as_ref()
                    .map_or_else(|| "<unset>".to_string(), ToString::to_string);
                output.print(&format!("  {:<48} {value}", entry.parameter))?;
            }
            let published = entries.iter().filter(|e| e.value.is_some()).count();
            output.info(&format!("{published} of {} published", entries.len()))?;
        }

        ParamsCommands::Get { name } => {
            let value = runtime
                .store
                .get(&name)?
                .ok_or_else(|| CliError::ParameterNotFound { name: name.clone() })?;
            if output.is_json() {
                return output.json(&value);
            }
            output.data(&value.to_string())?;
        }
    }

    Ok(())
}
