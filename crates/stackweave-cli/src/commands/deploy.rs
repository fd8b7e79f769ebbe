//! `stackweave deploy` and `stackweave deploy-all`.

use std::io::IsTerminal as _;

use stackweave_core::{application::DeploymentReport, domain::StackKind};
use tracing::{info, instrument};

use crate::{
    cli::{DeployAllArgs, DeployArgs, global::GlobalArgs},
    commands::Runtime,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(stacks = args.stacks.len()))]
pub fn execute(
    args: DeployArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let inputs = config.deployment_inputs(&global.inputs)?;
    let runtime = Runtime::from_config(&config)?;

    let spinner = output.spinner(format!("Deploying {} stack(s)", args.stacks.len()));
    let result = runtime.orchestrator.deploy_many(&args.stacks, &inputs);
    spinner.finish_and_clear();

    report(&result?, &output)
}

#[instrument(skip_all)]
pub fn execute_all(
    args: DeployAllArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let inputs = config.deployment_inputs(&global.inputs)?;
    let runtime = Runtime::from_config(&config)?;

    let interactive = std::io::stdin().is_terminal() && !global.quiet && !output.is_json();
    if interactive && !args.yes {
        let plan = runtime.orchestrator.plan(&StackKind::ALL)?;
        output.header("Stacks to deploy:")?;
        for kind in plan.order() {
            output.print(&format!("  {kind}"))?;
        }
        if !confirm("Deploy the whole estate?")? {
            return Err(CliError::Cancelled);
        }
    }

    let spinner = output.spinner("Deploying the estate");
    let result = runtime.orchestrator.deploy_all(&inputs);
    spinner.finish_and_clear();

    let reports = result?;
    info!(stacks = reports.len(), "estate deployed");
    report(&reports, &output)
}

fn report(reports: &[DeploymentReport], output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        return output.json(reports);
    }
    for r in reports {
        output.success(&format!(
            "{} ({}) in {}: {} resources, {} parameters published",
            r.stack_name, r.kind, r.region, r.resources, r.parameters_published
        ))?;
    }
    Ok(())
}

#[cfg(feature = "interactive")]
fn confirm(prompt: &str) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation".into(),
            source: std::io::Error::other(e),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm(prompt: &str) -> CliResult<bool> {
    use std::io::{self, Write};

    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_ascii_lowercase();
    Ok(input == "y" || input == "yes")
}
