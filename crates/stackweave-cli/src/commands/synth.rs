//! `stackweave synth`: render one stack without deploying it.

use std::fs;

use stackweave_adapters::manifest::write_private;
use tracing::instrument;

use crate::{
    cli::{SynthArgs, global::GlobalArgs},
    commands::Runtime,
    config::AppConfig,
    error::{CliResult, IntoCli, write_failed},
    output::OutputManager,
};

#[instrument(skip_all, fields(stack = %args.stack))]
pub fn execute(
    args: SynthArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let inputs = config.deployment_inputs(&global.inputs)?;
    let runtime = Runtime::from_config(&config)?;
    let manifest = runtime.orchestrator.synthesize(args.stack, &inputs)?;

    match args.out {
        Some(path) => {
            let body = serde_json::to_string_pretty(&manifest)
                .with_cli_context(|| "failed to encode manifest")?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| write_failed(parent, e))?;
            }
            write_private(&path, body.as_bytes()).map_err(|e| write_failed(&path, e))?;
            output.success(&format!(
                "Synthesized {} to {}",
                manifest.stack_name,
                path.display()
            ))?;
        }
        None => output.json(&manifest)?,
    }
    Ok(())
}
