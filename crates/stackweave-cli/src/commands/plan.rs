//! `stackweave plan`: print the deployment order.

use serde::Serialize;
use stackweave_core::{
    domain::{DeploymentInputs, DeploymentPlan, InputName, StackKind},
    error::StackweaveError,
};

use crate::{
    cli::{PlanArgs, global::GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct PlannedStack {
    position: usize,
    stack: StackKind,
    /// Deployed name; absent until stage and application name are known.
    name: Option<String>,
    region: Option<String>,
    reads: Vec<StackKind>,
}

pub fn execute(
    args: PlanArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let inputs = config.deployment_inputs(&global.inputs)?;
    let requested = if args.stacks.is_empty() {
        StackKind::ALL.to_vec()
    } else {
        args.stacks
    };

    let plan = DeploymentPlan::for_stacks(&requested).map_err(StackweaveError::from)?;
    let rows = planned(plan.order(), &inputs);

    if output.is_json() {
        return output.json(&rows);
    }

    output.header("Deployment order:")?;
    for row in &rows {
        let reads = if row.reads.is_empty() {
            String::new()
        } else {
            let names: Vec<_> = row.reads.iter().map(StackKind::as_str).collect();
            format!("  <- {}", names.join(", "))
        };
        output.print(&format!(
            "  {:>2}. {:<22} {:<38} {}{}",
            row.position,
            row.stack.as_str(),
            row.name.as_deref().unwrap_or("-"),
            row.region.as_deref().unwrap_or("-"),
            reads,
        ))?;
    }
    Ok(())
}

fn planned(order: &[StackKind], inputs: &DeploymentInputs) -> Vec<PlannedStack> {
    let env = inputs.environment().ok();
    let region = inputs.optional(InputName::Region);

    order
        .iter()
        .enumerate()
        .map(|(i, &stack)| PlannedStack {
            position: i + 1,
            stack,
            name: env.as_ref().map(|env| stack.stack_name(env)),
            region: stack.pinned_region().or(region).map(str::to_string),
            reads: stack
                .reads()
                .iter()
                .copied()
                .filter(|r| order.contains(r))
                .collect(),
        })
        .collect()
}
