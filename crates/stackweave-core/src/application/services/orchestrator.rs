//! Deployment Orchestrator - deploys stacks in dependency order.
//!
//! Deploying a stack means:
//! 1. Synthesize it against the current store
//! 2. Hand the rendered manifest to the sink
//! 3. Publish the stack's contracts
//!
//! Stacks run one at a time; the first failure stops the run.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        contracts::ContractStore,
        ports::{Manifest, ManifestSink},
        services::synthesis_service::SynthesisService,
    },
    domain::{DeploymentInputs, DeploymentPlan, StackKind},
    error::StackweaveResult,
};

/// What one deployed stack produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentReport {
    pub kind: StackKind,
    pub stack_name: String,
    pub region: String,
    pub resources: usize,
    pub parameters_published: usize,
}

pub struct Orchestrator {
    synthesis: SynthesisService,
    sink: Arc<dyn ManifestSink>,
}

impl Orchestrator {
    pub fn new(synthesis: SynthesisService, sink: Arc<dyn ManifestSink>) -> Self {
        Self { synthesis, sink }
    }

    pub fn contracts(&self) -> &ContractStore {
        self.synthesis.contracts()
    }

    /// The order `stacks` would be deployed in.
    pub fn plan(&self, stacks: &[StackKind]) -> StackweaveResult<DeploymentPlan> {
        Ok(DeploymentPlan::for_stacks(stacks)?)
    }

    /// Synthesize `kind` without touching the store or the sink.
    pub fn synthesize(&self, kind: StackKind, inputs: &DeploymentInputs) -> StackweaveResult<Manifest> {
        let stack = self.synthesis.synthesize(kind, inputs)?;
        Ok(Manifest::from(&stack))
    }

    /// Deploy a single stack. Its producers must already be deployed.
    #[instrument(skip_all, fields(stack = %kind))]
    pub fn deploy(&self, kind: StackKind, inputs: &DeploymentInputs) -> StackweaveResult<DeploymentReport> {
        let env = inputs.environment()?;
        let stack = self.synthesis.synthesize(kind, inputs)?;
        let manifest = Manifest::from(&stack);

        self.sink.write(&manifest)?;

        let mut published = 0;
        for contract in stack.publications() {
            published += self.contracts().publish_contract(&env, contract)?;
        }

        info!(
            name = stack.name(),
            region = stack.target().region(),
            parameters = published,
            "stack deployed"
        );

        Ok(DeploymentReport {
            kind,
            stack_name: manifest.stack_name,
            region: manifest.region,
            resources: stack.resources().count(),
            parameters_published: published,
        })
    }

    /// Deploy `stacks` in topological order.
    #[instrument(skip_all, fields(count = stacks.len()))]
    pub fn deploy_many(
        &self,
        stacks: &[StackKind],
        inputs: &DeploymentInputs,
    ) -> StackweaveResult<Vec<DeploymentReport>> {
        let plan = self.plan(stacks)?;
        let mut reports = Vec::with_capacity(plan.len());

        for &kind in plan.order() {
            match self.deploy(kind, inputs) {
                Ok(report) => reports.push(report),
                Err(err) => {
                    warn!(stack = %kind, deployed = reports.len(), error = %err, "deployment stopped");
                    return Err(err);
                }
            }
        }

        Ok(reports)
    }

    /// Deploy the whole estate.
    pub fn deploy_all(&self, inputs: &DeploymentInputs) -> StackweaveResult<Vec<DeploymentReport>> {
        self.deploy_many(&StackKind::ALL, inputs)
    }
}
