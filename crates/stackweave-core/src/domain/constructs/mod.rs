//! Stack constructs.
//!
//! Each construct is a pure function from an environment, a deploy target,
//! an immutable configuration and the bundles it consumes to a synthesized
//! [`Stack`]. Producers also record the bundle they publish on the stack.
//!
//! Configuration structs replace fluent builders: every field has a default
//! and every struct deserializes with `#[serde(default)]`, so a partial table
//! in the configuration file overrides only what it names.

pub mod bastion;
pub mod certificate;
pub mod database;
pub mod domain_records;
pub mod frontend;
pub mod identity;
pub mod network;
pub mod registry;
pub mod service;
pub mod storage;

use crate::domain::{
    entities::Stack, environment::ApplicationEnvironment, error::DomainError,
    topology::StackKind, value_objects::DeployTarget,
};

/// What every construct synthesizes against.
#[derive(Debug, Clone, Copy)]
pub struct ConstructContext<'a> {
    pub env: &'a ApplicationEnvironment,
    pub target: &'a DeployTarget,
}

impl<'a> ConstructContext<'a> {
    pub fn new(env: &'a ApplicationEnvironment, target: &'a DeployTarget) -> Self {
        Self { env, target }
    }

    /// An empty stack of `kind`, moved to its pinned region when it has one.
    pub(crate) fn new_stack(&self, kind: StackKind) -> Result<Stack, DomainError> {
        let target = match kind.pinned_region() {
            Some(region) => DeployTarget::new(self.target.account(), region)?,
            None => self.target.clone(),
        };
        Ok(Stack::new(kind, kind.stack_name(self.env), target))
    }

    /// Apply the environment tags and hand the stack back.
    pub(crate) fn finish(&self, mut stack: Stack) -> Stack {
        self.env.tag(&mut stack);
        stack
    }
}
