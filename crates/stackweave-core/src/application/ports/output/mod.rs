//! Driven (output) ports - implemented by infrastructure.

use serde::Serialize;
use serde_json::Value;

use crate::domain::{
    ParameterValue, Stack, StackKind, constructs::database::PasswordPolicy,
};
use crate::error::StackweaveResult;

/// A rendered stack, ready to hand to a deployment engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub stack_name: String,
    pub kind: StackKind,
    pub account: String,
    pub region: String,
    pub template: Value,
}

impl From<&Stack> for Manifest {
    fn from(stack: &Stack) -> Self {
        Self {
            stack_name: stack.name().to_string(),
            kind: stack.kind(),
            account: stack.target().account().to_string(),
            region: stack.target().region().to_string(),
            template: stack.render(),
        }
    }
}

/// Port for the shared parameter store.
///
/// Implemented by:
/// - `stackweave_adapters::parameter_store::InMemoryParameterStore` (testing)
/// - `stackweave_adapters::parameter_store::FileParameterStore` (local JSON file)
///
/// `put` overwrites. `get` returns `None` for a name that was never put.
#[cfg_attr(test, mockall::automock)]
pub trait ParameterStore: Send + Sync {
    fn get(&self, name: &str) -> StackweaveResult<Option<ParameterValue>>;

    fn put(&self, name: &str, value: ParameterValue) -> StackweaveResult<()>;
}

/// Port for rendered manifests.
///
/// Implemented by:
/// - `stackweave_adapters::manifest::LocalManifestWriter` (one JSON file per stack)
/// - `stackweave_adapters::manifest::MemoryManifestSink` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait ManifestSink: Send + Sync {
    fn write(&self, manifest: &Manifest) -> StackweaveResult<()>;
}

/// Port for generated credentials.
#[cfg_attr(test, mockall::automock)]
pub trait SecretGenerator: Send + Sync {
    /// A fresh secret satisfying `policy`.
    fn generate(&self, policy: &PasswordPolicy) -> StackweaveResult<String>;
}
