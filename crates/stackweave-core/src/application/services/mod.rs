//! Application services - orchestrate use cases.
//!
//! `SynthesisService` turns named inputs into one stack; `Orchestrator`
//! deploys stacks in dependency order through the ports.

pub mod orchestrator;
pub mod synthesis_service;

pub use orchestrator::{DeploymentReport, Orchestrator};
pub use synthesis_service::{ConstructSettings, SynthesisService};
