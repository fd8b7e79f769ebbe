//! Application layer for Stackweave.
//!
//! This layer contains:
//! - **Contracts**: typed publish/load over the parameter store port
//! - **Services**: synthesis and deployment orchestration
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: application-specific error types
//!
//! Resource shapes and naming rules live in `crate::domain`.

pub mod contracts;
pub mod error;
pub mod ports;
pub mod services;

pub use contracts::{ContractEntry, ContractStore};
pub use error::ApplicationError;
pub use ports::{Manifest, ManifestSink, ParameterStore, SecretGenerator};
pub use services::{ConstructSettings, DeploymentReport, Orchestrator, SynthesisService};
