//! Stackweave Core - Hexagonal Architecture Implementation
//!
//! Synthesizes and deploys a multi-stack cloud estate. Stacks never refer to
//! each other directly: producers publish typed contracts into a shared
//! parameter store and consumers load them by family and key.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         stackweave-cli (CLI)            │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │   (Orchestrator, SynthesisService,      │
//! │    ContractStore)                       │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (ParameterStore, ManifestSink, Secrets) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   stackweave-adapters (Infrastructure)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Environment, Contracts, Constructs,    │
//! │  Topology)                              │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stackweave_core::prelude::*;
//!
//! # fn run(store: Arc<dyn ParameterStore>, secrets: Arc<dyn SecretGenerator>, sink: Arc<dyn ManifestSink>) -> StackweaveResult<()> {
//! let contracts = ContractStore::new(store, KeyScheme::Uniform);
//! let synthesis = SynthesisService::new(contracts, secrets, ConstructSettings::default());
//! let orchestrator = Orchestrator::new(synthesis, sink);
//!
//! let inputs = DeploymentInputs::new()
//!     .with(InputName::Stage, "dev")
//!     .with(InputName::ApplicationName, "finance-log")
//!     .with(InputName::AccountId, "123456789012")
//!     .with(InputName::Region, "eu-central-1");
//! orchestrator.deploy(StackKind::Network, &inputs)?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod error;

pub mod prelude {
    pub use crate::application::{
        ConstructSettings, ContractStore, DeploymentReport, Manifest, ManifestSink, Orchestrator,
        ParameterStore, SecretGenerator, SynthesisService,
    };
    pub use crate::domain::{
        ApplicationEnvironment, DeployTarget, DeploymentInputs, DeploymentPlan, DeploymentStage,
        Family, InputName, KeyScheme, ParameterValue, Stack, StackKind,
    };
    pub use crate::error::{StackweaveError, StackweaveResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
