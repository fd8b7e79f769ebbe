// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Stackweave.
//!
//! Everything in here is pure: constructs take an environment, a target,
//! immutable configuration and the bundles they consume, and hand back a
//! synthesized [`Stack`]. Reading and writing the parameter store, writing
//! manifests and generating secrets all happen behind the ports defined in
//! the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No I/O**: no filesystem, network or parameter store calls
//! - **Deterministic**: identical inputs render identical manifests
//! - **Typed contracts**: families, keys and bundles are enums and structs,
//!   never loose strings
//! - **Explicit topology**: stack dependencies are declared, not discovered
//!
// Public API
pub mod constructs;
pub mod entities;
pub mod environment;
pub mod error;
pub mod inputs;
pub mod parameters;
pub mod retention;
pub mod topology;
pub mod value_objects;

// Private implementation details
mod validation;

pub use entities::{
    Condition, DeletionPolicy, IdentityMinter, Output, Resource, ResourceKind, Stack, Taggable,
    Tags,
};
pub use environment::ApplicationEnvironment;
pub use error::{DomainError, ErrorCategory};
pub use inputs::{DeploymentInputs, InputName};
pub use parameters::{
    Bundle, Contract, DatabaseBundle, Family, FrontendBundle, IdentityBundle, KeyScheme,
    NetworkBundle, ParameterSource, ParameterValue, RegistryBundle, StorageBundle,
};
pub use retention::{ImageRecord, RetentionRule};
pub use topology::{DeploymentPlan, StackKind};
pub use validation::{DomainValidator, require_non_empty};
pub use value_objects::{DeployTarget, DeploymentStage, RuntimeProfile};
