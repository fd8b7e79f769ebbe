//! Application ports (traits) for external dependencies.
//!
//! Adapters in `stackweave-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: called by the application, implemented by
//!   infrastructure
//!   - `ParameterStore`: named parameter persistence
//!   - `ManifestSink`: where rendered stack manifests go
//!   - `SecretGenerator`: generated credentials

pub mod output;

pub use output::{Manifest, ManifestSink, ParameterStore, SecretGenerator};

#[cfg(test)]
pub use output::{MockManifestSink, MockParameterStore, MockSecretGenerator};
