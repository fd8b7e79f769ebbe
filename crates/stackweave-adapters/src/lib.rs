//! Infrastructure adapters for Stackweave.
//!
//! This crate implements the ports defined in
//! `stackweave-core::application::ports`. Every filesystem access and every
//! source of randomness lives here.

pub mod manifest;
pub mod parameter_store;
pub mod secrets;

// Re-export commonly used adapters
pub use manifest::{LocalManifestWriter, MemoryManifestSink};
pub use parameter_store::{FileParameterStore, InMemoryParameterStore};
pub use secrets::RandomSecretGenerator;
