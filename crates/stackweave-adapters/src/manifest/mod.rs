//! Manifest sink adapters.

mod local;
mod memory;

pub use local::{LocalManifestWriter, write_private};
pub use memory::MemoryManifestSink;
