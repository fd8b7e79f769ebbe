//! Parameter store adapters.

mod file;
mod memory;

pub use file::FileParameterStore;
pub use memory::InMemoryParameterStore;
