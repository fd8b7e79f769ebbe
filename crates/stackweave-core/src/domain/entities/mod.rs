//! Manifest entities: stacks, resources, conditions and tags.

mod common;
mod condition;
mod resource;
mod stack;

pub use common::{Taggable, Tags};
pub use condition::Condition;
pub use resource::{DeletionPolicy, IdentityMinter, Resource, ResourceKind, attribute, reference};
pub use stack::{Output, Stack};
