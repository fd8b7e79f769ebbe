//! Parameter contracts: families, keys, values and typed bundles.

mod bundles;
mod keys;
pub mod sentinel;
mod value;

pub use bundles::{
    Bundle, Contract, DatabaseBundle, FrontendBundle, IdentityBundle, NetworkBundle,
    ParameterSource, RegistryBundle, StorageBundle,
};
pub use keys::{
    DatabaseKey, Family, FrontendKey, IdentityKey, KeyScheme, NetworkKey, ParameterKey,
    RegistryKey, StorageKey,
};
pub use value::ParameterValue;
