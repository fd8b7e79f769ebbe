//! The parameter contract store.
//!
//! Producers publish under composite names built by a [`KeyScheme`];
//! consumers load by family and key. Nothing else couples two stacks.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::application::ports::ParameterStore;
use crate::domain::{
    ApplicationEnvironment, Bundle, Contract, DomainError, Family, KeyScheme, ParameterSource,
    ParameterValue, parameters::ParameterKey, parameters::sentinel,
};
use crate::error::StackweaveResult;

/// One expected parameter of an environment and what the store holds for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractEntry {
    pub family: Family,
    pub key: &'static str,
    pub parameter: String,
    pub value: Option<ParameterValue>,
}

/// Typed access to the parameter store for one naming scheme.
#[derive(Clone)]
pub struct ContractStore {
    store: Arc<dyn ParameterStore>,
    scheme: KeyScheme,
}

impl ContractStore {
    pub fn new(store: Arc<dyn ParameterStore>, scheme: KeyScheme) -> Self {
        if scheme == KeyScheme::Legacy {
            warn!(
                "legacy key scheme in use: application-scoped families fold the \
                 application name into parameter names"
            );
        }
        Self { store, scheme }
    }

    pub fn scheme(&self) -> KeyScheme {
        self.scheme
    }

    /// Composite name a value of `family`/`key` is stored under.
    pub fn parameter_name(&self, env: &ApplicationEnvironment, family: Family, key: &str) -> String {
        self.scheme.parameter_name(env, family, key)
    }

    /// Overwrite one parameter.
    pub fn publish<K: ParameterKey>(
        &self,
        env: &ApplicationEnvironment,
        key: K,
        value: impl Into<ParameterValue>,
    ) -> StackweaveResult<()> {
        self.put(env, K::FAMILY, key.as_str(), value.into())
    }

    /// Publish an optional value, `None` as the absent sentinel.
    pub fn publish_optional<K: ParameterKey>(
        &self,
        env: &ApplicationEnvironment,
        key: K,
        value: Option<&str>,
    ) -> StackweaveResult<()> {
        self.publish(env, key, sentinel::encode_optional(value))
    }

    /// Load a string parameter.
    pub fn load<K: ParameterKey>(&self, env: &ApplicationEnvironment, key: K) -> StackweaveResult<String> {
        let name = self.parameter_name(env, K::FAMILY, key.as_str());
        match self.fetch(&name, K::FAMILY)? {
            ParameterValue::String(value) => Ok(value),
            ParameterValue::StringList(_) => Err(DomainError::ContractShapeMismatch {
                parameter: name,
                expected: "string",
            }
            .into()),
        }
    }

    /// Load a string parameter, mapping the absent sentinel to `None`.
    pub fn load_optional<K: ParameterKey>(
        &self,
        env: &ApplicationEnvironment,
        key: K,
    ) -> StackweaveResult<Option<String>> {
        Ok(sentinel::decode_optional(&self.load(env, key)?))
    }

    /// Load a list parameter.
    pub fn load_list<K: ParameterKey>(
        &self,
        env: &ApplicationEnvironment,
        key: K,
    ) -> StackweaveResult<Vec<String>> {
        let name = self.parameter_name(env, K::FAMILY, key.as_str());
        match self.fetch(&name, K::FAMILY)? {
            ParameterValue::StringList(items) => Ok(items),
            ParameterValue::String(_) => Err(DomainError::ContractShapeMismatch {
                parameter: name,
                expected: "string list",
            }
            .into()),
        }
    }

    /// Publish every entry of a bundle. Returns how many were written.
    #[instrument(skip_all, fields(env = %env, family = %contract.family()))]
    pub fn publish_contract(&self, env: &ApplicationEnvironment, contract: &Contract) -> StackweaveResult<usize> {
        let family = contract.family();
        let entries = contract.entries();
        let count = entries.len();
        for (key, value) in entries {
            self.put(env, family, key, value)?;
        }
        debug!(count, "contract published");
        Ok(count)
    }

    pub fn publish_bundle<B>(&self, env: &ApplicationEnvironment, bundle: B) -> StackweaveResult<usize>
    where
        B: Into<Contract>,
    {
        self.publish_contract(env, &bundle.into())
    }

    /// Load a whole bundle.
    ///
    /// Every key of the family is fetched first; the first key in contract
    /// order that was never published is reported.
    #[instrument(skip_all, fields(env = %env))]
    pub fn load_bundle<B: Bundle>(&self, env: &ApplicationEnvironment) -> StackweaveResult<B> {
        let family = <B::Key as ParameterKey>::FAMILY;
        let mut loaded = LoadedParameters {
            family,
            values: HashMap::new(),
            names: HashMap::new(),
        };

        for key in family.keys() {
            let name = self.parameter_name(env, family, key);
            if let Some(value) = self.store.get(&name)? {
                loaded.values.insert(key, value);
            }
            loaded.names.insert(key, name);
        }

        if let Some(missing) = family.keys().into_iter().find(|key| !loaded.values.contains_key(key)) {
            return Err(DomainError::MissingContract {
                parameter: loaded.name(missing),
                family: family.to_string(),
            }
            .into());
        }

        Ok(B::from_source(&loaded)?)
    }

    /// Every parameter an environment's contracts use, published or not.
    pub fn snapshot(&self, env: &ApplicationEnvironment) -> StackweaveResult<Vec<ContractEntry>> {
        let mut entries = Vec::new();
        for family in Family::ALL {
            for key in family.keys() {
                let parameter = self.parameter_name(env, family, key);
                let value = self.store.get(&parameter)?;
                entries.push(ContractEntry {
                    family,
                    key,
                    parameter,
                    value,
                });
            }
        }
        Ok(entries)
    }

    fn put(
        &self,
        env: &ApplicationEnvironment,
        family: Family,
        key: &str,
        value: ParameterValue,
    ) -> StackweaveResult<()> {
        let name = self.parameter_name(env, family, key);
        debug!(parameter = %name, shape = value.shape(), "publishing parameter");
        self.store.put(&name, value)
    }

    fn fetch(&self, name: &str, family: Family) -> StackweaveResult<ParameterValue> {
        self.store.get(name)?.ok_or_else(|| {
            DomainError::MissingContract {
                parameter: name.to_string(),
                family: family.to_string(),
            }
            .into()
        })
    }
}

/// One family's parameters, already fetched from the store.
struct LoadedParameters {
    family: Family,
    values: HashMap<&'static str, ParameterValue>,
    names: HashMap<&'static str, String>,
}

impl LoadedParameters {
    fn name(&self, key: &'static str) -> String {
        self.names.get(key).cloned().unwrap_or_else(|| key.to_string())
    }

    fn value(&self, family: Family, key: &'static str) -> Result<&ParameterValue, DomainError> {
        if family != self.family {
            return Err(DomainError::MissingContract {
                parameter: key.to_string(),
                family: family.to_string(),
            });
        }
        self.values.get(key).ok_or_else(|| DomainError::MissingContract {
            parameter: self.name(key),
            family: family.to_string(),
        })
    }
}

impl ParameterSource for LoadedParameters {
    fn string(&self, family: Family, key: &'static str) -> Result<String, DomainError> {
        self.value(family, key)?
            .as_string()
            .map(str::to_string)
            .ok_or_else(|| DomainError::ContractShapeMismatch {
                parameter: self.name(key),
                expected: "string",
            })
    }

    fn list(&self, family: Family, key: &'static str) -> Result<Vec<String>, DomainError> {
        self.value(family, key)?
            .as_list()
            .map(<[String]>::to_vec)
            .ok_or_else(|| DomainError::ContractShapeMismatch {
                parameter: self.name(key),
                expected: "string list",
            })
    }
}
