use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::{
    environment::ApplicationEnvironment,
    error::DomainError,
    validation::require_non_empty,
    value_objects::{DeployTarget, RuntimeProfile},
};

/// Every named input a stack can be synthesized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputName {
    Stage,
    ApplicationName,
    AccountId,
    Region,
    RuntimeProfile,
    RepositoryName,
    ImageTag,
    ImageUrl,
    BackendCertificateArn,
    FrontendCertificateArn,
    KeyName,
    OperatorCidr,
    HostedZoneDomain,
    BackendDomain,
    FrontendDomain,
    ApiUrl,
    AppUrl,
    LoginDomainPrefix,
}

impl InputName {
    pub const ALL: [Self; 18] = [
        Self::Stage,
        Self::ApplicationName,
        Self::AccountId,
        Self::Region,
        Self::RuntimeProfile,
        Self::RepositoryName,
        Self::ImageTag,
        Self::ImageUrl,
        Self::BackendCertificateArn,
        Self::FrontendCertificateArn,
        Self::KeyName,
        Self::OperatorCidr,
        Self::HostedZoneDomain,
        Self::BackendDomain,
        Self::FrontendDomain,
        Self::ApiUrl,
        Self::AppUrl,
        Self::LoginDomainPrefix,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::ApplicationName => "application_name",
            Self::AccountId => "account_id",
            Self::Region => "region",
            Self::RuntimeProfile => "runtime_profile",
            Self::RepositoryName => "repository_name",
            Self::ImageTag => "image_tag",
            Self::ImageUrl => "image_url",
            Self::BackendCertificateArn => "backend_certificate_arn",
            Self::FrontendCertificateArn => "frontend_certificate_arn",
            Self::KeyName => "key_name",
            Self::OperatorCidr => "operator_cidr",
            Self::HostedZoneDomain => "hosted_zone_domain",
            Self::BackendDomain => "backend_domain",
            Self::FrontendDomain => "frontend_domain",
            Self::ApiUrl => "api_url",
            Self::AppUrl => "app_url",
            Self::LoginDomainPrefix => "login_domain_prefix",
        }
    }
}

impl fmt::Display for InputName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == wanted)
            .ok_or_else(|| DomainError::invalid_input(s, "not a recognised input name"))
    }
}

/// The named inputs supplied for one run.
///
/// Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentInputs(BTreeMap<InputName, String>);

impl DeploymentInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: InputName, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: InputName, value: impl Into<String>) {
        self.0.insert(name, value.into());
    }

    /// Merge `other` over `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: DeploymentInputs) {
        self.0.extend(other.0);
    }

    /// A required input, trimmed. Fails naming the input when blank or absent.
    pub fn require(&self, name: InputName) -> Result<&str, DomainError> {
        require_non_empty(self.0.get(&name).map(String::as_str), name.as_str())
    }

    /// An optional input, trimmed; blank is `None`.
    pub fn optional(&self, name: InputName) -> Option<&str> {
        self.0
            .get(&name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (InputName, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn environment(&self) -> Result<ApplicationEnvironment, DomainError> {
        ApplicationEnvironment::from_raw(
            self.optional(InputName::ApplicationName),
            self.optional(InputName::Stage),
        )
    }

    pub fn target(&self) -> Result<DeployTarget, DomainError> {
        DeployTarget::new(
            self.require(InputName::AccountId)?,
            self.require(InputName::Region)?,
        )
    }

    /// Falls back to the stage name when no profile is given.
    pub fn runtime_profile(&self) -> Result<RuntimeProfile, DomainError> {
        match self.optional(InputName::RuntimeProfile) {
            Some(profile) => profile.parse(),
            None => self.require(InputName::Stage)?.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::DeploymentStage;

    #[test]
    fn names_round_trip_through_strings() {
        for name in InputName::ALL {
            assert_eq!(name.as_str().parse::<InputName>().unwrap(), name);
        }
        assert_eq!(
            "login-domain-prefix".parse::<InputName>().unwrap(),
            InputName::LoginDomainPrefix
        );
    }

    #[test]
    fn blank_values_are_absent() {
        let inputs = DeploymentInputs::new().with(InputName::KeyName, "   ");
        assert_eq!(inputs.optional(InputName::KeyName), None);
        assert_eq!(
            inputs.require(InputName::KeyName).unwrap_err(),
            DomainError::missing_input("key_name")
        );
    }

    #[test]
    fn environment_requires_both_names() {
        let inputs = DeploymentInputs::new().with(InputName::Stage, "dev");
        assert_eq!(
            inputs.environment().unwrap_err(),
            DomainError::missing_input("application_name")
        );

        let inputs = inputs.with(InputName::ApplicationName, "finance-log");
        let env = inputs.environment().unwrap();
        assert_eq!(env.stage(), DeploymentStage::Dev);
    }

    #[test]
    fn merge_prefers_the_override() {
        let mut base = DeploymentInputs::new()
            .with(InputName::Region, "eu-central-1")
            .with(InputName::Stage, "dev");
        base.merge(DeploymentInputs::new().with(InputName::Stage, "prod"));

        assert_eq!(base.require(InputName::Stage).unwrap(), "prod");
        assert_eq!(base.require(InputName::Region).unwrap(), "eu-central-1");
    }

    #[test]
    fn runtime_profile_defaults_to_stage() {
        let inputs = DeploymentInputs::new().with(InputName::Stage, "staging");
        assert_eq!(inputs.runtime_profile().unwrap(), RuntimeProfile::Staging);

        let inputs = inputs.with(InputName::RuntimeProfile, "dev");
        assert_eq!(inputs.runtime_profile().unwrap(), RuntimeProfile::Dev);
    }
}
