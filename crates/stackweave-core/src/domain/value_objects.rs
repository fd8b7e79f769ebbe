//! Domain value objects: DeploymentStage, RuntimeProfile, DeployTarget.
//!
//! # Design
//!
//! These are pure value types with equality-by-value and no identity. This
//! file's only job is to define the types, their string representations,
//! and their `FromStr` parsers.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── DeploymentStage ──────────────────────────────────────────────────────────

/// The environment tier a stack set is deployed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStage {
    Dev,
    Staging,
    Prod,
}

impl DeploymentStage {
    pub const ALL: [Self; 3] = [Self::Dev, Self::Staging, Self::Prod];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for DeploymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentStage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::missing_input("stage"));
        }
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DomainError::UnknownStage(trimmed.to_string()))
    }
}

// ── RuntimeProfile ───────────────────────────────────────────────────────────

/// Profile selector handed to the running workload.
///
/// Kept separate from [`DeploymentStage`]: a staging deployment may run the
/// `dev` profile while a bug is being chased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeProfile {
    Dev,
    Staging,
    Prod,
}

impl RuntimeProfile {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for RuntimeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeProfile {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "staging" => Ok(Self::Staging),
            "prod" => Ok(Self::Prod),
            other => Err(DomainError::invalid_input(
                "runtime_profile",
                format!("unknown runtime profile: {other}"),
            )),
        }
    }
}

// ── DeployTarget ─────────────────────────────────────────────────────────────

/// The cloud account and region a stack is deployed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeployTarget {
    account: String,
    region: String,
}

impl DeployTarget {
    /// Build a deploy target, rejecting blank account or region.
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Result<Self, DomainError> {
        let account = account.into();
        let region = region.into();
        let account = crate::domain::validation::require_non_empty(Some(&account), "account_id")?;
        let region = crate::domain::validation::require_non_empty(Some(&region), "region")?;
        Ok(Self {
            account: account.to_string(),
            region: region.to_string(),
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Availability zone names used by the network, `{region}a`, `{region}b`, ...
    pub fn availability_zones(&self, count: usize) -> Vec<String> {
        (b'a'..=b'z')
            .take(count)
            .map(|suffix| format!("{}{}", self.region, suffix as char))
            .collect()
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account, self.region)
    }
}
