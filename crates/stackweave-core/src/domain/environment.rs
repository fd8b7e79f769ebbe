//! Environment identity: canonical names and tags for one application stage.

use std::fmt;

use tracing::debug;

use crate::domain::{
    entities::Taggable, error::DomainError, validation::require_non_empty,
    value_objects::DeploymentStage,
};

/// Tag key carrying the deployment stage.
pub const STAGE_TAG: &str = "deployment";
/// Tag key carrying the application name.
pub const APPLICATION_TAG: &str = "application";

/// The logical environment an estate is synthesized for.
///
/// Pure and deterministic: the same `(application, stage)` always yields the
/// same names. Exists only while stacks are being constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplicationEnvironment {
    application_name: String,
    stage: DeploymentStage,
}

impl ApplicationEnvironment {
    /// Create an environment, failing fast on a blank application name.
    pub fn new(application_name: &str, stage: DeploymentStage) -> Result<Self, DomainError> {
        let application_name = require_non_empty(Some(application_name), "application_name")?;
        Ok(Self {
            application_name: application_name.to_string(),
            stage,
        })
    }

    /// Create an environment from raw input strings.
    ///
    /// Both values are required; the stage must name a known tier.
    pub fn from_raw(application_name: Option<&str>, stage: Option<&str>) -> Result<Self, DomainError> {
        let stage: DeploymentStage = require_non_empty(stage, "stage")?.parse()?;
        let application_name = require_non_empty(application_name, "application_name")?;
        Self::new(application_name, stage)
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn stage(&self) -> DeploymentStage {
        self.stage
    }

    /// `{stage}-{application}-{suffix}` with every character outside
    /// `[a-zA-Z0-9-]` stripped.
    pub fn prefix(&self, suffix: &str) -> String {
        sanitize(&format!("{}-{}-{}", self.stage, self.application_name, suffix))
    }

    /// Like [`prefix`](Self::prefix) but bounded to `limit` characters.
    ///
    /// An over-long name keeps its **last** `limit` characters: the suffix
    /// differs between resources while the prefix is shared, so the tail is
    /// the part that keeps names apart.
    pub fn prefix_limited(&self, suffix: &str, limit: usize) -> String {
        let name = self.prefix(suffix);
        let length = name.chars().count();
        if length <= limit {
            return name;
        }

        debug!(name = %name, limit, "Truncating resource name to its last characters");
        name.chars().skip(length - limit).collect()
    }

    /// Apply the two environment tags. Applying twice changes nothing.
    pub fn tag<T: Taggable + ?Sized>(&self, target: &mut T) {
        target.set_tag(STAGE_TAG, self.stage.as_str());
        target.set_tag(APPLICATION_TAG, &self.application_name);
    }
}

impl fmt::Display for ApplicationEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&sanitize(&format!("{}-{}", self.stage, self.application_name)))
    }
}

/// Strip every character outside `[a-zA-Z0-9-]`.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Tags;

    fn env() -> ApplicationEnvironment {
        ApplicationEnvironment::new("finance-log", DeploymentStage::Dev).unwrap()
    }

    #[test]
    fn display_is_stage_then_application() {
        assert_eq!(env().to_string(), "dev-finance-log");
    }

    #[test]
    fn prefix_is_deterministic() {
        assert_eq!(env().prefix("log-group"), env().prefix("log-group"));
        assert_eq!(env().prefix("log-group"), "dev-finance-log-log-group");
    }

    #[test]
    fn prefix_strips_disallowed_characters() {
        let env = ApplicationEnvironment::new("finance_log app!", DeploymentStage::Prod).unwrap();
        assert_eq!(env.prefix("db.sg/1"), "prod-financelogapp-dbsg1");
        assert!(
            env.prefix("a b*c")
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        );
    }

    #[test]
    fn prefix_limited_keeps_short_names() {
        let name = env().prefix_limited("tg", 32);
        assert_eq!(name, "dev-finance-log-tg");
    }

    #[test]
    fn prefix_limited_keeps_the_tail() {
        let full = env().prefix("a-really-long-target-group-suffix");
        let limited = env().prefix_limited("a-really-long-target-group-suffix", 32);

        assert_eq!(limited.len(), 32);
        assert_eq!(limited, full[full.len() - 32..]);
        assert!(limited.ends_with("target-group-suffix"));
    }

    #[test]
    fn prefix_limited_boundary_is_inclusive() {
        let full = env().prefix("x");
        assert_eq!(env().prefix_limited("x", full.len()), full);
        assert_eq!(env().prefix_limited("x", full.len() - 1), full[1..]);
    }

    #[test]
    fn blank_application_name_fails_fast() {
        let err = ApplicationEnvironment::new("  ", DeploymentStage::Dev).unwrap_err();
        assert_eq!(err, DomainError::missing_input("application_name"));
    }

    #[test]
    fn from_raw_rejects_blank_and_unknown_stage() {
        assert_eq!(
            ApplicationEnvironment::from_raw(Some("app"), Some("")).unwrap_err(),
            DomainError::missing_input("stage")
        );
        assert!(matches!(
            ApplicationEnvironment::from_raw(Some("app"), Some("qa")),
            Err(DomainError::UnknownStage(_))
        ));
        assert_eq!(
            ApplicationEnvironment::from_raw(Some("app"), Some("PROD"))
                .unwrap()
                .stage(),
            DeploymentStage::Prod
        );
    }

    #[test]
    fn tagging_is_idempotent() {
        let mut tags = Tags::default();
        env().tag(&mut tags);
        env().tag(&mut tags);

        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get(STAGE_TAG), Some("dev"));
        assert_eq!(tags.get(APPLICATION_TAG), Some("finance-log"));
    }
}
