//! Container image registry with a keep-newest retention rule.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::ConstructContext;
use crate::domain::{
    entities::{DeletionPolicy, Resource, ResourceKind, Stack},
    error::DomainError,
    parameters::RegistryBundle,
    retention::RetentionRule,
    topology::StackKind,
    validation::require_non_empty,
};

const PULL_PUSH_ACTIONS: [&str; 7] = [
    "ecr:BatchCheckLayerAvailability",
    "ecr:GetDownloadUrlForLayer",
    "ecr:BatchGetImage",
    "ecr:PutImage",
    "ecr:InitiateLayerUpload",
    "ecr:UploadLayerPart",
    "ecr:CompleteLayerUpload",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub max_image_count: u32,
    /// Keep the repository and its images when the stack is deleted.
    pub retain_on_delete: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_image_count: 10,
            retain_on_delete: false,
        }
    }
}

impl RegistryConfig {
    pub fn retention(&self) -> RetentionRule {
        RetentionRule::new(self.max_image_count)
    }
}

#[instrument(skip_all, fields(repository = repository_name))]
pub fn synthesize(
    ctx: &ConstructContext<'_>,
    config: &RegistryConfig,
    repository_name: &str,
) -> Result<Stack, DomainError> {
    let repository_name = require_non_empty(Some(repository_name), "repository_name")?;
    if config.max_image_count == 0 {
        return Err(DomainError::invalid_input(
            "max_image_count",
            "the registry must keep at least one image",
        ));
    }

    let mut stack = ctx.new_stack(StackKind::Registry)?;
    let account = stack.target().account().to_string();
    let policy = if config.retain_on_delete {
        DeletionPolicy::Retain
    } else {
        DeletionPolicy::Delete
    };

    stack.add_resource(
        "Repository",
        Resource::new(
            ResourceKind::Repository,
            json!({
                "RepositoryName": repository_name,
                "LifecyclePolicy": {
                    "LifecyclePolicyText": config.retention().lifecycle_policy().to_string(),
                },
                "RepositoryPolicyText": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "AWS": format!("arn:aws:iam::{account}:root") },
                        "Action": PULL_PUSH_ACTIONS,
                    }],
                },
            }),
        )
        .with_deletion_policy(policy),
    );

    let minter = stack.minter();
    let bundle = RegistryBundle {
        repository_arn: minter.arn("ecr", &format!("repository/{repository_name}")),
        repository_uri: format!(
            "{account}.dkr.ecr.{}.amazonaws.com/{repository_name}",
            minter.region()
        ),
        repository_name: repository_name.to_string(),
    };
    stack.publish(bundle);

    Ok(ctx.finish(stack))
}
