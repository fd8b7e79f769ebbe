//! Upload storage: a publicly readable bucket that browsers upload into with
//! presigned `PUT` requests.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::ConstructContext;
use crate::domain::{
    entities::{DeletionPolicy, Resource, ResourceKind, Stack, reference},
    error::DomainError,
    parameters::StorageBundle,
    topology::StackKind,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Origins allowed to upload and fetch from the browser.
    pub allowed_origins: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:5173".into(),
                "https://app.finance-log.com".into(),
            ],
        }
    }
}

#[instrument(skip_all, fields(env = %ctx.env))]
pub fn synthesize(ctx: &ConstructContext<'_>, config: &StorageConfig) -> Result<Stack, DomainError> {
    if config.allowed_origins.is_empty() {
        return Err(DomainError::invalid_input(
            "allowed_origins",
            "at least one origin is required for browser uploads",
        ));
    }

    let mut stack = ctx.new_stack(StackKind::Storage)?;
    let bucket_name = ctx.env.prefix("user-uploads");

    stack.add_resource(
        "UserUploadsBucket",
        Resource::new(
            ResourceKind::Bucket,
            json!({
                "BucketName": bucket_name,
                "PublicAccessBlockConfiguration": {
                    "BlockPublicAcls": false,
                    "BlockPublicPolicy": false,
                    "IgnorePublicAcls": false,
                    "RestrictPublicBuckets": false,
                },
                "BucketEncryption": {
                    "ServerSideEncryptionConfiguration": [{
                        "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" },
                    }],
                },
                "CorsConfiguration": {
                    "CorsRules": [{
                        "AllowedOrigins": config.allowed_origins,
                        "AllowedMethods": ["PUT", "POST", "GET"],
                        "AllowedHeaders": ["*"],
                        "ExposedHeaders": ["ETag"],
                    }],
                },
            }),
        )
        .with_deletion_policy(DeletionPolicy::Delete),
    );
    stack.add_resource(
        "UserUploadsBucketPolicy",
        Resource::new(
            ResourceKind::BucketPolicy,
            json!({
                "Bucket": reference("UserUploadsBucket"),
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": "*",
                        "Action": "s3:GetObject",
                        "Resource": format!("arn:aws:s3:::{bucket_name}/*"),
                    }],
                },
            }),
        ),
    );

    stack.publish(StorageBundle { bucket_name });

    Ok(ctx.finish(stack))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        constructs::fixtures::{env, target},
        parameters::Contract,
    };

    fn synth(config: &StorageConfig) -> Result<Stack, DomainError> {
        let env = env();
        let target = target();
        let ctx = ConstructContext::new(&env, &target);
        synthesize(&ctx, config)
    }

    #[test]
    fn bucket_allows_browser_uploads() {
        let stack = synth(&StorageConfig::default()).unwrap();
        let rule = &stack.resource("UserUploadsBucket").unwrap().properties()["CorsConfiguration"]["CorsRules"][0];
        assert_eq!(rule["AllowedMethods"], json!(["PUT", "POST", "GET"]));
        assert_eq!(rule["ExposedHeaders"], json!(["ETag"]));
    }

    #[test]
    fn publishes_bucket_name() {
        let stack = synth(&StorageConfig::default()).unwrap();
        let Contract::Storage(bundle) = &stack.publications()[0] else {
            panic!("expected a storage contract");
        };
        assert_eq!(bundle.bucket_name, "dev-finance-log-user-uploads");
    }

    #[test]
    fn objects_are_publicly_readable() {
        let stack = synth(&StorageConfig::default()).unwrap();
        let policy = &stack.resource("UserUploadsBucketPolicy").unwrap().properties()["PolicyDocument"];
        assert_eq!(policy["Statement"][0]["Action"], "s3:GetObject");
        assert_eq!(
            policy["Statement"][0]["Resource"],
            "arn:aws:s3:::dev-finance-log-user-uploads/*"
        );
    }

    #[test]
    fn requires_an_origin() {
        let config = StorageConfig {
            allowed_origins: vec![],
        };
        assert!(synth(&config).is_err());
    }
}
