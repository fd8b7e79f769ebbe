//! Static frontend: private asset bucket behind a CDN distribution that
//! serves a single-page application.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use super::ConstructContext;
use crate::domain::{
    entities::{DeletionPolicy, Output, Resource, ResourceKind, Stack, attribute, reference},
    error::DomainError,
    parameters::FrontendBundle,
    topology::StackKind,
    validation::require_non_empty,
};

/// Managed cache policy "CachingOptimized".
const CACHING_OPTIMIZED_POLICY: &str = "658327ea-f89d-4fab-a63d-7e88639e58f6";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    pub default_root_object: String,
    pub minimum_protocol_version: String,
    /// Error statuses rewritten to the root document for client-side routing.
    pub spa_fallback_statuses: Vec<u16>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            default_root_object: "index.html".into(),
            minimum_protocol_version: "TLSv1.2_2021".into(),
            spa_fallback_statuses: vec![403, 404],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrontendInputs<'a> {
    pub certificate_arn: &'a str,
    pub domain_name: &'a str,
}

#[instrument(skip_all, fields(env = %ctx.env, domain = inputs.domain_name))]
pub fn synthesize(
    ctx: &ConstructContext<'_>,
    config: &FrontendConfig,
    inputs: FrontendInputs<'_>,
) -> Result<Stack, DomainError> {
    let certificate_arn = require_non_empty(Some(inputs.certificate_arn), "frontend_certificate_arn")?;
    let domain_name = require_non_empty(Some(inputs.domain_name), "frontend_domain")?;

    let mut stack = ctx.new_stack(StackKind::Frontend)?;
    let bucket_name = ctx.env.prefix("frontend-assets");
    let account = stack.target().account().to_string();

    stack.add_resource(
        "FrontendBucket",
        Resource::new(
            ResourceKind::Bucket,
            json!({
                "BucketName": bucket_name,
                "PublicAccessBlockConfiguration": {
                    "BlockPublicAcls": true,
                    "BlockPublicPolicy": true,
                    "IgnorePublicAcls": true,
                    "RestrictPublicBuckets": true,
                },
                "OwnershipControls": {
                    "Rules": [{ "ObjectOwnership": "BucketOwnerEnforced" }],
                },
                "BucketEncryption": {
                    "ServerSideEncryptionConfiguration": [{
                        "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" },
                    }],
                },
            }),
        )
        .with_deletion_policy(DeletionPolicy::Delete),
    );
    stack.add_resource(
        "FrontendOriginAccessControl",
        Resource::new(
            ResourceKind::OriginAccessControl,
            json!({
                "OriginAccessControlConfig": {
                    "Name": ctx.env.prefix("frontend-oac"),
                    "OriginAccessControlOriginType": "s3",
                    "SigningBehavior": "always",
                    "SigningProtocol": "sigv4",
                },
            }),
        ),
    );

    let error_responses: Vec<Value> = config
        .spa_fallback_statuses
        .iter()
        .map(|status| {
            json!({
                "ErrorCode": status,
                "ResponseCode": 200,
                "ResponsePagePath": format!("/{}", config.default_root_object),
                "ErrorCachingMinTTL": 0,
            })
        })
        .collect();

    stack.add_resource(
        "FrontendDistribution",
        Resource::new(
            ResourceKind::Distribution,
            json!({
                "DistributionConfig": {
                    "Enabled": true,
                    "Aliases": [domain_name],
                    "DefaultRootObject": config.default_root_object,
                    "ViewerCertificate": {
                        "AcmCertificateArn": certificate_arn,
                        "SslSupportMethod": "sni-only",
                        "MinimumProtocolVersion": config.minimum_protocol_version,
                    },
                    "Origins": [{
                        "Id": "FrontendBucketOrigin",
                        "DomainName": attribute("FrontendBucket", "RegionalDomainName"),
                        "OriginAccessControlId": attribute("FrontendOriginAccessControl", "Id"),
                        "S3OriginConfig": { "OriginAccessIdentity": "" },
                    }],
                    "DefaultCacheBehavior": {
                        "TargetOriginId": "FrontendBucketOrigin",
                        "ViewerProtocolPolicy": "redirect-to-https",
                        "Compress": true,
                        "CachePolicyId": CACHING_OPTIMIZED_POLICY,
                    },
                    "CustomErrorResponses": error_responses,
                },
            }),
        ),
    );
    stack.add_resource(
        "FrontendBucketPolicy",
        Resource::new(
            ResourceKind::BucketPolicy,
            json!({
                "Bucket": reference("FrontendBucket"),
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "Service": "cloudfront.amazonaws.com" },
                        "Action": "s3:GetObject",
                        "Resource": format!("arn:aws:s3:::{bucket_name}/*"),
                        "Condition": {
                            "StringEquals": {
                                "AWS:SourceArn": {
                                    "Fn::Sub": format!(
                                        "arn:aws:cloudfront::{account}:distribution/${{FrontendDistribution}}"
                                    ),
                                },
                            },
                        },
                    }],
                },
            }),
        ),
    );

    let minter = stack.minter();
    let bundle = FrontendBundle {
        distribution_id: format!("E{}", minter.token("FrontendDistribution", 13).to_ascii_uppercase()),
        distribution_domain_name: format!("d{}.cloudfront.net", minter.token("FrontendDistributionDomain", 13)),
    };

    stack.add_output(
        "CloudFrontDomainName",
        Output::new(attribute("FrontendDistribution", "DomainName"))
            .with_description("Distribution domain name"),
    );
    stack.add_output(
        "CloudFrontDistributionId",
        Output::new(reference("FrontendDistribution"))
            .with_description("Distribution id, used to invalidate caches after an upload"),
    );
    stack.publish(bundle);

    Ok(ctx.finish(stack))
}
