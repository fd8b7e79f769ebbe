//! Alias records that put the application and frontend domains in front of
//! the load balancer and the CDN.

use serde_json::json;
use tracing::instrument;

use super::ConstructContext;
use crate::domain::{
    entities::{Resource, ResourceKind, Stack},
    error::DomainError,
    parameters::{FrontendBundle, NetworkBundle},
    topology::StackKind,
    validation::require_non_empty,
};

/// Hosted zone every CloudFront distribution alias resolves through.
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

#[derive(Debug, Clone, Copy)]
pub struct RecordInputs<'a> {
    pub hosted_zone_domain: &'a str,
    pub domain_name: &'a str,
}

/// Alias `A` record from the API domain to the load balancer.
#[instrument(skip_all, fields(env = %ctx.env, domain = inputs.domain_name))]
pub fn backend(
    ctx: &ConstructContext<'_>,
    network: &NetworkBundle,
    inputs: RecordInputs<'_>,
) -> Result<Stack, DomainError> {
    let domain_name = require_non_empty(Some(inputs.domain_name), "backend_domain")?;
    let mut stack = ctx.new_stack(StackKind::BackendDomain)?;
    stack.add_resource(
        "AlbARecord",
        alias_record(
            inputs.hosted_zone_domain,
            domain_name,
            &format!("dualstack.{}", network.load_balancer_dns_name),
            &network.load_balancer_canonical_hosted_zone_id,
        )?,
    );
    Ok(ctx.finish(stack))
}

/// Alias `A` record from the frontend domain to the CDN distribution.
#[instrument(skip_all, fields(env = %ctx.env, domain = inputs.domain_name))]
pub fn frontend(
    ctx: &ConstructContext<'_>,
    distribution: &FrontendBundle,
    inputs: RecordInputs<'_>,
) -> Result<Stack, DomainError> {
    let domain_name = require_non_empty(Some(inputs.domain_name), "frontend_domain")?;
    let mut stack = ctx.new_stack(StackKind::FrontendDomain)?;
    stack.add_resource(
        "CdnARecord",
        alias_record(
            inputs.hosted_zone_domain,
            domain_name,
            &distribution.distribution_domain_name,
            CLOUDFRONT_HOSTED_ZONE_ID,
        )?,
    );
    Ok(ctx.finish(stack))
}

fn alias_record(
    hosted_zone_domain: &str,
    name: &str,
    target_dns_name: &str,
    target_zone_id: &str,
) -> Result<Resource, DomainError> {
    let zone = require_non_empty(Some(hosted_zone_domain), "hosted_zone_domain")?;
    Ok(Resource::new(
        ResourceKind::RecordSet,
        json!({
            "HostedZoneName": format!("{}.", zone.trim_end_matches('.')),
            "Name": name,
            "Type": "A",
            "AliasTarget": {
                "DNSName": target_dns_name,
                "HostedZoneId": target_zone_id,
                "EvaluateTargetHealth": false,
            },
        }),
    ))
}
