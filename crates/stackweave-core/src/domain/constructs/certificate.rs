//! DNS-validated TLS certificates for the API and the frontend domains.

use serde_json::json;
use tracing::instrument;

use super::ConstructContext;
use crate::domain::{
    entities::{Output, Resource, ResourceKind, Stack, reference},
    error::DomainError,
    topology::StackKind,
    validation::require_non_empty,
};

/// Which endpoint the certificate is issued for.
///
/// The frontend variant lands in the edge region so the CDN can attach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateScope {
    Backend,
    Frontend,
}

impl CertificateScope {
    pub const fn stack_kind(&self) -> StackKind {
        match self {
            Self::Backend => StackKind::BackendCertificate,
            Self::Frontend => StackKind::FrontendCertificate,
        }
    }
}

/// Logical id of the certificate and the name of its ARN output.
pub const CERTIFICATE_ID: &str = "WebCertificate";
pub const CERTIFICATE_ARN_OUTPUT: &str = "SslCertificateArn";

#[instrument(skip_all, fields(env = %ctx.env, scope = ?scope, domain = domain_name))]
pub fn synthesize(
    ctx: &ConstructContext<'_>,
    scope: CertificateScope,
    domain_name: &str,
    hosted_zone_domain: &str,
) -> Result<Stack, DomainError> {
    let variable = match scope {
        CertificateScope::Backend => "backend_domain",
        CertificateScope::Frontend => "frontend_domain",
    };
    let domain_name = require_non_empty(Some(domain_name), variable)?;
    let zone = require_non_empty(Some(hosted_zone_domain), "hosted_zone_domain")?;

    if !covers(zone, domain_name) {
        return Err(DomainError::invalid_input(
            variable,
            format!("{domain_name} is outside the hosted zone {zone}"),
        ));
    }

    let mut stack = ctx.new_stack(scope.stack_kind())?;
    stack.add_resource(
        CERTIFICATE_ID,
        Resource::new(
            ResourceKind::Certificate,
            json!({
                "DomainName": domain_name,
                "ValidationMethod": "DNS",
                "DomainValidationOptions": [{
                    "DomainName": domain_name,
                    "ValidationDomain": zone,
                }],
            }),
        ),
    );
    stack.add_output(
        CERTIFICATE_ARN_OUTPUT,
        Output::new(reference(CERTIFICATE_ID))
            .with_description("Certificate ARN which is to be used for setting up HTTPS"),
    );

    Ok(ctx.finish(stack))
}

/// Whether `domain` is the zone apex or a name below it.
fn covers(zone: &str, domain: &str) -> bool {
    let zone = zone.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    domain == zone || domain.ends_with(&format!(".{zone}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        constructs::fixtures::{env, target},
        topology::EDGE_REGION,
    };

    fn synth(scope: CertificateScope, domain: &str) -> Result<Stack, DomainError> {
        let env = env();
        let target = target();
        let ctx = ConstructContext::new(&env, &target);
        synthesize(&ctx, scope, domain, "finance-log.com")
    }

    #[test]
    fn backend_certificate_stays_in_the_deploy_region() {
        let stack = synth(CertificateScope::Backend, "api.finance-log.com").unwrap();
        assert_eq!(stack.name(), "dev-finance-log-certificate-stack");
        assert_eq!(stack.target().region(), "eu-central-1");

        let certificate = stack.resource(CERTIFICATE_ID).unwrap();
        assert_eq!(certificate.property("ValidationMethod"), Some(&json!("DNS")));
        assert_eq!(
            stack.output(CERTIFICATE_ARN_OUTPUT).unwrap().value(),
            &json!({ "Ref": "WebCertificate" })
        );
    }

    #[test]
    fn frontend_certificate_is_issued_in_the_edge_region() {
        let stack = synth(CertificateScope::Frontend, "app.finance-log.com").unwrap();
        assert_eq!(stack.name(), "dev-finance-log-frontend-certificate-stack");
        assert_eq!(stack.target().region(), EDGE_REGION);
    }

    #[test]
    fn domain_must_belong_to_the_zone() {
        assert!(synth(CertificateScope::Backend, "finance-log.com").is_ok());
        let err = synth(CertificateScope::Backend, "api.example.com").unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { variable, .. } if variable == "backend_domain"));
        assert!(!covers("finance-log.com", "evilfinance-log.com"));
    }

    #[test]
    fn blank_domain_is_a_missing_input() {
        let err = synth(CertificateScope::Frontend, "").unwrap_err();
        assert_eq!(err, DomainError::missing_input("frontend_domain"));
    }
}
