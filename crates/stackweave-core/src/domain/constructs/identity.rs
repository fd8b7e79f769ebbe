//! Identity provider: user pool, OAuth client and hosted login domain.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::ConstructContext;
use crate::domain::{
    entities::{DeletionPolicy, Resource, ResourceKind, Stack, reference},
    error::DomainError,
    parameters::IdentityBundle,
    topology::StackKind,
    validation::require_non_empty,
};

/// Whether sign-in aliases are matched case sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    #[default]
    Sensitive,
    Insensitive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub case_sensitivity: CaseSensitivity,
    pub password_min_length: u32,
    pub temporary_password_validity_days: u32,
    /// Origin of a locally running backend, allowed as callback and logout.
    pub local_origin: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            case_sensitivity: CaseSensitivity::Sensitive,
            password_min_length: 7,
            temporary_password_validity_days: 1,
            local_origin: "http://localhost:8080".into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IdentityInputs<'a> {
    /// Public URL of the backend API.
    pub api_url: &'a str,
    /// Prefix of the hosted login domain.
    pub login_domain_prefix: &'a str,
}

const CALLBACK_PATH: &str = "/login/oauth2/code/cognito";

#[instrument(skip_all, fields(env = %ctx.env))]
pub fn synthesize(
    ctx: &ConstructContext<'_>,
    config: &IdentityConfig,
    inputs: IdentityInputs<'_>,
) -> Result<Stack, DomainError> {
    let api_url = require_non_empty(Some(inputs.api_url), "api_url")?.trim_end_matches('/');
    let domain_prefix = require_non_empty(Some(inputs.login_domain_prefix), "login_domain_prefix")?;

    let mut stack = ctx.new_stack(StackKind::Identity)?;
    let application = ctx.env.application_name();
    let region = stack.target().region().to_string();
    let local = config.local_origin.trim_end_matches('/');

    stack.add_resource(
        "UserPool",
        Resource::new(
            ResourceKind::UserPool,
            json!({
                "UserPoolName": format!("{application}-user-pool"),
                "AdminCreateUserConfig": { "AllowAdminCreateUserOnly": false },
                "AccountRecoverySetting": {
                    "RecoveryMechanisms": [{ "Name": "verified_email", "Priority": 1 }],
                },
                "AutoVerifiedAttributes": ["email"],
                "UsernameAttributes": ["email"],
                "UsernameConfiguration": {
                    "CaseSensitive": config.case_sensitivity == CaseSensitivity::Sensitive,
                },
                "EmailConfiguration": { "EmailSendingAccount": "COGNITO_DEFAULT" },
                "Schema": [
                    { "Name": "email", "Required": true, "Mutable": false },
                    { "Name": "given_name", "Required": true, "Mutable": true },
                    { "Name": "family_name", "Required": true, "Mutable": true },
                ],
                "MfaConfiguration": "OFF",
                "Policies": {
                    "PasswordPolicy": {
                        "MinimumLength": config.password_min_length,
                        "RequireUppercase": true,
                        "RequireLowercase": true,
                        "RequireNumbers": true,
                        "RequireSymbols": true,
                        "TemporaryPasswordValidityDays": config.temporary_password_validity_days,
                    },
                },
            }),
        )
        .with_deletion_policy(DeletionPolicy::Delete),
    );
    stack.add_resource(
        "UserPoolClient",
        Resource::new(
            ResourceKind::UserPoolClient,
            json!({
                "UserPoolId": reference("UserPool"),
                "ClientName": format!("{application}-user-pool-client"),
                "GenerateSecret": true,
                "AllowedOAuthFlowsUserPoolClient": true,
                "AllowedOAuthFlows": ["code"],
                "AllowedOAuthScopes": ["email", "openid", "profile"],
                "CallbackURLs": [
                    format!("{api_url}{CALLBACK_PATH}"),
                    format!("{local}{CALLBACK_PATH}"),
                ],
                "LogoutURLs": [api_url, local],
                "SupportedIdentityProviders": ["COGNITO"],
            }),
        ),
    );
    stack.add_resource(
        "UserPoolDomain",
        Resource::new(
            ResourceKind::UserPoolDomain,
            json!({
                "UserPoolId": reference("UserPool"),
                "Domain": domain_prefix,
            }),
        ),
    );

    let minter = stack.minter();
    let user_pool_id = format!("{region}_{}", minter.token("UserPool", 9));
    let bundle = IdentityBundle {
        provider_url: format!("https://cognito-idp.{region}.amazonaws.com/{user_pool_id}"),
        user_pool_id,
        user_pool_client_id: minter.token("UserPoolClient", 26),
        user_pool_client_secret: minter.token("UserPoolClientSecret", 32),
        logout_url: logout_url(domain_prefix, &region),
    };
    stack.publish(bundle);

    Ok(ctx.finish(stack))
}

/// Hosted login logout endpoint.
pub fn logout_url(domain_prefix: &str, region: &str) -> String {
    format!("https://{domain_prefix}.auth.{region}.amazoncognito.com/logout")
}
