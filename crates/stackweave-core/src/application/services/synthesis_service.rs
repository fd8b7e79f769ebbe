//! Synthesis Service - builds one stack from named inputs.
//!
//! Resolves the environment and target, loads every contract the stack
//! reads and hands them to the matching construct.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    application::{contracts::ContractStore, ports::SecretGenerator},
    domain::{
        DatabaseBundle, DeploymentInputs, FrontendBundle, IdentityBundle, InputName,
        NetworkBundle, RegistryBundle, Stack, StackKind,
        constructs::{
            ConstructContext,
            bastion::{self, BastionConfig, BastionInputs},
            certificate::{self, CertificateScope},
            database::{self, DatabaseConfig, PasswordPolicy},
            domain_records::{self, RecordInputs},
            frontend::{self, FrontendConfig, FrontendInputs},
            identity::{self, IdentityConfig, IdentityInputs},
            network::{self, NetworkConfig},
            registry::{self, RegistryConfig},
            service::{self, ImageSource, ServiceConfig, ServiceInputs},
            storage::{self, StorageConfig},
        },
    },
    error::StackweaveResult,
};

/// Per-construct configuration, one table each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructSettings {
    pub network: NetworkConfig,
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub registry: RegistryConfig,
    pub storage: StorageConfig,
    pub frontend: FrontendConfig,
    pub bastion: BastionConfig,
}

pub struct SynthesisService {
    contracts: ContractStore,
    secrets: Arc<dyn SecretGenerator>,
    settings: ConstructSettings,
}

impl SynthesisService {
    pub fn new(
        contracts: ContractStore,
        secrets: Arc<dyn SecretGenerator>,
        settings: ConstructSettings,
    ) -> Self {
        Self {
            contracts,
            secrets,
            settings,
        }
    }

    pub fn contracts(&self) -> &ContractStore {
        &self.contracts
    }

    pub fn settings(&self) -> &ConstructSettings {
        &self.settings
    }

    /// Synthesize `kind` against the current contents of the store.
    #[instrument(skip_all, fields(stack = %kind))]
    pub fn synthesize(&self, kind: StackKind, inputs: &DeploymentInputs) -> StackweaveResult<Stack> {
        let env = inputs.environment()?;
        let target = inputs.target()?;
        let ctx = ConstructContext::new(&env, &target);
        let settings = &self.settings;

        info!(env = %env, target = %target, "synthesizing stack");

        let stack = match kind {
            StackKind::Network => network::synthesize(
                &ctx,
                &settings.network,
                inputs.optional(InputName::BackendCertificateArn),
            )?,
            StackKind::Database => {
                let network: NetworkBundle = self.contracts.load_bundle(&env)?;
                let password = self.secrets.generate(&PasswordPolicy::MASTER)?;
                database::synthesize(&ctx, &settings.database, &network, &password)?
            }
            StackKind::Identity => identity::synthesize(
                &ctx,
                &settings.identity,
                IdentityInputs {
                    api_url: inputs.require(InputName::ApiUrl)?,
                    login_domain_prefix: inputs.require(InputName::LoginDomainPrefix)?,
                },
            )?,
            StackKind::Registry => {
                let repository = inputs
                    .optional(InputName::RepositoryName)
                    .unwrap_or(env.application_name());
                registry::synthesize(&ctx, &settings.registry, repository)?
            }
            StackKind::Storage => storage::synthesize(&ctx, &settings.storage)?,
            StackKind::Frontend => frontend::synthesize(
                &ctx,
                &settings.frontend,
                FrontendInputs {
                    certificate_arn: inputs.require(InputName::FrontendCertificateArn)?,
                    domain_name: inputs.require(InputName::FrontendDomain)?,
                },
            )?,
            StackKind::Service => {
                let network: NetworkBundle = self.contracts.load_bundle(&env)?;
                let database: DatabaseBundle = self.contracts.load_bundle(&env)?;
                let identity: IdentityBundle = self.contracts.load_bundle(&env)?;
                let image = self.image_source(inputs, &env)?;
                let service_inputs = ServiceInputs {
                    network: &network,
                    database: &database,
                    identity: &identity,
                    image,
                    profile: inputs.runtime_profile()?,
                    app_url: inputs.require(InputName::AppUrl)?,
                };
                service::synthesize(&ctx, &settings.service, &service_inputs)?
            }
            StackKind::BackendCertificate => certificate::synthesize(
                &ctx,
                CertificateScope::Backend,
                inputs.require(InputName::BackendDomain)?,
                inputs.require(InputName::HostedZoneDomain)?,
            )?,
            StackKind::FrontendCertificate => certificate::synthesize(
                &ctx,
                CertificateScope::Frontend,
                inputs.require(InputName::FrontendDomain)?,
                inputs.require(InputName::HostedZoneDomain)?,
            )?,
            StackKind::BackendDomain => {
                let network: NetworkBundle = self.contracts.load_bundle(&env)?;
                domain_records::backend(
                    &ctx,
                    &network,
                    RecordInputs {
                        hosted_zone_domain: inputs.require(InputName::HostedZoneDomain)?,
                        domain_name: inputs.require(InputName::BackendDomain)?,
                    },
                )?
            }
            StackKind::FrontendDomain => {
                let distribution: FrontendBundle = self.contracts.load_bundle(&env)?;
                domain_records::frontend(
                    &ctx,
                    &distribution,
                    RecordInputs {
                        hosted_zone_domain: inputs.require(InputName::HostedZoneDomain)?,
                        domain_name: inputs.require(InputName::FrontendDomain)?,
                    },
                )?
            }
            StackKind::Bastion => {
                let network: NetworkBundle = self.contracts.load_bundle(&env)?;
                let database: DatabaseBundle = self.contracts.load_bundle(&env)?;
                bastion::synthesize(
                    &ctx,
                    &settings.bastion,
                    BastionInputs {
                        key_name: inputs.require(InputName::KeyName)?,
                        operator_cidr: inputs.require(InputName::OperatorCidr)?,
                    },
                    &network,
                    &database,
                )?
            }
        };

        debug!(
            name = stack.name(),
            resources = stack.resources().count(),
            "stack synthesized"
        );
        Ok(stack)
    }

    /// An explicit image URL wins; otherwise the tag is pulled from the
    /// estate's registry.
    fn image_source(
        &self,
        inputs: &DeploymentInputs,
        env: &crate::domain::ApplicationEnvironment,
    ) -> StackweaveResult<ImageSource> {
        if let Some(url) = inputs.optional(InputName::ImageUrl) {
            return Ok(ImageSource::External { url: url.to_string() });
        }
        let tag = inputs.require(InputName::ImageTag)?.to_string();
        let registry: RegistryBundle = self.contracts.load_bundle(env)?;
        Ok(ImageSource::Registry { registry, tag })
    }
}
