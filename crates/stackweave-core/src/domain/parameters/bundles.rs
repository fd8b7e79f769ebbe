//! Typed per-family contract bundles.
//!
//! Producers publish a whole bundle; consumers load one. Each bundle knows
//! how to flatten itself into `(key, value)` entries and how to rebuild
//! itself from a [`ParameterSource`].

use serde::Serialize;

use super::{
    keys::{
        DatabaseKey, Family, FrontendKey, IdentityKey, NetworkKey, ParameterKey, RegistryKey,
        StorageKey,
    },
    sentinel::{decode_optional, encode_optional},
    value::ParameterValue,
};
use crate::domain::error::DomainError;

/// Where bundles read their values from.
///
/// Implementations fail with [`DomainError::MissingContract`] for a key that
/// was never published and [`DomainError::ContractShapeMismatch`] when the
/// stored shape is wrong.
pub trait ParameterSource {
    fn string(&self, family: Family, key: &'static str) -> Result<String, DomainError>;

    fn list(&self, family: Family, key: &'static str) -> Result<Vec<String>, DomainError>;
}

/// A typed aggregate of one family's parameters.
pub trait Bundle: Sized {
    type Key: ParameterKey;

    fn entries(&self) -> Vec<(Self::Key, ParameterValue)>;

    fn from_source(source: &dyn ParameterSource) -> Result<Self, DomainError>;
}

fn string<K: ParameterKey>(source: &dyn ParameterSource, key: K) -> Result<String, DomainError> {
    source.string(K::FAMILY, key.as_str())
}

fn list<K: ParameterKey>(source: &dyn ParameterSource, key: K) -> Result<Vec<String>, DomainError> {
    source.list(K::FAMILY, key.as_str())
}

// ── Network ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkBundle {
    pub vpc_id: String,
    pub http_listener_arn: String,
    /// Present only when the network was deployed with a certificate.
    pub https_listener_arn: Option<String>,
    pub load_balancer_security_group_id: String,
    pub ecs_cluster_name: String,
    pub availability_zones: Vec<String>,
    pub public_subnet_ids: Vec<String>,
    pub isolated_subnet_ids: Vec<String>,
    pub load_balancer_arn: String,
    pub load_balancer_dns_name: String,
    pub load_balancer_canonical_hosted_zone_id: String,
}

impl Bundle for NetworkBundle {
    type Key = NetworkKey;

    fn entries(&self) -> Vec<(NetworkKey, ParameterValue)> {
        use NetworkKey::*;
        vec![
            (VpcId, self.vpc_id.clone().into()),
            (HttpListenerArn, self.http_listener_arn.clone().into()),
            (
                HttpsListenerArn,
                encode_optional(self.https_listener_arn.as_deref()).into(),
            ),
            (
                LoadBalancerSecurityGroupId,
                self.load_balancer_security_group_id.clone().into(),
            ),
            (EcsClusterName, self.ecs_cluster_name.clone().into()),
            (AvailabilityZones, self.availability_zones.clone().into()),
            (PublicSubnetIds, self.public_subnet_ids.clone().into()),
            (IsolatedSubnetIds, self.isolated_subnet_ids.clone().into()),
            (LoadBalancerArn, self.load_balancer_arn.clone().into()),
            (LoadBalancerDnsName, self.load_balancer_dns_name.clone().into()),
            (
                LoadBalancerCanonicalHostedZoneId,
                self.load_balancer_canonical_hosted_zone_id.clone().into(),
            ),
        ]
    }

    fn from_source(source: &dyn ParameterSource) -> Result<Self, DomainError> {
        use NetworkKey::*;
        Ok(Self {
            vpc_id: string(source, VpcId)?,
            http_listener_arn: string(source, HttpListenerArn)?,
            https_listener_arn: decode_optional(&string(source, HttpsListenerArn)?),
            load_balancer_security_group_id: string(source, LoadBalancerSecurityGroupId)?,
            ecs_cluster_name: string(source, EcsClusterName)?,
            availability_zones: list(source, AvailabilityZones)?,
            public_subnet_ids: list(source, PublicSubnetIds)?,
            isolated_subnet_ids: list(source, IsolatedSubnetIds)?,
            load_balancer_arn: string(source, LoadBalancerArn)?,
            load_balancer_dns_name: string(source, LoadBalancerDnsName)?,
            load_balancer_canonical_hosted_zone_id: string(
                source,
                LoadBalancerCanonicalHostedZoneId,
            )?,
        })
    }
}

// ── Database ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseBundle {
    pub endpoint_address: String,
    pub endpoint_port: String,
    pub database_name: String,
    pub security_group_id: String,
    pub secret_arn: String,
    pub instance_id: String,
}

impl DatabaseBundle {
    /// `jdbc:mysql://{host}:{port}/{name}`.
    pub fn jdbc_url(&self) -> String {
        format!(
            "jdbc:mysql://{}:{}/{}",
            self.endpoint_address, self.endpoint_port, self.database_name
        )
    }
}

impl Bundle for DatabaseBundle {
    type Key = DatabaseKey;

    fn entries(&self) -> Vec<(DatabaseKey, ParameterValue)> {
        use DatabaseKey::*;
        vec![
            (EndpointAddress, self.endpoint_address.clone().into()),
            (EndpointPort, self.endpoint_port.clone().into()),
            (DatabaseName, self.database_name.clone().into()),
            (SecurityGroupId, self.security_group_id.clone().into()),
            (SecretArn, self.secret_arn.clone().into()),
            (InstanceId, self.instance_id.clone().into()),
        ]
    }

    fn from_source(source: &dyn ParameterSource) -> Result<Self, DomainError> {
        use DatabaseKey::*;
        Ok(Self {
            endpoint_address: string(source, EndpointAddress)?,
            endpoint_port: string(source, EndpointPort)?,
            database_name: string(source, DatabaseName)?,
            security_group_id: string(source, SecurityGroupId)?,
            secret_arn: string(source, SecretArn)?,
            instance_id: string(source, InstanceId)?,
        })
    }
}

// ── Identity ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityBundle {
    pub user_pool_id: String,
    pub user_pool_client_id: String,
    pub user_pool_client_secret: String,
    pub logout_url: String,
    pub provider_url: String,
}

impl Bundle for IdentityBundle {
    type Key = IdentityKey;

    fn entries(&self) -> Vec<(IdentityKey, ParameterValue)> {
        use IdentityKey::*;
        vec![
            (UserPoolId, self.user_pool_id.clone().into()),
            (UserPoolClientId, self.user_pool_client_id.clone().into()),
            (UserPoolClientSecret, self.user_pool_client_secret.clone().into()),
            (LogoutUrl, self.logout_url.clone().into()),
            (ProviderUrl, self.provider_url.clone().into()),
        ]
    }

    fn from_source(source: &dyn ParameterSource) -> Result<Self, DomainError> {
        use IdentityKey::*;
        Ok(Self {
            user_pool_id: string(source, UserPoolId)?,
            user_pool_client_id: string(source, UserPoolClientId)?,
            user_pool_client_secret: string(source, UserPoolClientSecret)?,
            logout_url: string(source, LogoutUrl)?,
            provider_url: string(source, ProviderUrl)?,
        })
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryBundle {
    pub repository_name: String,
    pub repository_arn: String,
    pub repository_uri: String,
}

impl Bundle for RegistryBundle {
    type Key = RegistryKey;

    fn entries(&self) -> Vec<(RegistryKey, ParameterValue)> {
        use RegistryKey::*;
        vec![
            (RepositoryName, self.repository_name.clone().into()),
            (RepositoryArn, self.repository_arn.clone().into()),
            (RepositoryUri, self.repository_uri.clone().into()),
        ]
    }

    fn from_source(source: &dyn ParameterSource) -> Result<Self, DomainError> {
        use RegistryKey::*;
        Ok(Self {
            repository_name: string(source, RepositoryName)?,
            repository_arn: string(source, RepositoryArn)?,
            repository_uri: string(source, RepositoryUri)?,
        })
    }
}

// ── Storage ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageBundle {
    pub bucket_name: String,
}

impl StorageBundle {
    /// Where an object uploaded under `object_key` can be fetched.
    pub fn public_object_url(&self, region: &str, object_key: &str) -> String {
        format!(
            "https://{}.s3.{region}.amazonaws.com/{}",
            self.bucket_name,
            object_key.trim_start_matches('/')
        )
    }
}

impl Bundle for StorageBundle {
    type Key = StorageKey;

    fn entries(&self) -> Vec<(StorageKey, ParameterValue)> {
        vec![(StorageKey::BucketName, self.bucket_name.clone().into())]
    }

    fn from_source(source: &dyn ParameterSource) -> Result<Self, DomainError> {
        Ok(Self {
            bucket_name: string(source, StorageKey::BucketName)?,
        })
    }
}

// ── Frontend ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrontendBundle {
    pub distribution_id: String,
    pub distribution_domain_name: String,
}

impl Bundle for FrontendBundle {
    type Key = FrontendKey;

    fn entries(&self) -> Vec<(FrontendKey, ParameterValue)> {
        vec![
            (
                FrontendKey::CloudFrontDistributionId,
                self.distribution_id.clone().into(),
            ),
            (
                FrontendKey::CloudFrontDomainName,
                self.distribution_domain_name.clone().into(),
            ),
        ]
    }

    fn from_source(source: &dyn ParameterSource) -> Result<Self, DomainError> {
        Ok(Self {
            distribution_id: string(source, FrontendKey::CloudFrontDistributionId)?,
            distribution_domain_name: string(source, FrontendKey::CloudFrontDomainName)?,
        })
    }
}

// ── Contract ─────────────────────────────────────────────────────────────────

/// Any bundle a stack publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contract {
    Network(NetworkBundle),
    Database(DatabaseBundle),
    Identity(IdentityBundle),
    Registry(RegistryBundle),
    Storage(StorageBundle),
    Frontend(FrontendBundle),
}

impl Contract {
    pub fn family(&self) -> Family {
        match self {
            Self::Network(_) => Family::Network,
            Self::Database(_) => Family::Database,
            Self::Identity(_) => Family::Cognito,
            Self::Registry(_) => Family::Registry,
            Self::Storage(_) => Family::S3,
            Self::Frontend(_) => Family::Frontend,
        }
    }

    /// Flattened `(key wire name, value)` pairs.
    pub fn entries(&self) -> Vec<(&'static str, ParameterValue)> {
        fn flatten<B: Bundle>(bundle: &B) -> Vec<(&'static str, ParameterValue)> {
            bundle
                .entries()
                .into_iter()
                .map(|(key, value)| (key.as_str(), value))
                .collect()
        }
        match self {
            Self::Network(b) => flatten(b),
            Self::Database(b) => flatten(b),
            Self::Identity(b) => flatten(b),
            Self::Registry(b) => flatten(b),
            Self::Storage(b) => flatten(b),
            Self::Frontend(b) => flatten(b),
        }
    }
}

macro_rules! contract_from {
    ($($variant:ident($bundle:ty)),+ $(,)?) => {
        $(
            impl From<$bundle> for Contract {
                fn from(bundle: $bundle) -> Self {
                    Self::$variant(bundle)
                }
            }
        )+
    };
}

contract_from! {
    Network(NetworkBundle),
    Database(DatabaseBundle),
    Identity(IdentityBundle),
    Registry(RegistryBundle),
    Storage(StorageBundle),
    Frontend(FrontendBundle),
}
