use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{environment::ApplicationEnvironment, error::DomainError};

// ── Family ───────────────────────────────────────────────────────────────────

/// A namespace of parameters owned by exactly one producer stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Network,
    Database,
    Cognito,
    Registry,
    S3,
    Frontend,
}

impl Family {
    pub const ALL: [Self; 6] = [
        Self::Network,
        Self::Database,
        Self::Cognito,
        Self::Registry,
        Self::S3,
        Self::Frontend,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Database => "database",
            Self::Cognito => "cognito",
            Self::Registry => "registry",
            Self::S3 => "s3",
            Self::Frontend => "frontend",
        }
    }

    /// Every key wire name belonging to this family.
    pub fn keys(&self) -> Vec<&'static str> {
        fn names<K: ParameterKey>() -> Vec<&'static str> {
            K::ALL.iter().map(|k| k.as_str()).collect()
        }
        match self {
            Self::Network => names::<NetworkKey>(),
            Self::Database => names::<DatabaseKey>(),
            Self::Cognito => names::<IdentityKey>(),
            Self::Registry => names::<RegistryKey>(),
            Self::S3 => names::<StorageKey>(),
            Self::Frontend => names::<FrontendKey>(),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::invalid_input("family", format!("unknown family: {s}")))
    }
}

// ── Keys ─────────────────────────────────────────────────────────────────────

/// A parameter key: an enumerated constant whose wire string is a contract
/// between producer and consumer.
pub trait ParameterKey: Copy + fmt::Debug + Send + Sync + 'static {
    const FAMILY: Family;
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;
}

macro_rules! parameter_keys {
    ($(#[$meta:meta])* $name:ident in $family:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl ParameterKey for $name {
            const FAMILY: Family = Family::$family;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

parameter_keys! {
    /// Keys published by the network stack.
    NetworkKey in Network {
        VpcId => "vpcId",
        HttpListenerArn => "httpListenerArn",
        HttpsListenerArn => "httpsListenerArn",
        LoadBalancerSecurityGroupId => "loadBalancerSecurityGroupId",
        EcsClusterName => "ecsClusterName",
        AvailabilityZones => "availabilityZones",
        PublicSubnetIds => "publicSubnetIds",
        IsolatedSubnetIds => "isolatedSubnetIds",
        LoadBalancerArn => "loadBalancerArn",
        LoadBalancerDnsName => "loadBalancerDnsName",
        LoadBalancerCanonicalHostedZoneId => "loadBalancerCanonicalHostedZoneId",
    }
}

parameter_keys! {
    /// Keys published by the database stack.
    DatabaseKey in Database {
        EndpointAddress => "endpointAddress",
        EndpointPort => "endpointPort",
        DatabaseName => "databaseName",
        SecurityGroupId => "securityGroupId",
        SecretArn => "secretArn",
        InstanceId => "instanceId",
    }
}

parameter_keys! {
    /// Keys published by the identity provider stack.
    IdentityKey in Cognito {
        UserPoolId => "userPoolId",
        UserPoolClientId => "userPoolClientId",
        UserPoolClientSecret => "userPoolClientSecret",
        LogoutUrl => "logoutUrl",
        ProviderUrl => "providerUrl",
    }
}

parameter_keys! {
    /// Keys published by the image registry stack.
    RegistryKey in Registry {
        RepositoryName => "repositoryName",
        RepositoryArn => "repositoryArn",
        RepositoryUri => "repositoryUri",
    }
}

parameter_keys! {
    /// Keys published by the upload storage stack.
    StorageKey in S3 {
        BucketName => "bucketName",
    }
}

parameter_keys! {
    /// Keys published by the frontend stack.
    FrontendKey in Frontend {
        CloudFrontDistributionId => "cloudFrontDistributionId",
        CloudFrontDomainName => "cloudFrontDomainName",
    }
}

// ── KeyScheme ────────────────────────────────────────────────────────────────

/// How composite parameter names are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    /// `{stage}-{family}-{key}` for every family.
    #[default]
    Uniform,
    /// Application-scoped families (`database`, `cognito`, `s3`,
    /// `registry`) use `{stage}-{application}-{family}-{key}`; `network`
    /// and `frontend` stay stage-scoped. Matches stores populated by
    /// earlier deployments of the estate.
    Legacy,
}

impl KeyScheme {
    pub fn parameter_name(
        &self,
        env: &ApplicationEnvironment,
        family: Family,
        key: &str,
    ) -> String {
        match (self, family) {
            (Self::Legacy, Family::Database | Family::Cognito | Family::S3 | Family::Registry) => {
                env.prefix(&format!("{family}-{key}"))
            }
            _ => format!("{}-{family}-{key}", env.stage()),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Legacy => "legacy",
        }
    }
}

impl FromStr for KeyScheme {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "legacy" => Ok(Self::Legacy),
            other => Err(DomainError::invalid_input(
                "key_scheme",
                format!("expected 'uniform' or 'legacy', got '{other}'"),
            )),
        }
    }
}
