use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use super::common::{Taggable, Tags};
use crate::domain::value_objects::DeployTarget;

// ── ResourceKind ─────────────────────────────────────────────────────────────

/// Every kind of cloud resource the constructs declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Vpc,
    Subnet,
    InternetGateway,
    VpcGatewayAttachment,
    RouteTable,
    Route,
    SubnetRouteTableAssociation,
    VpcEndpoint,
    SecurityGroup,
    SecurityGroupIngress,
    Instance,
    Cluster,
    LoadBalancer,
    TargetGroup,
    Listener,
    ListenerRule,
    LogGroup,
    Role,
    Policy,
    TaskDefinition,
    Service,
    Secret,
    SecretTargetAttachment,
    DbSubnetGroup,
    DbInstance,
    UserPool,
    UserPoolClient,
    UserPoolDomain,
    Repository,
    Bucket,
    BucketPolicy,
    Distribution,
    OriginAccessControl,
    RecordSet,
    Certificate,
}

impl ResourceKind {
    /// Provider type name written into the manifest.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vpc => "AWS::EC2::VPC",
            Self::Subnet => "AWS::EC2::Subnet",
            Self::InternetGateway => "AWS::EC2::InternetGateway",
            Self::VpcGatewayAttachment => "AWS::EC2::VPCGatewayAttachment",
            Self::RouteTable => "AWS::EC2::RouteTable",
            Self::Route => "AWS::EC2::Route",
            Self::SubnetRouteTableAssociation => "AWS::EC2::SubnetRouteTableAssociation",
            Self::VpcEndpoint => "AWS::EC2::VPCEndpoint",
            Self::SecurityGroup => "AWS::EC2::SecurityGroup",
            Self::SecurityGroupIngress => "AWS::EC2::SecurityGroupIngress",
            Self::Instance => "AWS::EC2::Instance",
            Self::Cluster => "AWS::ECS::Cluster",
            Self::LoadBalancer => "AWS::ElasticLoadBalancingV2::LoadBalancer",
            Self::TargetGroup => "AWS::ElasticLoadBalancingV2::TargetGroup",
            Self::Listener => "AWS::ElasticLoadBalancingV2::Listener",
            Self::ListenerRule => "AWS::ElasticLoadBalancingV2::ListenerRule",
            Self::LogGroup => "AWS::Logs::LogGroup",
            Self::Role => "AWS::IAM::Role",
            Self::Policy => "AWS::IAM::Policy",
            Self::TaskDefinition => "AWS::ECS::TaskDefinition",
            Self::Service => "AWS::ECS::Service",
            Self::Secret => "AWS::SecretsManager::Secret",
            Self::SecretTargetAttachment => "AWS::SecretsManager::SecretTargetAttachment",
            Self::DbSubnetGroup => "AWS::RDS::DBSubnetGroup",
            Self::DbInstance => "AWS::RDS::DBInstance",
            Self::UserPool => "AWS::Cognito::UserPool",
            Self::UserPoolClient => "AWS::Cognito::UserPoolClient",
            Self::UserPoolDomain => "AWS::Cognito::UserPoolDomain",
            Self::Repository => "AWS::ECR::Repository",
            Self::Bucket => "AWS::S3::Bucket",
            Self::BucketPolicy => "AWS::S3::BucketPolicy",
            Self::Distribution => "AWS::CloudFront::Distribution",
            Self::OriginAccessControl => "AWS::CloudFront::OriginAccessControl",
            Self::RecordSet => "AWS::Route53::RecordSet",
            Self::Certificate => "AWS::CertificateManager::Certificate",
        }
    }

    /// Whether the provider accepts a `Tags` list on this kind.
    pub const fn accepts_tags(&self) -> bool {
        !matches!(
            self,
            Self::VpcGatewayAttachment
                | Self::Route
                | Self::SubnetRouteTableAssociation
                | Self::VpcEndpoint
                | Self::SecurityGroupIngress
                | Self::Listener
                | Self::ListenerRule
                | Self::Policy
                | Self::SecretTargetAttachment
                | Self::UserPool
                | Self::UserPoolClient
                | Self::UserPoolDomain
                | Self::BucketPolicy
                | Self::OriginAccessControl
                | Self::RecordSet
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DeletionPolicy ───────────────────────────────────────────────────────────

/// What happens to the physical resource when its stack is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionPolicy {
    #[default]
    Delete,
    Retain,
}

impl DeletionPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "Delete",
            Self::Retain => "Retain",
        }
    }
}

// ── Resource ─────────────────────────────────────────────────────────────────

/// One declared resource inside a stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    kind: ResourceKind,
    properties: Value,
    depends_on: BTreeSet<String>,
    condition: Option<String>,
    deletion_policy: Option<DeletionPolicy>,
    tags: Tags,
}

impl Resource {
    pub fn new(kind: ResourceKind, properties: Value) -> Self {
        Self {
            kind,
            properties,
            depends_on: BTreeSet::new(),
            condition: None,
            deletion_policy: None,
            tags: Tags::default(),
        }
    }

    /// Add an explicit ordering edge on another resource in the same stack.
    pub fn depends_on(mut self, logical_id: impl Into<String>) -> Self {
        self.depends_on.insert(logical_id.into());
        self
    }

    /// Create the resource only when the named condition holds.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = Some(policy);
        self
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.set_tag(key, value);
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn properties(&self) -> &Value {
        &self.properties
    }

    /// Look up a top-level property.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.depends_on.iter().map(String::as_str)
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn deletion_policy(&self) -> Option<DeletionPolicy> {
        self.deletion_policy
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Render the manifest entry, attaching `inherited` tags where accepted.
    pub(crate) fn render(&self, inherited: &Tags) -> Value {
        let mut properties = self.properties.clone();
        let tags = self.tags.merged_with(inherited);

        if self.kind.accepts_tags() && !tags.is_empty() {
            if let Value::Object(map) = &mut properties {
                let list: Vec<Value> = tags
                    .iter()
                    .map(|(k, v)| json!({ "Key": k, "Value": v }))
                    .collect();
                map.insert("Tags".into(), Value::Array(list));
            }
        }

        let mut entry = serde_json::Map::new();
        entry.insert("Type".into(), json!(self.kind.as_str()));
        if let Some(condition) = &self.condition {
            entry.insert("Condition".into(), json!(condition));
        }
        if !self.depends_on.is_empty() {
            entry.insert("DependsOn".into(), json!(self.depends_on));
        }
        if let Some(policy) = self.deletion_policy {
            entry.insert("DeletionPolicy".into(), json!(policy.as_str()));
            entry.insert("UpdateReplacePolicy".into(), json!(policy.as_str()));
        }
        entry.insert("Properties".into(), properties);
        Value::Object(entry)
    }
}

impl Taggable for Resource {
    fn set_tag(&mut self, key: &str, value: &str) {
        self.tags.set_tag(key, value);
    }
}

/// In-stack reference to a resource's primary identifier.
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// In-stack reference to one attribute of a resource.
pub fn attribute(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

// ── Identity minting ─────────────────────────────────────────────────────────

const IDENTITY_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a9e_54d3_4b8a_9e0f_3c7d_2b1a_8e45);

/// Mints the physical identifiers a deployment would assign.
///
/// Identifiers are UUID v5 digests of `(account, region, stack, logical id)`,
/// so synthesizing the same stack twice yields the same values.
#[derive(Debug, Clone)]
pub struct IdentityMinter {
    account: String,
    region: String,
    stack_name: String,
}

impl IdentityMinter {
    pub fn new(target: &DeployTarget, stack_name: &str) -> Self {
        Self {
            account: target.account().to_string(),
            region: target.region().to_string(),
            stack_name: stack_name.to_string(),
        }
    }

    fn digest(&self, logical_id: &str) -> String {
        let seed = format!(
            "{}/{}/{}/{}",
            self.account, self.region, self.stack_name, logical_id
        );
        Uuid::new_v5(&IDENTITY_NAMESPACE, seed.as_bytes())
            .simple()
            .to_string()
    }

    /// `len` lowercase hex characters unique to `logical_id` (at most 32).
    pub fn token(&self, logical_id: &str, len: usize) -> String {
        let digest = self.digest(logical_id);
        digest[..len.min(digest.len())].to_string()
    }

    /// EC2-style id such as `vpc-0a1b2c3d4e5f60718`.
    pub fn short_id(&self, prefix: &str, logical_id: &str) -> String {
        format!("{prefix}-{}", self.token(logical_id, 17))
    }

    /// `arn:aws:{service}:{region}:{account}:{resource}`.
    pub fn arn(&self, service: &str, resource: &str) -> String {
        format!(
            "arn:aws:{service}:{}:{}:{resource}",
            self.region, self.account
        )
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}
