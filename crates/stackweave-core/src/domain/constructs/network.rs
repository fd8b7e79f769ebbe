//! Foundation stack: VPC, private service endpoints, compute cluster and the
//! shared internet-facing load balancer.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::ConstructContext;
use crate::domain::{
    entities::{Output, Resource, ResourceKind, Stack, attribute, reference},
    error::DomainError,
    parameters::NetworkBundle,
    topology::StackKind,
};

/// Interface endpoints the isolated subnets need to pull images and ship logs.
const INTERFACE_ENDPOINTS: [(&str, &str); 4] = [
    ("EcrApiEndpoint", "ecr.api"),
    ("EcrDockerEndpoint", "ecr.dkr"),
    ("LogsEndpoint", "logs"),
    ("StsEndpoint", "sts"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub vpc_cidr: String,
    pub availability_zones: usize,
    /// Port of the placeholder target group; matches the container port.
    pub placeholder_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            vpc_cidr: "10.0.0.0/16".into(),
            availability_zones: 2,
            placeholder_port: 8080,
        }
    }
}

impl NetworkConfig {
    pub const MIN_AVAILABILITY_ZONES: usize = 2;
}

/// Synthesize the network stack.
///
/// The HTTPS listener and the HTTP-to-HTTPS redirect exist only when a
/// certificate ARN is supplied; the published bundle then carries the HTTPS
/// listener ARN, otherwise the absent marker.
#[instrument(skip_all, fields(stage = %ctx.env.stage(), https = certificate_arn.is_some()))]
pub fn synthesize(
    ctx: &ConstructContext<'_>,
    config: &NetworkConfig,
    certificate_arn: Option<&str>,
) -> Result<Stack, DomainError> {
    if config.availability_zones < NetworkConfig::MIN_AVAILABILITY_ZONES {
        return Err(DomainError::invalid_input(
            "availability_zones",
            format!(
                "the load balancer needs subnets in at least {} availability zones, got {}",
                NetworkConfig::MIN_AVAILABILITY_ZONES,
                config.availability_zones
            ),
        ));
    }

    let mut stack = ctx.new_stack(StackKind::Network)?;
    let stage = ctx.env.stage();
    let named = |suffix: &str| format!("{stage}-{suffix}");
    let zones = stack.target().availability_zones(config.availability_zones);
    let region = stack.target().region().to_string();

    // ── VPC and subnets ──────────────────────────────────────────────────────

    stack.add_resource(
        "Vpc",
        Resource::new(
            ResourceKind::Vpc,
            json!({
                "CidrBlock": config.vpc_cidr,
                "EnableDnsHostnames": true,
                "EnableDnsSupport": true,
            }),
        )
        .with_tag("Name", &named("vpc")),
    );
    stack.add_resource(
        "InternetGateway",
        Resource::new(ResourceKind::InternetGateway, json!({})),
    );
    stack.add_resource(
        "VpcGatewayAttachment",
        Resource::new(
            ResourceKind::VpcGatewayAttachment,
            json!({
                "VpcId": reference("Vpc"),
                "InternetGatewayId": reference("InternetGateway"),
            }),
        ),
    );

    let base = subnet_base(&config.vpc_cidr)?;
    let count = zones.len();
    let mut public_subnets = Vec::with_capacity(count);
    let mut isolated_subnets = Vec::with_capacity(count);
    let mut isolated_route_tables = Vec::with_capacity(count);

    for (index, zone) in zones.iter().enumerate() {
        let n = index + 1;

        let public = format!("PublicSubnet{n}");
        stack.add_resource(
            &public,
            Resource::new(
                ResourceKind::Subnet,
                json!({
                    "VpcId": reference("Vpc"),
                    "AvailabilityZone": zone,
                    "CidrBlock": format!("{base}.{index}.0/24"),
                    "MapPublicIpOnLaunch": true,
                }),
            )
            .with_tag("Name", &named(&format!("public-subnet-{n}"))),
        );
        let public_table = format!("PublicRouteTable{n}");
        stack.add_resource(
            &public_table,
            Resource::new(ResourceKind::RouteTable, json!({ "VpcId": reference("Vpc") })),
        );
        stack.add_resource(
            format!("PublicDefaultRoute{n}"),
            Resource::new(
                ResourceKind::Route,
                json!({
                    "RouteTableId": reference(&public_table),
                    "DestinationCidrBlock": "0.0.0.0/0",
                    "GatewayId": reference("InternetGateway"),
                }),
            )
            .depends_on("VpcGatewayAttachment"),
        );
        stack.add_resource(
            format!("PublicSubnetRouteTableAssociation{n}"),
            Resource::new(
                ResourceKind::SubnetRouteTableAssociation,
                json!({
                    "SubnetId": reference(&public),
                    "RouteTableId": reference(&public_table),
                }),
            ),
        );

        let isolated = format!("IsolatedSubnet{n}");
        stack.add_resource(
            &isolated,
            Resource::new(
                ResourceKind::Subnet,
                json!({
                    "VpcId": reference("Vpc"),
                    "AvailabilityZone": zone,
                    "CidrBlock": format!("{base}.{}.0/24", count + index),
                    "MapPublicIpOnLaunch": false,
                }),
            )
            .with_tag("Name", &named(&format!("isolated-subnet-{n}"))),
        );
        let isolated_table = format!("IsolatedRouteTable{n}");
        stack.add_resource(
            &isolated_table,
            Resource::new(ResourceKind::RouteTable, json!({ "VpcId": reference("Vpc") })),
        );
        stack.add_resource(
            format!("IsolatedSubnetRouteTableAssociation{n}"),
            Resource::new(
                ResourceKind::SubnetRouteTableAssociation,
                json!({
                    "SubnetId": reference(&isolated),
                    "RouteTableId": reference(&isolated_table),
                }),
            ),
        );

        public_subnets.push(public);
        isolated_subnets.push(isolated);
        isolated_route_tables.push(isolated_table);
    }

    let isolated_refs: Vec<Value> = isolated_subnets.iter().map(|id| reference(id)).collect();
    let public_refs: Vec<Value> = public_subnets.iter().map(|id| reference(id)).collect();

    // ── Private service access ───────────────────────────────────────────────

    stack.add_resource(
        "S3GatewayEndpoint",
        Resource::new(
            ResourceKind::VpcEndpoint,
            json!({
                "VpcId": reference("Vpc"),
                "VpcEndpointType": "Gateway",
                "ServiceName": format!("com.amazonaws.{region}.s3"),
                "RouteTableIds": isolated_route_tables.iter().map(|id| reference(id)).collect::<Vec<_>>(),
            }),
        ),
    );
    stack.add_resource(
        "VpcEndpointSecurityGroup",
        Resource::new(
            ResourceKind::SecurityGroup,
            json!({
                "GroupDescription": "Security group for VPC interface endpoints",
                "VpcId": reference("Vpc"),
                "SecurityGroupIngress": [{
                    "IpProtocol": "tcp",
                    "FromPort": 443,
                    "ToPort": 443,
                    "CidrIp": config.vpc_cidr,
                }],
                "SecurityGroupEgress": [{ "IpProtocol": "-1", "CidrIp": "0.0.0.0/0" }],
            }),
        ),
    );
    for (logical_id, service) in INTERFACE_ENDPOINTS {
        stack.add_resource(
            logical_id,
            Resource::new(
                ResourceKind::VpcEndpoint,
                json!({
                    "VpcId": reference("Vpc"),
                    "VpcEndpointType": "Interface",
                    "ServiceName": format!("com.amazonaws.{region}.{service}"),
                    "SubnetIds": isolated_refs,
                    "SecurityGroupIds": [attribute("VpcEndpointSecurityGroup", "GroupId")],
                    "PrivateDnsEnabled": true,
                }),
            ),
        );
    }

    // ── Compute cluster ──────────────────────────────────────────────────────

    let cluster_name = named("ecs-cluster");
    stack.add_resource(
        "EcsCluster",
        Resource::new(ResourceKind::Cluster, json!({ "ClusterName": cluster_name })),
    );

    // ── Load balancer ────────────────────────────────────────────────────────

    stack.add_resource(
        "LoadBalancerSecurityGroup",
        Resource::new(
            ResourceKind::SecurityGroup,
            json!({
                "GroupName": named("lb-sg"),
                "GroupDescription": "Public Access to the Load Balancer",
                "VpcId": reference("Vpc"),
            }),
        ),
    );
    stack.add_resource(
        "LoadBalancerSecurityGroupIngress",
        Resource::new(
            ResourceKind::SecurityGroupIngress,
            json!({
                "GroupId": attribute("LoadBalancerSecurityGroup", "GroupId"),
                "IpProtocol": "-1",
                "CidrIp": "0.0.0.0/0",
            }),
        ),
    );

    let lb_name = named("lb");
    stack.add_resource(
        "LoadBalancer",
        Resource::new(
            ResourceKind::LoadBalancer,
            json!({
                "Name": lb_name,
                "Type": "application",
                "Scheme": "internet-facing",
                "Subnets": public_refs,
                "SecurityGroups": [attribute("LoadBalancerSecurityGroup", "GroupId")],
            }),
        )
        .depends_on("VpcGatewayAttachment"),
    );
    stack.add_resource(
        "PlaceholderTargetGroup",
        Resource::new(
            ResourceKind::TargetGroup,
            json!({
                "Name": named("no-op-targetGroup"),
                "VpcId": reference("Vpc"),
                "Port": config.placeholder_port,
                "Protocol": "HTTP",
                "TargetType": "ip",
                "HealthCheckIntervalSeconds": 10,
                "HealthCheckTimeoutSeconds": 5,
                "HealthyThresholdCount": 2,
                "TargetGroupAttributes": [
                    { "Key": "deregistration_delay.timeout_seconds", "Value": "5" }
                ],
            }),
        ),
    );

    let forward_to_placeholder = json!([{
        "Type": "forward",
        "TargetGroupArn": reference("PlaceholderTargetGroup"),
    }]);
    stack.add_resource(
        "HttpListener",
        Resource::new(
            ResourceKind::Listener,
            json!({
                "LoadBalancerArn": reference("LoadBalancer"),
                "Port": 80,
                "Protocol": "HTTP",
                "DefaultActions": forward_to_placeholder,
            }),
        ),
    );

    if let Some(certificate_arn) = certificate_arn {
        debug!("Adding HTTPS listener and HTTP redirect");
        stack.add_resource(
            "HttpsListener",
            Resource::new(
                ResourceKind::Listener,
                json!({
                    "LoadBalancerArn": reference("LoadBalancer"),
                    "Port": 443,
                    "Protocol": "HTTPS",
                    "Certificates": [{ "CertificateArn": certificate_arn }],
                    "DefaultActions": forward_to_placeholder,
                }),
            ),
        );
        stack.add_resource(
            "HttpToHttpsRedirectRule",
            Resource::new(
                ResourceKind::ListenerRule,
                json!({
                    "ListenerArn": reference("HttpListener"),
                    "Priority": 1,
                    "Conditions": [{ "Field": "path-pattern", "Values": ["*"] }],
                    "Actions": [{
                        "Type": "redirect",
                        "RedirectConfig": {
                            "Protocol": "HTTPS",
                            "Port": "443",
                            "StatusCode": "HTTP_301",
                        },
                    }],
                }),
            ),
        );
    }

    // ── Contract ─────────────────────────────────────────────────────────────

    let minter = stack.minter();
    let lb_token = minter.token("LoadBalancer", 16);
    let listener_arn = |logical_id: &str| {
        minter.arn(
            "elasticloadbalancing",
            &format!(
                "listener/app/{lb_name}/{lb_token}/{}",
                minter.token(logical_id, 16)
            ),
        )
    };

    let bundle = NetworkBundle {
        vpc_id: minter.short_id("vpc", "Vpc"),
        http_listener_arn: listener_arn("HttpListener"),
        https_listener_arn: certificate_arn.map(|_| listener_arn("HttpsListener")),
        load_balancer_security_group_id: minter.short_id("sg", "LoadBalancerSecurityGroup"),
        ecs_cluster_name: cluster_name,
        availability_zones: zones,
        public_subnet_ids: public_subnets
            .iter()
            .map(|id| minter.short_id("subnet", id))
            .collect(),
        isolated_subnet_ids: isolated_subnets
            .iter()
            .map(|id| minter.short_id("subnet", id))
            .collect(),
        load_balancer_arn: minter.arn(
            "elasticloadbalancing",
            &format!("loadbalancer/app/{lb_name}/{lb_token}"),
        ),
        load_balancer_dns_name: format!(
            "{lb_name}-{}.{region}.elb.amazonaws.com",
            minter.token("LoadBalancerDns", 10)
        ),
        load_balancer_canonical_hosted_zone_id: format!(
            "Z{}",
            minter.token("LoadBalancerZone", 13).to_ascii_uppercase()
        ),
    };

    stack.add_output(
        "LoadBalancerDnsName",
        Output::new(attribute("LoadBalancer", "DNSName"))
            .with_description("Public DNS name of the shared load balancer"),
    );
    stack.publish(bundle);

    Ok(ctx.finish(stack))
}

/// The first two octets of a `/16` VPC block, e.g. `10.0` for `10.0.0.0/16`.
fn subnet_base(vpc_cidr: &str) -> Result<String, DomainError> {
    let invalid = || {
        DomainError::invalid_input("vpc_cidr", format!("{vpc_cidr} is not a /16 IPv4 block"))
    };

    let (address, bits) = vpc_cidr.split_once('/').ok_or_else(invalid)?;
    if bits != "16" {
        return Err(invalid());
    }
    let octets: Vec<&str> = address.split('.').collect();
    if octets.len() != 4 || octets.iter().any(|o| o.parse::<u8>().is_err()) {
        return Err(invalid());
    }
    Ok(format!("{}.{}", octets[0], octets[1]))
}
