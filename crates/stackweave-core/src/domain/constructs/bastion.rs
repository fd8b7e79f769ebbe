//! Jump host for reaching the private database over an SSH tunnel.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::ConstructContext;
use crate::domain::{
    entities::{Output, Resource, ResourceKind, Stack, attribute},
    error::DomainError,
    parameters::{DatabaseBundle, NetworkBundle},
    topology::StackKind,
    validation::{DomainValidator, require_non_empty},
};

const SSH_PORT: u16 = 22;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BastionConfig {
    pub instance_type: String,
    /// Public SSM parameter holding the machine image id.
    pub image_parameter: String,
}

impl Default for BastionConfig {
    fn default() -> Self {
        Self {
            instance_type: "t3.nano".into(),
            image_parameter: "/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-default-x86_64".into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BastionInputs<'a> {
    /// Existing key pair attached to the instance.
    pub key_name: &'a str,
    /// The single block allowed to SSH in, usually the operator's `/32`.
    pub operator_cidr: &'a str,
}

#[instrument(skip_all, fields(env = %ctx.env, cidr = inputs.operator_cidr))]
pub fn synthesize(
    ctx: &ConstructContext<'_>,
    config: &BastionConfig,
    inputs: BastionInputs<'_>,
    network: &NetworkBundle,
    database: &DatabaseBundle,
) -> Result<Stack, DomainError> {
    let key_name = require_non_empty(Some(inputs.key_name), "key_name")?;
    let operator_cidr = require_non_empty(Some(inputs.operator_cidr), "operator_cidr")?;
    DomainValidator::validate_cidr("operator_cidr", operator_cidr)?;

    let database_port: u32 = database.endpoint_port.parse().map_err(|_| {
        DomainError::invalid_input(
            "endpoint_port",
            format!("{} is not a port number", database.endpoint_port),
        )
    })?;
    DomainValidator::validate_port("endpoint_port", database_port)?;

    let subnet = network
        .public_subnet_ids
        .first()
        .ok_or_else(|| DomainError::invalid_input("public_subnet_ids", "the network has no public subnet"))?;

    let mut stack = ctx.new_stack(StackKind::Bastion)?;

    stack.add_resource(
        "BastionHostSecurityGroup",
        Resource::new(
            ResourceKind::SecurityGroup,
            json!({
                "GroupName": ctx.env.prefix("bastion-host-sg"),
                "GroupDescription": "SecurityGroup containing the BastionHost",
                "VpcId": network.vpc_id,
            }),
        ),
    );
    stack.add_resource(
        "BastionHostSecurityGroupIngress",
        Resource::new(
            ResourceKind::SecurityGroupIngress,
            json!({
                "GroupId": attribute("BastionHostSecurityGroup", "GroupId"),
                "IpProtocol": "tcp",
                "FromPort": SSH_PORT,
                "ToPort": SSH_PORT,
                "CidrIp": operator_cidr,
            }),
        ),
    );
    stack.add_resource(
        "DatabaseSecurityGroupIngress",
        Resource::new(
            ResourceKind::SecurityGroupIngress,
            json!({
                "GroupId": database.security_group_id,
                "SourceSecurityGroupId": attribute("BastionHostSecurityGroup", "GroupId"),
                "IpProtocol": "tcp",
                "FromPort": database_port,
                "ToPort": database_port,
            }),
        ),
    );
    stack.add_resource(
        "BastionHost",
        Resource::new(
            ResourceKind::Instance,
            json!({
                "InstanceType": config.instance_type,
                "ImageId": format!("{{{{resolve:ssm:{}}}}}", config.image_parameter),
                "SubnetId": subnet,
                "KeyName": key_name,
                "SecurityGroupIds": [attribute("BastionHostSecurityGroup", "GroupId")],
            }),
        ),
    );
    stack.add_output(
        "BastionHostPublicIp",
        Output::new(attribute("BastionHost", "PublicIp")),
    );

    Ok(ctx.finish(stack))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constructs::fixtures::{database, env, network, target};

    fn synth(cidr: &str) -> Result<Stack, DomainError> {
        let env = env();
        let target = target();
        let ctx = ConstructContext::new(&env, &target);
        synthesize(
            &ctx,
            &BastionConfig::default(),
            BastionInputs {
                key_name: "operator-key",
                operator_cidr: cidr,
            },
            &network(None),
            &database(),
        )
    }

    #[test]
    fn ssh_is_open_to_exactly_one_block() {
        let stack = synth("203.0.113.7/32").unwrap();
        let ingress = stack.resource("BastionHostSecurityGroupIngress").unwrap();
        assert_eq!(ingress.property("CidrIp"), Some(&json!("203.0.113.7/32")));
        assert_eq!(ingress.property("FromPort"), Some(&json!(22)));
        assert_eq!(ingress.property("ToPort"), Some(&json!(22)));
    }

    #[test]
    fn database_ingress_is_limited_to_its_port() {
        let stack = synth("203.0.113.7/32").unwrap();
        let ingress = stack.resource("DatabaseSecurityGroupIngress").unwrap();
        assert_eq!(ingress.property("GroupId"), Some(&json!("sg-db")));
        assert_eq!(ingress.property("FromPort"), Some(&json!(3306)));
        assert_eq!(ingress.property("ToPort"), Some(&json!(3306)));
    }

    #[test]
    fn host_runs_in_first_public_subnet() {
        let stack = synth("203.0.113.7/32").unwrap();
        let host = stack.resource("BastionHost").unwrap();
        assert_eq!(host.property("SubnetId"), Some(&json!("subnet-p1")));
        assert_eq!(host.property("InstanceType"), Some(&json!("t3.nano")));
        assert_eq!(host.property("KeyName"), Some(&json!("operator-key")));
        assert_eq!(
            host.property("ImageId"),
            Some(&json!(
                "{{resolve:ssm:/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-default-x86_64}}"
            ))
        );
        assert!(stack.output("BastionHostPublicIp").is_some());
        assert_eq!(
            stack
                .resource("BastionHostSecurityGroup")
                .unwrap()
                .property("GroupName"),
            Some(&json!("dev-finance-log-bastion-host-sg"))
        );
    }

    #[test]
    fn malformed_cidr_is_rejected() {
        assert!(matches!(
            synth("203.0.113.7"),
            Err(DomainError::InvalidInput { .. })
        ));
    }
}
