//! The running workload: target group, listener rules, task definition and
//! the container service wired into the shared load balancer.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use super::ConstructContext;
use crate::domain::{
    entities::{Condition, DeletionPolicy, Resource, ResourceKind, Stack, attribute, reference},
    error::DomainError,
    parameters::{DatabaseBundle, IdentityBundle, NetworkBundle, RegistryBundle, sentinel},
    topology::StackKind,
    validation::DomainValidator,
    value_objects::RuntimeProfile,
};

/// Name of the condition guarding the HTTPS listener rule.
pub const HTTPS_LISTENER_CONDITION: &str = "HttpsListenerCondition";

const TASK_PRINCIPAL: &str = "ecs-tasks.amazonaws.com";

const EXECUTION_ROLE_ACTIONS: [&str; 6] = [
    "ecr:GetAuthorizationToken",
    "ecr:BatchCheckLayerAvailability",
    "ecr:GetDownloadUrlForLayer",
    "ecr:BatchGetImage",
    "logs:CreateLogStream",
    "logs:PutLogEvents",
];

const REGISTRY_PULL_ACTIONS: [&str; 3] = [
    "ecr:BatchCheckLayerAvailability",
    "ecr:GetDownloadUrlForLayer",
    "ecr:BatchGetImage",
];

// ── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

/// One IAM statement granted to the running application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    #[serde(default)]
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

impl PolicyStatement {
    fn render(&self) -> Value {
        json!({
            "Effect": match self.effect {
                Effect::Allow => "Allow",
                Effect::Deny => "Deny",
            },
            "Action": self.actions,
            "Resource": self.resources,
        })
    }
}

/// Tunables of the service stack. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub container_port: u16,
    pub container_protocol: String,
    pub health_check_path: String,
    /// Defaults to the container port.
    pub health_check_port: Option<u16>,
    /// Defaults to the container protocol.
    pub health_check_protocol: Option<String>,
    pub health_check_interval_seconds: u32,
    pub health_check_timeout_seconds: u32,
    pub healthy_threshold_count: u32,
    pub unhealthy_threshold_count: u32,
    pub cpu: u32,
    pub memory: u32,
    pub log_retention_days: u32,
    pub awslogs_datetime_format: String,
    pub desired_instances: u32,
    pub maximum_percent: u32,
    pub minimum_healthy_percent: u32,
    pub http_listener_priority: u32,
    pub sticky_sessions: bool,
    pub health_check_grace_period_seconds: u32,
    pub task_role_statements: Vec<PolicyStatement>,
    /// Extra groups the tasks must reach, beyond the database.
    pub downstream_security_groups: Vec<String>,
    /// Extra plaintext environment, merged over the workload environment.
    /// The datasource credentials cannot be overridden.
    pub environment: BTreeMap<String, String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            container_port: 8080,
            container_protocol: "HTTP".into(),
            health_check_path: "/actuator/health".into(),
            health_check_port: None,
            health_check_protocol: None,
            health_check_interval_seconds: 30,
            health_check_timeout_seconds: 5,
            healthy_threshold_count: 2,
            unhealthy_threshold_count: 3,
            cpu: 256,
            memory: 512,
            log_retention_days: 3,
            awslogs_datetime_format: "%Y-%m-%dT%H:%M:%S.%f%z".into(),
            desired_instances: 2,
            maximum_percent: 200,
            minimum_healthy_percent: 50,
            http_listener_priority: 2,
            sticky_sessions: false,
            health_check_grace_period_seconds: 120,
            task_role_statements: Vec::new(),
            downstream_security_groups: Vec::new(),
            environment: BTreeMap::new(),
        }
    }
}

impl ServiceConfig {
    pub const HTTPS_LISTENER_PRIORITY: u32 = 1;

    /// Variables that only ever carry secret-store references.
    pub const CREDENTIAL_VARIABLES: [&'static str; 2] =
        ["SPRING_DATASOURCE_USERNAME", "SPRING_DATASOURCE_PASSWORD"];

    pub fn validate(&self) -> Result<(), DomainError> {
        DomainValidator::validate_rolling_bounds(self.minimum_healthy_percent, self.maximum_percent)?;
        DomainValidator::validate_port("container_port", u32::from(self.container_port))?;
        if let Some(port) = self.health_check_port {
            DomainValidator::validate_port("health_check_port", u32::from(port))?;
        }
        if self.http_listener_priority == Self::HTTPS_LISTENER_PRIORITY {
            return Err(DomainError::invalid_input(
                "http_listener_priority",
                "priority 1 is taken by the HTTP-to-HTTPS redirect",
            ));
        }
        if let Some(name) = Self::CREDENTIAL_VARIABLES
            .into_iter()
            .find(|name| self.environment.contains_key(*name))
        {
            return Err(DomainError::invalid_input(
                "environment",
                format!("{name} is resolved from the database secret and cannot be set"),
            ));
        }
        Ok(())
    }
}

// ── Inputs ───────────────────────────────────────────────────────────────────

/// Where the container image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A fully qualified image reference, used as is.
    External { url: String },
    /// A tag in the estate's own registry; the execution role gets a pull
    /// grant on the repository.
    Registry { registry: RegistryBundle, tag: String },
}

impl ImageSource {
    pub fn image(&self) -> String {
        match self {
            Self::External { url } => url.clone(),
            Self::Registry { registry, tag } => format!("{}:{tag}", registry.repository_uri),
        }
    }
}

/// Everything the service consumes from other stacks and named inputs.
#[derive(Debug, Clone)]
pub struct ServiceInputs<'a> {
    pub network: &'a NetworkBundle,
    pub database: &'a DatabaseBundle,
    pub identity: &'a IdentityBundle,
    pub image: ImageSource,
    pub profile: RuntimeProfile,
    pub app_url: &'a str,
}

/// A deploy-time reference to one field of a stored secret.
pub fn secret_reference(secret_arn: &str, field: &str) -> String {
    format!("{{{{resolve:secretsmanager:{secret_arn}:SecretString:{field}}}}}")
}

/// The environment handed to the running workload.
///
/// Database credentials appear only as deploy-time secret references.
pub fn workload_environment(inputs: &ServiceInputs<'_>) -> BTreeMap<String, String> {
    let database = inputs.database;
    let identity = inputs.identity;

    BTreeMap::from([
        ("SPRING_PROFILES_ACTIVE".into(), inputs.profile.to_string()),
        ("SPRING_DATASOURCE_URL".into(), database.jdbc_url()),
        (
            "SPRING_DATASOURCE_USERNAME".into(),
            secret_reference(&database.secret_arn, "username"),
        ),
        (
            "SPRING_DATASOURCE_PASSWORD".into(),
            secret_reference(&database.secret_arn, "password"),
        ),
        ("COGNITO_CLIENT_ID".into(), identity.user_pool_client_id.clone()),
        (
            "COGNITO_CLIENT_SECRET".into(),
            identity.user_pool_client_secret.clone(),
        ),
        ("COGNITO_PROVIDER_URL".into(), identity.provider_url.clone()),
        ("APP_URL".into(), inputs.app_url.to_string()),
    ])
}

// ── Synthesis ────────────────────────────────────────────────────────────────

#[instrument(skip_all, fields(env = %ctx.env, https = inputs.network.https_listener_arn.is_some()))]
pub fn synthesize(
    ctx: &ConstructContext<'_>,
    config: &ServiceConfig,
    inputs: &ServiceInputs<'_>,
) -> Result<Stack, DomainError> {
    config.validate()?;

    let mut stack = ctx.new_stack(StackKind::Service)?;
    let env = ctx.env;
    let network = inputs.network;
    let region = stack.target().region().to_string();
    let container_name = env.prefix("container");
    let log_group_name = env.prefix("log-group");

    // 1. Target group
    let mut attributes = vec![target_group_attribute("deregistration_delay.timeout_seconds", "5")];
    if config.sticky_sessions {
        attributes.extend([
            target_group_attribute("stickiness.enabled", "true"),
            target_group_attribute("stickiness.type", "lb_cookie"),
            target_group_attribute("stickiness.lb_cookie.duration_seconds", "3600"),
        ]);
    }
    stack.add_resource(
        "TargetGroup",
        Resource::new(
            ResourceKind::TargetGroup,
            json!({
                "VpcId": network.vpc_id,
                "Port": config.container_port,
                "Protocol": config.container_protocol,
                "TargetType": "ip",
                "HealthCheckPath": config.health_check_path,
                "HealthCheckPort": config.health_check_port.unwrap_or(config.container_port).to_string(),
                "HealthCheckProtocol": config
                    .health_check_protocol
                    .as_deref()
                    .unwrap_or(&config.container_protocol),
                "HealthCheckIntervalSeconds": config.health_check_interval_seconds,
                "HealthCheckTimeoutSeconds": config.health_check_timeout_seconds,
                "HealthyThresholdCount": config.healthy_threshold_count,
                "UnhealthyThresholdCount": config.unhealthy_threshold_count,
                "TargetGroupAttributes": attributes,
            }),
        ),
    );

    // 2. Listener rules
    let forward = json!([{ "Type": "forward", "TargetGroupArn": reference("TargetGroup") }]);
    let match_all = json!([{ "Field": "path-pattern", "Values": ["*"] }]);

    stack.add_resource(
        "HttpListenerRule",
        Resource::new(
            ResourceKind::ListenerRule,
            json!({
                "ListenerArn": network.http_listener_arn,
                "Priority": config.http_listener_priority,
                "Actions": forward,
                "Conditions": match_all,
            }),
        ),
    );
    let mut listener_rules = vec!["HttpListenerRule"];

    if let Some(https_listener_arn) = &network.https_listener_arn {
        debug!("Attaching HTTPS listener rule");
        stack.add_condition(
            HTTPS_LISTENER_CONDITION,
            Condition::not(Condition::equals(
                https_listener_arn.as_str(),
                sentinel::ABSENT_SENTINEL,
            )),
        );
        stack.add_resource(
            "HttpsListenerRule",
            Resource::new(
                ResourceKind::ListenerRule,
                json!({
                    "ListenerArn": https_listener_arn,
                    "Priority": ServiceConfig::HTTPS_LISTENER_PRIORITY,
                    "Actions": forward,
                    "Conditions": match_all,
                }),
            )
            .with_condition(HTTPS_LISTENER_CONDITION),
        );
        listener_rules.push("HttpsListenerRule");
    }

    // 3. Log group
    stack.add_resource(
        "LogGroup",
        Resource::new(
            ResourceKind::LogGroup,
            json!({
                "LogGroupName": log_group_name,
                "RetentionInDays": config.log_retention_days,
            }),
        )
        .with_deletion_policy(DeletionPolicy::Delete),
    );

    // 4. Roles
    let mut execution_policies = vec![json!({
        "PolicyName": env.prefix("ecs-taskExecutionRolePolicy"),
        "PolicyDocument": policy_document(vec![json!({
            "Effect": "Allow",
            "Action": EXECUTION_ROLE_ACTIONS,
            "Resource": ["*"],
        })]),
    })];

    // 5. Image source
    if let ImageSource::Registry { registry, .. } = &inputs.image {
        debug!(repository = %registry.repository_name, "Granting registry pull to execution role");
        execution_policies.push(json!({
            "PolicyName": env.prefix("ecs-registryPullPolicy"),
            "PolicyDocument": policy_document(vec![json!({
                "Effect": "Allow",
                "Action": REGISTRY_PULL_ACTIONS,
                "Resource": [registry.repository_arn],
            })]),
        }));
    }

    stack.add_resource(
        "TaskExecutionRole",
        Resource::new(
            ResourceKind::Role,
            json!({
                "AssumeRolePolicyDocument": assume_role_document(),
                "Policies": execution_policies,
            }),
        ),
    );

    let mut task_role = json!({ "AssumeRolePolicyDocument": assume_role_document() });
    if !config.task_role_statements.is_empty() {
        task_role["Policies"] = json!([{
            "PolicyName": env.prefix("ecsTaskRolePolicy"),
            "PolicyDocument": policy_document(
                config.task_role_statements.iter().map(PolicyStatement::render).collect()
            ),
        }]);
    }
    stack.add_resource("TaskRole", Resource::new(ResourceKind::Role, task_role));

    // 6. Task definition
    let mut environment = workload_environment(inputs);
    environment.extend(config.environment.clone());
    let environment: Vec<Value> = environment
        .iter()
        .map(|(name, value)| json!({ "Name": name, "Value": value }))
        .collect();

    stack.add_resource(
        "TaskDefinition",
        Resource::new(
            ResourceKind::TaskDefinition,
            json!({
                "RequiresCompatibilities": ["FARGATE"],
                "NetworkMode": "awsvpc",
                "Cpu": config.cpu.to_string(),
                "Memory": config.memory.to_string(),
                "ExecutionRoleArn": attribute("TaskExecutionRole", "Arn"),
                "TaskRoleArn": attribute("TaskRole", "Arn"),
                "ContainerDefinitions": [{
                    "Name": container_name,
                    "Image": inputs.image.image(),
                    "Cpu": config.cpu,
                    "Memory": config.memory,
                    "PortMappings": [{ "ContainerPort": config.container_port }],
                    "Environment": environment,
                    "LogConfiguration": {
                        "LogDriver": "awslogs",
                        "Options": {
                            "awslogs-group": reference("LogGroup"),
                            "awslogs-region": region,
                            "awslogs-stream-prefix": env.prefix("stream"),
                            "awslogs-datetime-format": config.awslogs_datetime_format,
                        },
                    },
                }],
            }),
        ),
    );

    // 7. Task security group
    stack.add_resource(
        "TaskSecurityGroup",
        Resource::new(
            ResourceKind::SecurityGroup,
            json!({
                "GroupDescription": "SecurityGroup for ECS tasks",
                "VpcId": network.vpc_id,
            }),
        ),
    );
    let task_group = attribute("TaskSecurityGroup", "GroupId");
    stack.add_resource(
        "TaskIngressSelf",
        Resource::new(
            ResourceKind::SecurityGroupIngress,
            json!({
                "GroupId": task_group,
                "SourceSecurityGroupId": task_group,
                "IpProtocol": "-1",
            }),
        ),
    );
    stack.add_resource(
        "TaskIngressFromLoadBalancer",
        Resource::new(
            ResourceKind::SecurityGroupIngress,
            json!({
                "GroupId": task_group,
                "SourceSecurityGroupId": network.load_balancer_security_group_id,
                "IpProtocol": "-1",
            }),
        ),
    );

    let downstream = std::iter::once(&inputs.database.security_group_id)
        .chain(config.downstream_security_groups.iter());
    for (index, group_id) in downstream.enumerate() {
        stack.add_resource(
            format!("DownstreamIngress{}", index + 1),
            Resource::new(
                ResourceKind::SecurityGroupIngress,
                json!({
                    "GroupId": group_id,
                    "SourceSecurityGroupId": task_group,
                    "IpProtocol": "-1",
                }),
            ),
        );
    }

    // 8. Container service
    let mut service = Resource::new(
        ResourceKind::Service,
        json!({
            "Cluster": network.ecs_cluster_name,
            "LaunchType": "FARGATE",
            "DesiredCount": config.desired_instances,
            "TaskDefinition": reference("TaskDefinition"),
            "HealthCheckGracePeriodSeconds": config.health_check_grace_period_seconds,
            "DeploymentConfiguration": {
                "MaximumPercent": config.maximum_percent,
                "MinimumHealthyPercent": config.minimum_healthy_percent,
            },
            "NetworkConfiguration": {
                "AwsvpcConfiguration": {
                    "AssignPublicIp": "DISABLED",
                    "Subnets": network.isolated_subnet_ids,
                    "SecurityGroups": [task_group],
                },
            },
            "LoadBalancers": [{
                "ContainerName": container_name,
                "ContainerPort": config.container_port,
                "TargetGroupArn": reference("TargetGroup"),
            }],
        }),
    )
    .depends_on("TargetGroup");
    for rule in listener_rules {
        service = service.depends_on(rule);
    }
    stack.add_resource("Service", service);

    Ok(ctx.finish(stack))
}

fn target_group_attribute(key: &str, value: &str) -> Value {
    json!({ "Key": key, "Value": value })
}

fn policy_document(statements: Vec<Value>) -> Value {
    json!({ "Version": "2012-10-17", "Statement": statements })
}

fn assume_role_document() -> Value {
    policy_document(vec![json!({
        "Effect": "Allow",
        "Principal": { "Service": TASK_PRINCIPAL },
        "Action": "sts:AssumeRole",
    })])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constructs::fixtures::{database, env, identity, network, target};

    fn synth_with(config: &ServiceConfig, https: Option<&str>, image: ImageSource) -> Result<Stack, DomainError> {
        let env = env();
        let target = target();
        let ctx = ConstructContext::new(&env, &target);
        let network = network(https);
        let database = database();
        let identity = identity();
        let inputs = ServiceInputs {
            network: &network,
            database: &database,
            identity: &identity,
            image,
            profile: RuntimeProfile::Dev,
            app_url: "https://app.finance-log.com",
        };
        synthesize(&ctx, config, &inputs)
    }

    fn external() -> ImageSource {
        ImageSource::External {
            url: "docker.io/finance-log/backend:1.0.0".into(),
        }
    }

    fn synth(https: Option<&str>) -> Stack {
        synth_with(&ServiceConfig::default(), https, external()).unwrap()
    }

    fn rules(stack: &Stack) -> usize {
        stack.resources_of(ResourceKind::ListenerRule).count()
    }

    #[test]
    fn http_only_network_yields_one_rule_and_no_guard() {
        let stack = synth(None);
        assert_eq!(rules(&stack), 1);
        assert!(stack.condition(HTTPS_LISTENER_CONDITION).is_none());

        let http = stack.resource("HttpListenerRule").unwrap();
        assert_eq!(http.property("Priority"), Some(&json!(2)));
    }

    #[test]
    fn https_network_yields_guarded_second_rule() {
        let stack = synth(Some("arn:https-listener"));
        assert_eq!(rules(&stack), 2);

        let https = stack.resource("HttpsListenerRule").unwrap();
        assert_eq!(https.property("Priority"), Some(&json!(1)));
        assert_eq!(https.condition(), Some(HTTPS_LISTENER_CONDITION));

        let guard = stack.condition(HTTPS_LISTENER_CONDITION).unwrap();
        assert!(guard.evaluate());
    }

    #[test]
    fn guard_is_false_for_the_absent_marker() {
        let guard = Condition::not(Condition::equals(
            sentinel::ABSENT_SENTINEL,
            sentinel::ABSENT_SENTINEL,
        ));
        assert!(!guard.evaluate());
    }

    #[test]
    fn service_waits_for_target_group_and_rules() {
        let stack = synth(Some("arn:https-listener"));
        let deps: Vec<&str> = stack.resource("Service").unwrap().dependencies().collect();
        assert_eq!(deps, ["HttpListenerRule", "HttpsListenerRule", "TargetGroup"]);
    }

    #[test]
    fn target_group_defaults() {
        let stack = synth(None);
        let tg = stack.resource("TargetGroup").unwrap();
        assert_eq!(tg.property("HealthCheckPath"), Some(&json!("/actuator/health")));
        assert_eq!(tg.property("HealthCheckPort"), Some(&json!("8080")));
        assert_eq!(tg.property("HealthCheckIntervalSeconds"), Some(&json!(30)));
        assert_eq!(tg.property("UnhealthyThresholdCount"), Some(&json!(3)));
        assert_eq!(tg.properties()["TargetGroupAttributes"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn sticky_sessions_add_cookie_attributes() {
        let config = ServiceConfig {
            sticky_sessions: true,
            ..ServiceConfig::default()
        };
        let stack = synth_with(&config, None, external()).unwrap();
        let attributes = &stack.resource("TargetGroup").unwrap().properties()["TargetGroupAttributes"];
        assert_eq!(attributes.as_array().unwrap().len(), 4);
        assert!(attributes.to_string().contains("lb_cookie"));
    }

    #[test]
    fn rolling_bounds_are_enforced() {
        for (min, max, ok) in [(50, 200, true), (0, 100, true), (100, 100, true), (101, 200, false), (50, 99, false)] {
            let config = ServiceConfig {
                minimum_healthy_percent: min,
                maximum_percent: max,
                ..ServiceConfig::default()
            };
            assert_eq!(synth_with(&config, None, external()).is_ok(), ok, "{min}/{max}");
        }
    }

    #[test]
    fn rolling_bounds_are_deterministic() {
        let config = ServiceConfig {
            minimum_healthy_percent: 101,
            ..ServiceConfig::default()
        };
        let first = synth_with(&config, None, external()).unwrap_err();
        let second = synth_with(&config, None, external()).unwrap_err();
        assert_eq!(first, second);
        assert!(matches!(first, DomainError::InvalidRollingBounds { .. }));
    }

    #[test]
    fn credentials_are_secret_references() {
        let stack = synth(None);
        let container = &stack.resource("TaskDefinition").unwrap().properties()["ContainerDefinitions"][0];
        let env: BTreeMap<String, String> = container["Environment"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| (e["Name"].as_str().unwrap().into(), e["Value"].as_str().unwrap().into()))
            .collect();

        assert_eq!(
            env["SPRING_DATASOURCE_URL"],
            "jdbc:mysql://db.eu-central-1.rds.amazonaws.com:3306/devfinancelogdatabase"
        );
        assert!(env["SPRING_DATASOURCE_PASSWORD"].starts_with("{{resolve:secretsmanager:"));
        assert!(env["SPRING_DATASOURCE_USERNAME"].ends_with(":SecretString:username}}"));
        assert_eq!(env["SPRING_PROFILES_ACTIVE"], "dev");
        assert_eq!(env["APP_URL"], "https://app.finance-log.com");
    }

    #[test]
    fn credential_overrides_are_rejected() {
        for name in ServiceConfig::CREDENTIAL_VARIABLES {
            let config = ServiceConfig {
                environment: BTreeMap::from([(name.to_string(), "hunter2".to_string())]),
                ..ServiceConfig::default()
            };
            let err = synth_with(&config, None, external()).unwrap_err();
            assert!(
                matches!(err, DomainError::InvalidInput { ref variable, .. } if variable == "environment"),
                "{name}"
            );
        }
    }

    #[test]
    fn extra_environment_is_merged() {
        let config = ServiceConfig {
            environment: BTreeMap::from([("LOG_LEVEL".to_string(), "debug".to_string())]),
            ..ServiceConfig::default()
        };
        let stack = synth_with(&config, None, external()).unwrap();
        let rendered = stack.resource("TaskDefinition").unwrap().properties().to_string();
        assert!(rendered.contains("LOG_LEVEL"));
        assert!(rendered.contains("{{resolve:secretsmanager:"));
    }

    #[test]
    fn container_names_and_logging() {
        let stack = synth(None);
        let container = &stack.resource("TaskDefinition").unwrap().properties()["ContainerDefinitions"][0];
        assert_eq!(container["Name"], "dev-finance-log-container");
        assert_eq!(
            container["LogConfiguration"]["Options"]["awslogs-stream-prefix"],
            "dev-finance-log-stream"
        );
        let log_group = stack.resource("LogGroup").unwrap();
        assert_eq!(log_group.property("RetentionInDays"), Some(&json!(3)));
        assert_eq!(log_group.deletion_policy(), Some(DeletionPolicy::Delete));
    }

    #[test]
    fn registry_image_adds_pull_grant() {
        let registry = RegistryBundle {
            repository_name: "finance-log".into(),
            repository_arn: "arn:aws:ecr:eu-central-1:123456789012:repository/finance-log".into(),
            repository_uri: "123456789012.dkr.ecr.eu-central-1.amazonaws.com/finance-log".into(),
        };
        let image = ImageSource::Registry {
            registry: registry.clone(),
            tag: "abc123".into(),
        };
        let stack = synth_with(&ServiceConfig::default(), None, image).unwrap();

        let container = &stack.resource("TaskDefinition").unwrap().properties()["ContainerDefinitions"][0];
        assert_eq!(container["Image"], format!("{}:abc123", registry.repository_uri));

        let policies = &stack.resource("TaskExecutionRole").unwrap().properties()["Policies"];
        assert_eq!(policies.as_array().unwrap().len(), 2);
        assert!(policies.to_string().contains(&registry.repository_arn));
    }

    #[test]
    fn task_role_policy_only_when_statements_given() {
        let stack = synth(None);
        assert!(stack.resource("TaskRole").unwrap().property("Policies").is_none());

        let config = ServiceConfig {
            task_role_statements: vec![PolicyStatement {
                effect: Effect::Allow,
                actions: vec!["s3:PutObject".into()],
                resources: vec!["arn:aws:s3:::uploads/*".into()],
            }],
            ..ServiceConfig::default()
        };
        let stack = synth_with(&config, None, external()).unwrap();
        assert!(stack.resource("TaskRole").unwrap().property("Policies").is_some());
    }

    #[test]
    fn downstream_groups_get_ingress_from_tasks() {
        let config = ServiceConfig {
            downstream_security_groups: vec!["sg-cache".into()],
            ..ServiceConfig::default()
        };
        let stack = synth_with(&config, None, external()).unwrap();

        let first = stack.resource("DownstreamIngress1").unwrap();
        assert_eq!(first.property("GroupId"), Some(&json!("sg-db")));
        let second = stack.resource("DownstreamIngress2").unwrap();
        assert_eq!(second.property("GroupId"), Some(&json!("sg-cache")));
        assert_eq!(
            second.property("SourceSecurityGroupId"),
            Some(&attribute("TaskSecurityGroup", "GroupId"))
        );
    }

    #[test]
    fn tasks_run_in_isolated_subnets_without_public_ip() {
        let stack = synth(None);
        let service = stack.resource("Service").unwrap();
        let vpc = &service.properties()["NetworkConfiguration"]["AwsvpcConfiguration"];
        assert_eq!(vpc["AssignPublicIp"], "DISABLED");
        assert_eq!(vpc["Subnets"], json!(["subnet-i1", "subnet-i2"]));
        assert_eq!(service.property("DesiredCount"), Some(&json!(2)));
        assert_eq!(service.property("HealthCheckGracePeriodSeconds"), Some(&json!(120)));
    }

    #[test]
    fn stack_is_tagged_and_named() {
        let stack = synth(None);
        assert_eq!(stack.name(), "dev-finance-log-service-stack");
        assert_eq!(stack.tags().get("deployment"), Some("dev"));
        assert_eq!(stack.tags().get("application"), Some("finance-log"));
    }
}
