//! Relational database: security group, credentials secret, subnet group and
//! a MySQL instance in the isolated subnets.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::ConstructContext;
use crate::domain::{
    entities::{DeletionPolicy, Resource, ResourceKind, Stack, attribute, reference},
    error::DomainError,
    parameters::{DatabaseBundle, NetworkBundle},
    topology::StackKind,
};

/// Port the MySQL engine listens on.
pub const MYSQL_PORT: u16 = 3306;

/// Constraints on the generated master password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub length: usize,
    pub excluded: &'static str,
}

impl PasswordPolicy {
    pub const MASTER: Self = Self {
        length: 32,
        excluded: "@/\\\" ",
    };

    pub fn check(&self, password: &str) -> Result<(), DomainError> {
        if password.chars().count() != self.length {
            return Err(DomainError::invalid_input(
                "database_password",
                format!("must be exactly {} characters", self.length),
            ));
        }
        if password.chars().any(|c| self.excluded.contains(c) || c.is_control()) {
            return Err(DomainError::invalid_input(
                "database_password",
                "contains an excluded character",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub storage_gb: u32,
    pub instance_class: String,
    pub mysql_version: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            storage_gb: 20,
            instance_class: "db.t3.micro".into(),
            mysql_version: "8.0.44".into(),
        }
    }
}

/// Database identifiers: only `[a-zA-Z0-9_]`, starting with a letter.
///
/// A leading non-letter is replaced by `a`.
pub fn sanitize_identifier(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) if !first.is_ascii_alphabetic() => format!("a{}", chars.as_str()),
        _ => stripped,
    }
}

/// Synthesize the database stack.
///
/// `master_password` is generated by the caller and must satisfy
/// [`PasswordPolicy::MASTER`].
#[instrument(skip_all, fields(env = %ctx.env))]
pub fn synthesize(
    ctx: &ConstructContext<'_>,
    config: &DatabaseConfig,
    network: &NetworkBundle,
    master_password: &str,
) -> Result<Stack, DomainError> {
    PasswordPolicy::MASTER.check(master_password)?;

    let mut stack = ctx.new_stack(StackKind::Database)?;
    let env = ctx.env;
    let username = sanitize_identifier(&env.prefix("dbUser"));
    let database_name = sanitize_identifier(&env.prefix("database"));
    let instance_id = env.prefix("database");
    let secret_name = env.prefix("db-secret");
    let secret_string = json!({ "username": username, "password": master_password }).to_string();

    stack.add_resource(
        "DatabaseSecurityGroup",
        Resource::new(
            ResourceKind::SecurityGroup,
            json!({
                "GroupName": env.prefix("db-sg"),
                "GroupDescription": "Security Group for MySQL Database",
                "VpcId": network.vpc_id,
            }),
        ),
    );
    stack.add_resource(
        "DatabaseSecret",
        Resource::new(
            ResourceKind::Secret,
            json!({
                "Name": secret_name,
                "Description": "Credentials to the RDS instance",
                "SecretString": secret_string,
            }),
        )
        .with_deletion_policy(DeletionPolicy::Delete),
    );
    stack.add_resource(
        "DatabaseSubnetGroup",
        Resource::new(
            ResourceKind::DbSubnetGroup,
            json!({
                "DBSubnetGroupName": env.prefix("db-subnet-group"),
                "DBSubnetGroupDescription": "Subnet Group for the DB Instance",
                "SubnetIds": network.isolated_subnet_ids,
            }),
        ),
    );
    stack.add_resource(
        "DatabaseInstance",
        Resource::new(
            ResourceKind::DbInstance,
            json!({
                "DBInstanceIdentifier": instance_id,
                "AllocatedStorage": config.storage_gb.to_string(),
                "DBInstanceClass": config.instance_class,
                "Engine": "mysql",
                "EngineVersion": config.mysql_version,
                "DBName": database_name,
                "Port": MYSQL_PORT.to_string(),
                "PubliclyAccessible": false,
                "DeletionProtection": false,
                "DeleteAutomatedBackups": true,
                "VPCSecurityGroups": [attribute("DatabaseSecurityGroup", "GroupId")],
                "DBSubnetGroupName": reference("DatabaseSubnetGroup"),
                "MasterUsername": { "Fn::Sub": "{{resolve:secretsmanager:${DatabaseSecret}:SecretString:username}}" },
                "MasterUserPassword": { "Fn::Sub": "{{resolve:secretsmanager:${DatabaseSecret}:SecretString:password}}" },
            }),
        )
        .with_deletion_policy(DeletionPolicy::Delete),
    );
    stack.add_resource(
        "SecretTargetAttachment",
        Resource::new(
            ResourceKind::SecretTargetAttachment,
            json!({
                "SecretId": reference("DatabaseSecret"),
                "TargetId": reference("DatabaseInstance"),
                "TargetType": ResourceKind::DbInstance.as_str(),
            }),
        ),
    );

    let minter = stack.minter();
    let bundle = DatabaseBundle {
        endpoint_address: format!(
            "{instance_id}.{}.{}.rds.amazonaws.com",
            minter.token("DatabaseInstance", 12),
            minter.region()
        ),
        endpoint_port: MYSQL_PORT.to_string(),
        database_name,
        security_group_id: minter.short_id("sg", "DatabaseSecurityGroup"),
        secret_arn: minter.arn(
            "secretsmanager",
            &format!("secret:{secret_name}-{}", minter.token("DatabaseSecret", 6)),
        ),
        instance_id,
    };
    stack.publish(bundle);

    Ok(ctx.finish(stack))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        constructs::fixtures::{env, network, target},
        parameters::Contract,
    };

    const PASSWORD: &str = "Abcdefghijklmnopqrstuvwxyz012345";

    fn synth(password: &str) -> Result<Stack, DomainError> {
        let env = env();
        let target = target();
        let ctx = ConstructContext::new(&env, &target);
        synthesize(&ctx, &DatabaseConfig::default(), &network(None), password)
    }

    #[test]
    fn identifiers_are_sanitized() {
        assert_eq!(sanitize_identifier("dev-finance-log-dbUser"), "devfinancelogdbUser");
        assert_eq!(sanitize_identifier("1st_db"), "ast_db");
        assert_eq!(sanitize_identifier("_x"), "ax");
        assert_eq!(sanitize_identifier(""), "");
    }

    #[test]
    fn password_policy() {
        assert!(PasswordPolicy::MASTER.check(PASSWORD).is_ok());
        assert!(PasswordPolicy::MASTER.check("short").is_err());
        assert!(PasswordPolicy::MASTER.check("Abcdefghijklmnopqrstuvwxyz01234@").is_err());
        assert!(PasswordPolicy::MASTER.check("Abcdefghijklmnopqrstuvwxyz01234 ").is_err());
    }

    #[test]
    fn publishes_mysql_contract() {
        let stack = synth(PASSWORD).unwrap();
        let Contract::Database(bundle) = &stack.publications()[0] else {
            panic!("expected a database contract");
        };
        assert_eq!(bundle.endpoint_port, "3306");
        assert_eq!(bundle.database_name, "devfinancelogdatabase");
        assert_eq!(bundle.instance_id, "dev-finance-log-database");
        assert!(bundle.secret_arn.contains("secret:dev-finance-log-db-secret-"));
    }

    #[test]
    fn instance_is_private_and_disposable() {
        let stack = synth(PASSWORD).unwrap();
        let instance = stack.resource("DatabaseInstance").unwrap();
        assert_eq!(instance.property("PubliclyAccessible"), Some(&json!(false)));
        assert_eq!(instance.property("DBInstanceClass"), Some(&json!("db.t3.micro")));
        assert_eq!(instance.property("EngineVersion"), Some(&json!("8.0.44")));
        assert_eq!(instance.property("AllocatedStorage"), Some(&json!("20")));
        assert_eq!(instance.deletion_policy(), Some(DeletionPolicy::Delete));
        assert!(stack.resource("SecretTargetAttachment").is_some());
    }

    #[test]
    fn only_the_password_varies_between_runs() {
        let a = synth(PASSWORD).unwrap();
        let b = synth("Zbcdefghijklmnopqrstuvwxyz012345").unwrap();
        assert_ne!(a.render(), b.render());
        assert_eq!(a.publications(), b.publications());

        let mut a_resources = a.render()["Resources"].clone();
        let mut b_resources = b.render()["Resources"].clone();
        a_resources["DatabaseSecret"]["Properties"]["SecretString"] = json!("");
        b_resources["DatabaseSecret"]["Properties"]["SecretString"] = json!("");
        assert_eq!(a_resources, b_resources);
    }

    #[test]
    fn rejects_weak_password() {
        assert!(matches!(synth("x"), Err(DomainError::InvalidInput { .. })));
    }
}
