//! End-to-end runs against the real adapters.

use std::sync::Arc;

use stackweave_adapters::{
    FileParameterStore, InMemoryParameterStore, LocalManifestWriter, MemoryManifestSink,
    RandomSecretGenerator,
};
use stackweave_core::{
    domain::{DomainError, Family},
    prelude::*,
};
use tempfile::TempDir;

fn base_inputs() -> DeploymentInputs {
    DeploymentInputs::new()
        .with(InputName::Stage, "dev")
        .with(InputName::ApplicationName, "finance-log")
        .with(InputName::AccountId, "123456789012")
        .with(InputName::Region, "eu-central-1")
        .with(InputName::ApiUrl, "https://api.finance-log.com")
        .with(InputName::AppUrl, "https://app.finance-log.com")
        .with(InputName::LoginDomainPrefix, "finance-log-dev")
        .with(InputName::ImageTag, "1.4.2")
}

fn full_inputs() -> DeploymentInputs {
    base_inputs()
        .with(InputName::HostedZoneDomain, "finance-log.com")
        .with(InputName::BackendDomain, "api.finance-log.com")
        .with(InputName::FrontendDomain, "app.finance-log.com")
        .with(
            InputName::BackendCertificateArn,
            "arn:aws:acm:eu-central-1:123456789012:certificate/backend",
        )
        .with(
            InputName::FrontendCertificateArn,
            "arn:aws:acm:us-east-1:123456789012:certificate/frontend",
        )
        .with(InputName::KeyName, "operator-key")
        .with(InputName::OperatorCidr, "203.0.113.10/32")
}

fn orchestrator(store: Arc<dyn ParameterStore>, sink: Arc<dyn ManifestSink>) -> Orchestrator {
    let synthesis = SynthesisService::new(
        ContractStore::new(store, KeyScheme::Uniform),
        Arc::new(RandomSecretGenerator::seeded(42)),
        ConstructSettings::default(),
    );
    Orchestrator::new(synthesis, sink)
}

#[test]
fn core_estate_without_certificate_round_trips_through_a_file_store() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("parameters.json");
    let store = Arc::new(FileParameterStore::open(&store_path).unwrap());
    let writer = LocalManifestWriter::new(dir.path().join("manifests"));

    let reports = orchestrator(store, Arc::new(writer.clone()))
        .deploy_many(
            &[
                StackKind::Service,
                StackKind::Registry,
                StackKind::Identity,
                StackKind::Database,
                StackKind::Network,
            ],
            &base_inputs(),
        )
        .unwrap();

    assert_eq!(reports.len(), 5);
    assert_eq!(reports.last().unwrap().kind, StackKind::Service);

    // A fresh handle sees what the run published.
    let reopened = FileParameterStore::open(&store_path).unwrap();
    assert_eq!(
        reopened.get("dev-network-httpsListenerArn").unwrap(),
        Some(ParameterValue::from("null"))
    );
    assert!(matches!(
        reopened.get("dev-network-publicSubnetIds").unwrap(),
        Some(ParameterValue::StringList(ref ids)) if !ids.is_empty()
    ));

    let service = std::fs::read_to_string(writer.path_for("dev-finance-log-service-stack")).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&service).unwrap();
    let rules = manifest["template"]["Resources"]
        .as_object()
        .unwrap()
        .values()
        .filter(|r| r["Type"] == "AWS::ElasticLoadBalancingV2::ListenerRule")
        .count();
    assert_eq!(rules, 1);
}

#[test]
fn deploy_all_publishes_every_family() {
    let store = InMemoryParameterStore::new();
    let sink = MemoryManifestSink::new();
    let orchestrator = orchestrator(Arc::new(store.clone()), Arc::new(sink.clone()));

    let reports = orchestrator.deploy_all(&full_inputs()).unwrap();
    assert_eq!(reports.len(), StackKind::ALL.len());

    let names = sink.stack_names().unwrap();
    let position = |name: &str| names.iter().position(|n| n == name).unwrap();
    assert!(position("dev-network-stack") < position("dev-finance-log-database-stack"));
    assert!(position("dev-finance-log-database-stack") < position("dev-finance-log-service-stack"));
    assert!(position("dev-finance-log-frontend-stack") < position("dev-finance-log-frontend-domain-stack"));

    let env = full_inputs().environment().unwrap();
    let snapshot = orchestrator.contracts().snapshot(&env).unwrap();
    for family in Family::ALL {
        assert!(
            snapshot.iter().any(|e| e.family == family && e.value.is_some()),
            "{family} was not published"
        );
    }

    // The certificate was supplied, so the sentinel is gone.
    assert_ne!(
        store.get("dev-network-httpsListenerArn").unwrap(),
        Some(ParameterValue::from("null"))
    );
}

#[test]
fn edge_stacks_are_pinned_to_us_east_1() {
    let sink = MemoryManifestSink::new();
    orchestrator(Arc::new(InMemoryParameterStore::new()), Arc::new(sink.clone()))
        .deploy_many(&[StackKind::FrontendDomain, StackKind::Frontend], &full_inputs())
        .unwrap();

    for manifest in sink.manifests().unwrap() {
        assert_eq!(manifest.region, "us-east-1", "{}", manifest.stack_name);
    }
}

#[test]
fn bastion_before_database_is_a_missing_contract() {
    let store = InMemoryParameterStore::new();
    let sink = MemoryManifestSink::new();
    let orchestrator = orchestrator(Arc::new(store), Arc::new(sink.clone()));

    orchestrator.deploy(StackKind::Network, &full_inputs()).unwrap();
    let err = orchestrator.deploy(StackKind::Bastion, &full_inputs()).unwrap_err();

    assert!(matches!(
        err,
        StackweaveError::Domain(DomainError::MissingContract { ref family, .. }) if family == "database"
    ));
    assert_eq!(sink.stack_names().unwrap(), vec!["dev-network-stack".to_string()]);
}
