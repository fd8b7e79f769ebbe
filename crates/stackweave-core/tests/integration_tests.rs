//! Integration tests for stackweave-core, driven through the public API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, TimeZone, Utc};
use stackweave_core::{
    application::{ApplicationError, Manifest},
    domain::{
        DomainError, ImageRecord, ResourceKind, RetentionRule, constructs::database::PasswordPolicy,
    },
    prelude::*,
};

#[derive(Default)]
struct TestStore(Mutex<HashMap<String, ParameterValue>>);

impl ParameterStore for TestStore {
    fn get(&self, name: &str) -> StackweaveResult<Option<ParameterValue>> {
        let map = self.0.lock().map_err(|_| ApplicationError::StoreLockError)?;
        Ok(map.get(name).cloned())
    }

    fn put(&self, name: &str, value: ParameterValue) -> StackweaveResult<()> {
        let mut map = self.0.lock().map_err(|_| ApplicationError::StoreLockError)?;
        map.insert(name.to_string(), value);
        Ok(())
    }
}

#[derive(Default)]
struct TestSink(Mutex<Vec<Manifest>>);

impl ManifestSink for TestSink {
    fn write(&self, manifest: &Manifest) -> StackweaveResult<()> {
        self.0.lock().map_err(|_| ApplicationError::StoreLockError)?.push(manifest.clone());
        Ok(())
    }
}

struct FixedSecret;

impl SecretGenerator for FixedSecret {
    fn generate(&self, policy: &PasswordPolicy) -> StackweaveResult<String> {
        Ok("x".repeat(policy.length))
    }
}

fn inputs() -> DeploymentInputs {
    DeploymentInputs::new()
        .with(InputName::Stage, "dev")
        .with(InputName::ApplicationName, "finance-log")
        .with(InputName::AccountId, "123456789012")
        .with(InputName::Region, "eu-central-1")
        .with(InputName::ApiUrl, "https://api.finance-log.com")
        .with(InputName::AppUrl, "https://app.finance-log.com")
        .with(InputName::LoginDomainPrefix, "finance-log-dev")
        .with(InputName::ImageTag, "1.0.0")
}

fn orchestrator(store: Arc<TestStore>, sink: Arc<TestSink>) -> Orchestrator {
    let contracts = ContractStore::new(store, KeyScheme::Uniform);
    let synthesis = SynthesisService::new(contracts, Arc::new(FixedSecret), ConstructSettings::default());
    Orchestrator::new(synthesis, sink)
}

#[test]
fn service_without_certificate_has_only_the_http_rule() {
    let store = Arc::new(TestStore::default());
    let sink = Arc::new(TestSink::default());
    let orchestrator = orchestrator(Arc::clone(&store), Arc::clone(&sink));

    orchestrator
        .deploy_many(
            &[
                StackKind::Service,
                StackKind::Network,
                StackKind::Database,
                StackKind::Identity,
                StackKind::Registry,
            ],
            &inputs(),
        )
        .unwrap();

    assert_eq!(
        store.get("dev-network-httpsListenerArn").unwrap(),
        Some(ParameterValue::from("null"))
    );

    let manifests = sink.0.lock().unwrap();
    let service = manifests.last().unwrap();
    assert_eq!(service.kind, StackKind::Service);

    let resources = service.template["Resources"].as_object().unwrap();
    let rules: Vec<_> = resources
        .values()
        .filter(|r| r["Type"] == ResourceKind::ListenerRule.as_str())
        .collect();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["Properties"]["Priority"], 2);
}

#[test]
fn service_reads_before_its_producers_fail_with_missing_contract() {
    let store = Arc::new(TestStore::default());
    let sink = Arc::new(TestSink::default());
    let err = orchestrator(store, Arc::clone(&sink))
        .deploy(StackKind::Service, &inputs())
        .unwrap_err();

    assert!(matches!(err, StackweaveError::Domain(DomainError::MissingContract { .. })));
    assert!(sink.0.lock().unwrap().is_empty());
}

#[test]
fn resynthesis_is_deterministic() {
    let store = Arc::new(TestStore::default());
    let sink = Arc::new(TestSink::default());
    let orchestrator = orchestrator(store, sink);

    orchestrator.deploy(StackKind::Network, &inputs()).unwrap();
    let first = orchestrator.synthesize(StackKind::Database, &inputs()).unwrap();
    let second = orchestrator.synthesize(StackKind::Database, &inputs()).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn retention_evicts_only_the_oldest_of_eleven() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let images: Vec<ImageRecord> = (0..11)
        .map(|n| ImageRecord {
            digest: format!("sha256:{n:02}"),
            pushed_at: start + Duration::hours(n),
            tags: vec![format!("1.0.{n}")],
        })
        .collect();

    let evicted = RetentionRule::new(10).evictions(&images);
    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].digest, "sha256:00");
}

#[test]
fn full_plan_puts_network_first() {
    let plan = DeploymentPlan::full().unwrap();
    let network = plan.position(StackKind::Network).unwrap();
    for consumer in [StackKind::Database, StackKind::Service, StackKind::Bastion, StackKind::BackendDomain] {
        assert!(network < plan.position(consumer).unwrap());
    }
}
