//! The explicit stack graph and the deployment order derived from it.

use petgraph::{
    algo::{tarjan_scc, toposort},
    graph::{DiGraph, NodeIndex},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::{
    environment::ApplicationEnvironment, error::DomainError, parameters::Family,
};

/// Region that edge resources (CDN certificates and aliases) must live in.
pub const EDGE_REGION: &str = "us-east-1";

/// Every independently deployable stack in the estate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackKind {
    Network,
    Database,
    Identity,
    Registry,
    Storage,
    Frontend,
    Service,
    BackendCertificate,
    FrontendCertificate,
    BackendDomain,
    FrontendDomain,
    Bastion,
}

impl StackKind {
    pub const ALL: [Self; 12] = [
        Self::Network,
        Self::Database,
        Self::Identity,
        Self::Registry,
        Self::Storage,
        Self::Frontend,
        Self::Service,
        Self::BackendCertificate,
        Self::FrontendCertificate,
        Self::BackendDomain,
        Self::FrontendDomain,
        Self::Bastion,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Database => "database",
            Self::Identity => "identity",
            Self::Registry => "registry",
            Self::Storage => "storage",
            Self::Frontend => "frontend",
            Self::Service => "service",
            Self::BackendCertificate => "backend-certificate",
            Self::FrontendCertificate => "frontend-certificate",
            Self::BackendDomain => "backend-domain",
            Self::FrontendDomain => "frontend-domain",
            Self::Bastion => "bastion",
        }
    }

    /// Stacks whose published contracts this stack consumes.
    pub fn reads(&self) -> &'static [StackKind] {
        match self {
            Self::Database => &[Self::Network],
            Self::Service => &[Self::Network, Self::Database, Self::Identity, Self::Registry],
            Self::BackendDomain => &[Self::Network],
            Self::FrontendDomain => &[Self::Frontend],
            Self::Bastion => &[Self::Network, Self::Database],
            Self::Network
            | Self::Identity
            | Self::Registry
            | Self::Storage
            | Self::Frontend
            | Self::BackendCertificate
            | Self::FrontendCertificate => &[],
        }
    }

    /// The family this stack publishes, if any.
    pub const fn publishes(&self) -> Option<Family> {
        match self {
            Self::Network => Some(Family::Network),
            Self::Database => Some(Family::Database),
            Self::Identity => Some(Family::Cognito),
            Self::Registry => Some(Family::Registry),
            Self::Storage => Some(Family::S3),
            Self::Frontend => Some(Family::Frontend),
            _ => None,
        }
    }

    /// Region override for stacks that must live next to the CDN.
    pub const fn pinned_region(&self) -> Option<&'static str> {
        match self {
            Self::Frontend | Self::FrontendCertificate | Self::FrontendDomain => Some(EDGE_REGION),
            _ => None,
        }
    }

    /// The deployed stack name.
    pub fn stack_name(&self, env: &ApplicationEnvironment) -> String {
        match self {
            Self::Network => format!("{}-network-stack", env.stage()),
            Self::Registry => format!("{}-repository-stack", env.application_name()),
            Self::Database => env.prefix("database-stack"),
            Self::Identity => env.prefix("cognito-stack"),
            Self::Storage => env.prefix("storage-stack"),
            Self::Frontend => env.prefix("frontend-stack"),
            Self::Service => env.prefix("service-stack"),
            Self::BackendCertificate => env.prefix("certificate-stack"),
            Self::FrontendCertificate => env.prefix("frontend-certificate-stack"),
            Self::BackendDomain => env.prefix("backend-domain-stack"),
            Self::FrontendDomain => env.prefix("frontend-domain-stack"),
            Self::Bastion => env.prefix("bastion-stack"),
        }
    }
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StackKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| DomainError::invalid_input("stack", format!("unknown stack: {s}")))
    }
}

// ── DeploymentPlan ───────────────────────────────────────────────────────────

/// A topological order over a set of stacks: every producer precedes its
/// consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    order: Vec<StackKind>,
}

impl DeploymentPlan {
    /// The order for the whole estate.
    pub fn full() -> Result<Self, DomainError> {
        Self::for_stacks(&StackKind::ALL)
    }

    /// The order for a subset, using [`StackKind::reads`] edges between
    /// members of the subset.
    pub fn for_stacks(stacks: &[StackKind]) -> Result<Self, DomainError> {
        Self::from_edges(stacks, |kind| kind.reads().to_vec())
    }

    /// The order for `stacks` given an arbitrary read relation.
    pub fn from_edges<F>(stacks: &[StackKind], reads: F) -> Result<Self, DomainError>
    where
        F: Fn(StackKind) -> Vec<StackKind>,
    {
        let mut graph: DiGraph<StackKind, ()> = DiGraph::new();
        let mut nodes: HashMap<StackKind, NodeIndex> = HashMap::new();

        for &kind in stacks {
            nodes.entry(kind).or_insert_with(|| graph.add_node(kind));
        }
        for &consumer in stacks {
            for producer in reads(consumer) {
                if let (Some(&from), Some(&to)) = (nodes.get(&producer), nodes.get(&consumer)) {
                    graph.update_edge(from, to, ());
                }
            }
        }

        match toposort(&graph, None) {
            Ok(sorted) => Ok(Self {
                order: sorted.into_iter().map(|ix| graph[ix]).collect(),
            }),
            Err(cycle) => {
                let offending = cycle.node_id();
                let members = tarjan_scc(&graph)
                    .into_iter()
                    .find(|component| component.contains(&offending))
                    .unwrap_or_else(|| vec![offending]);
                let mut stacks: Vec<String> =
                    members.into_iter().map(|ix| graph[ix].to_string()).collect();
                stacks.sort();
                Err(DomainError::DependencyCycle { stacks })
            }
        }
    }

    pub fn order(&self) -> &[StackKind] {
        &self.order
    }

    pub fn position(&self, kind: StackKind) -> Option<usize> {
        self.order.iter().position(|k| *k == kind)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::DeploymentStage;

    #[test]
    fn every_producer_precedes_its_consumers() {
        let plan = DeploymentPlan::full().unwrap();
        assert_eq!(plan.len(), StackKind::ALL.len());

        for consumer in StackKind::ALL {
            for producer in consumer.reads() {
                assert!(
                    plan.position(*producer) < plan.position(consumer),
                    "{producer} must deploy before {consumer}"
                );
            }
        }
    }

    #[test]
    fn subset_ignores_edges_to_absent_stacks() {
        let plan = DeploymentPlan::for_stacks(&[StackKind::Service, StackKind::Network]).unwrap();
        assert_eq!(plan.order(), [StackKind::Network, StackKind::Service]);
    }

    #[test]
    fn cycle_is_reported_with_its_members() {
        let reads = |kind: StackKind| match kind {
            StackKind::Network => vec![StackKind::Database],
            StackKind::Database => vec![StackKind::Network],
            _ => vec![],
        };
        let err = DeploymentPlan::from_edges(
            &[StackKind::Network, StackKind::Database, StackKind::Identity],
            reads,
        )
        .unwrap_err();

        assert_eq!(
            err,
            DomainError::DependencyCycle {
                stacks: vec!["database".into(), "network".into()]
            }
        );
    }

    #[test]
    fn only_platform_stacks_publish() {
        assert_eq!(StackKind::Network.publishes(), Some(Family::Network));
        assert_eq!(StackKind::Identity.publishes(), Some(Family::Cognito));
        assert_eq!(StackKind::Service.publishes(), None);
        assert_eq!(StackKind::Bastion.publishes(), None);
    }

    #[test]
    fn stack_names() {
        let env = ApplicationEnvironment::new("finance-log", DeploymentStage::Dev).unwrap();
        assert_eq!(StackKind::Network.stack_name(&env), "dev-network-stack");
        assert_eq!(StackKind::Service.stack_name(&env), "dev-finance-log-service-stack");
        assert_eq!(StackKind::Registry.stack_name(&env), "finance-log-repository-stack");
    }

    #[test]
    fn kinds_parse_from_cli_names() {
        assert_eq!("backend-domain".parse::<StackKind>().unwrap(), StackKind::BackendDomain);
        assert_eq!("frontend_certificate".parse::<StackKind>().unwrap(), StackKind::FrontendCertificate);
        assert!("queue".parse::<StackKind>().is_err());
    }
}
