use serde_json::{Value, json};
use std::collections::BTreeMap;

use super::{
    common::{Taggable, Tags},
    condition::Condition,
    resource::{IdentityMinter, Resource, ResourceKind},
};
use crate::domain::{
    parameters::Contract, topology::StackKind, value_objects::DeployTarget,
};

/// A named stack output.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    value: Value,
    description: Option<String>,
}

impl Output {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// One independently deployable unit: resources, conditions, outputs and
/// the contracts it publishes.
///
/// Every map is ordered by logical id, so [`Stack::render`] is stable.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    name: String,
    kind: StackKind,
    target: DeployTarget,
    resources: BTreeMap<String, Resource>,
    conditions: BTreeMap<String, Condition>,
    outputs: BTreeMap<String, Output>,
    tags: Tags,
    publications: Vec<Contract>,
}

impl Stack {
    pub fn new(kind: StackKind, name: impl Into<String>, target: DeployTarget) -> Self {
        Self {
            name: name.into(),
            kind,
            target,
            resources: BTreeMap::new(),
            conditions: BTreeMap::new(),
            outputs: BTreeMap::new(),
            tags: Tags::default(),
            publications: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StackKind {
        self.kind
    }

    pub fn target(&self) -> &DeployTarget {
        &self.target
    }

    /// Identity minter scoped to this stack.
    pub fn minter(&self) -> IdentityMinter {
        IdentityMinter::new(&self.target, &self.name)
    }

    /// Declare a resource. Logical ids are unique within a stack.
    pub fn add_resource(&mut self, logical_id: impl Into<String>, resource: Resource) {
        let logical_id = logical_id.into();
        debug_assert!(
            !self.resources.contains_key(&logical_id),
            "duplicate logical id {logical_id}"
        );
        self.resources.insert(logical_id, resource);
    }

    pub fn add_condition(&mut self, name: impl Into<String>, condition: Condition) {
        self.conditions.insert(name.into(), condition);
    }

    pub fn add_output(&mut self, name: impl Into<String>, output: Output) {
        self.outputs.insert(name.into(), output);
    }

    /// Record a contract to write to the parameter store on deploy.
    pub fn publish(&mut self, contract: impl Into<Contract>) {
        self.publications.push(contract.into());
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn resources(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// Every resource of one kind, in logical-id order.
    pub fn resources_of(&self, kind: ResourceKind) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources().filter(move |(_, r)| r.kind() == kind)
    }

    pub fn condition(&self, name: &str) -> Option<&Condition> {
        self.conditions.get(name)
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn publications(&self) -> &[Contract] {
        &self.publications
    }

    /// Render the deployable manifest.
    pub fn render(&self) -> Value {
        let resources: serde_json::Map<String, Value> = self
            .resources
            .iter()
            .map(|(id, resource)| (id.clone(), resource.render(&self.tags)))
            .collect();

        let mut manifest = serde_json::Map::new();
        manifest.insert("Description".into(), json!(self.name));
        manifest.insert("Metadata".into(), json!({ "Tags": self.tags }));

        if !self.conditions.is_empty() {
            let conditions: serde_json::Map<String, Value> = self
                .conditions
                .iter()
                .map(|(name, c)| (name.clone(), c.render()))
                .collect();
            manifest.insert("Conditions".into(), Value::Object(conditions));
        }

        manifest.insert("Resources".into(), Value::Object(resources));

        if !self.outputs.is_empty() {
            let outputs: serde_json::Map<String, Value> = self
                .outputs
                .iter()
                .map(|(name, output)| {
                    let mut entry = json!({ "Value": output.value });
                    if let Some(description) = &output.description {
                        entry["Description"] = json!(description);
                    }
                    (name.clone(), entry)
                })
                .collect();
            manifest.insert("Outputs".into(), Value::Object(outputs));
        }

        Value::Object(manifest)
    }
}

impl Taggable for Stack {
    fn set_tag(&mut self, key: &str, value: &str) {
        self.tags.set_tag(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> Stack {
        let target = DeployTarget::new("123456789012", "eu-central-1").unwrap();
        Stack::new(StackKind::Network, "dev-network-stack", target)
    }

    #[test]
    fn render_is_ordered_by_logical_id() {
        let mut a = stack();
        a.add_resource("Zeta", Resource::new(ResourceKind::Bucket, json!({})));
        a.add_resource("Alpha", Resource::new(ResourceKind::Bucket, json!({})));

        let mut b = stack();
        b.add_resource("Alpha", Resource::new(ResourceKind::Bucket, json!({})));
        b.add_resource("Zeta", Resource::new(ResourceKind::Bucket, json!({})));

        assert_eq!(a.render().to_string(), b.render().to_string());
        let keys: Vec<_> = a.render()["Resources"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, ["Alpha", "Zeta"]);
    }

    #[test]
    fn stack_tags_flow_into_resources() {
        let mut s = stack();
        s.set_tag("application", "finance-log");
        s.add_resource("Bucket", Resource::new(ResourceKind::Bucket, json!({})));

        let rendered = s.render();
        assert_eq!(
            rendered["Resources"]["Bucket"]["Properties"]["Tags"][0]["Value"],
            "finance-log"
        );
        assert_eq!(rendered["Metadata"]["Tags"]["application"], "finance-log");
    }

    #[test]
    fn conditions_and_outputs_are_rendered_when_present() {
        let mut s = stack();
        assert!(s.render().get("Conditions").is_none());

        s.add_condition("Guard", Condition::equals("a", "b"));
        s.add_output("Arn", Output::new("arn:x").with_description("the arn"));

        let rendered = s.render();
        assert!(rendered["Conditions"]["Guard"].is_object());
        assert_eq!(rendered["Outputs"]["Arn"]["Value"], "arn:x");
        assert_eq!(rendered["Outputs"]["Arn"]["Description"], "the arn");
    }
}
