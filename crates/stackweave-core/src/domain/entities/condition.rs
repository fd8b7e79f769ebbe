use serde_json::{Value, json};

/// A synthesis-time condition guarding optional resources.
///
/// Operands are the literal values loaded from the contract store, so a
/// condition can be both rendered into the manifest and evaluated locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals(String, String),
    Not(Box<Condition>),
}

impl Condition {
    pub fn equals(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::Equals(left.into(), right.into())
    }

    pub fn not(inner: Condition) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn evaluate(&self) -> bool {
        match self {
            Self::Equals(left, right) => left == right,
            Self::Not(inner) => !inner.evaluate(),
        }
    }

    pub(crate) fn render(&self) -> Value {
        match self {
            Self::Equals(left, right) => json!({ "Fn::Equals": [left, right] }),
            Self::Not(inner) => json!({ "Fn::Not": [inner.render()] }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_equals_evaluates() {
        let guard = |value: &str| Condition::not(Condition::equals(value, "null"));

        assert!(!guard("null").evaluate());
        assert!(guard("arn:aws:elasticloadbalancing:listener/1").evaluate());
        assert!(guard("").evaluate());
    }

    #[test]
    fn renders_intrinsic_functions() {
        let guard = Condition::not(Condition::equals("x", "null"));
        assert_eq!(
            guard.render(),
            json!({ "Fn::Not": [{ "Fn::Equals": ["x", "null"] }] })
        );
    }
}
