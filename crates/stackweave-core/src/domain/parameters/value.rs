use serde::{Deserialize, Serialize};
use std::fmt;

/// A value held by the parameter store.
///
/// Lists are a distinct variant; they are never joined into one string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    String(String),
    StringList(Vec<String>),
}

impl ParameterValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::StringList(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::StringList(items) => Some(items),
            Self::String(_) => None,
        }
    }

    pub const fn shape(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::StringList(_) => "string list",
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for ParameterValue {
    fn from(items: Vec<String>) -> Self {
        Self::StringList(items)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::StringList(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_and_string_stay_distinct_in_json() {
        let list = ParameterValue::from(vec!["a".to_string(), "b".to_string()]);
        let joined = ParameterValue::from("a,b");

        let list_json = serde_json::to_string(&list).unwrap();
        let joined_json = serde_json::to_string(&joined).unwrap();
        assert_eq!(list_json, r#"["a","b"]"#);
        assert_eq!(joined_json, r#""a,b""#);

        assert_eq!(serde_json::from_str::<ParameterValue>(&list_json).unwrap(), list);
        assert_eq!(serde_json::from_str::<ParameterValue>(&joined_json).unwrap(), joined);
    }

    #[test]
    fn accessors_respect_shape() {
        let value = ParameterValue::from("x");
        assert_eq!(value.as_string(), Some("x"));
        assert!(value.as_list().is_none());
        assert_eq!(value.shape(), "string");
    }
}
