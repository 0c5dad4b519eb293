use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};

/// A value held in a session's state record.
///
/// Arrays whose elements are all strings load as [`StateValue::List`]; any
/// other array loads as [`StateValue::Array`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<String>),
    Array(Vec<StateValue>),
    Map(BTreeMap<String, StateValue>),
}

impl StateValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, StateValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_true(&self) -> bool {
        self.as_bool() == Some(true)
    }
}

impl From<JsonValue> for StateValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => Self::Number(n),
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(items) => {
                if items.iter().all(JsonValue::is_string) {
                    Self::List(
                        items
                            .into_iter()
                            .filter_map(|item| match item {
                                JsonValue::String(s) => Some(s),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    Self::Array(items.into_iter().map(Self::from).collect())
                }
            }
            JsonValue::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<StateValue> for JsonValue {
    fn from(value: StateValue) -> Self {
        match value {
            StateValue::Null => JsonValue::Null,
            StateValue::Bool(b) => JsonValue::Bool(b),
            StateValue::Number(n) => JsonValue::Number(n),
            StateValue::String(s) => JsonValue::String(s),
            StateValue::List(items) => items.into_iter().map(JsonValue::String).collect(),
            StateValue::Array(items) => items.into_iter().map(JsonValue::from).collect(),
            StateValue::Map(map) => JsonValue::Object(
                map.into_iter().map(|(k, v)| (k, JsonValue::from(v))).collect(),
            ),
        }
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for StateValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}
