use std::borrow::Cow;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to deserialize dynamic config from JSON"))]
    DeserializeJson { source: serde_json::Error },

    #[snafu(display("failed to serialize dynamic config to JSON"))]
    SerializeJson { source: serde_json::Error },

    #[snafu(display("dynamic config must be an object, got {found}"))]
    NotAnObject { found: &'static str },
}

/// An arbitrary, schemaless part of the collector configuration.
///
/// Every key is kept verbatim, no matter if the engine knows about it or not. An absent (or `null`)
/// config is represented as an empty object and serializes to `{}`, never to `null`.
///
/// Cloning creates a fully independent copy.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AnyConfig {
    object: Map<String, Value>,
}

impl AnyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document. Fails on malformed input or if the document is not an object.
    /// A JSON `null` is accepted and results in an empty config.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context(DeserializeJsonSnafu)
    }

    pub fn to_json_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.object).context(SerializeJsonSnafu)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.object.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.object.get_mut(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.object.insert(key.into(), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.object.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.object.is_empty()
    }

    pub fn as_object(&self) -> &Map<String, Value> {
        &self.object
    }
}

impl From<Map<String, Value>> for AnyConfig {
    fn from(object: Map<String, Value>) -> Self {
        Self { object }
    }
}

impl From<AnyConfig> for Value {
    fn from(config: AnyConfig) -> Self {
        Value::Object(config.object)
    }
}

impl TryFrom<Value> for AnyConfig {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(object) => Ok(Self { object }),
            other => NotAnObjectSnafu {
                found: value_type(&other),
            }
            .fail(),
        }
    }
}

impl Serialize for AnyConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.object.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AnyConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Option::<Map<String, Value>>::deserialize(deserializer)?;
        Ok(Self {
            object: object.unwrap_or_default(),
        })
    }
}

impl JsonSchema for AnyConfig {
    fn schema_name() -> Cow<'static, str> {
        "AnyConfig".into()
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "object",
            "x-kubernetes-preserve-unknown-fields": true,
        })
    }
}

/// Human readable name of the JSON type of `value`, used in error messages.
pub(crate) fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
