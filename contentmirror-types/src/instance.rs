use crate::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entity instance as served by the content source.
///
/// The source decides the attribute set; the only attribute the core relies
/// on is `id`. Everything else is carried through to the target store as-is.
/// Always wraps a JSON object; decoding anything else fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct EntityInstance(Value);

impl EntityInstance {
    /// Creates an empty instance.
    pub fn new() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Creates an instance that carries only an identity, the shape used
    /// by delete records.
    pub fn id_only(id: impl Into<String>) -> Self {
        Self::new().with("id", Value::String(id.into()))
    }

    /// Converts a JSON value into an instance. Returns `None` for anything
    /// other than a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        value.is_object().then_some(Self(value))
    }

    /// The instance identity. Numeric ids are rendered as decimal strings;
    /// any other shape counts as missing.
    pub fn id(&self) -> Option<EntityId> {
        match self.0.get("id")? {
            Value::String(s) if !s.is_empty() => Some(EntityId::new(s.clone())),
            Value::Number(n) => Some(EntityId::new(n.to_string())),
            _ => None,
        }
    }

    /// Sets a top-level attribute, returning the instance for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Value::Object(map) = &mut self.0 {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Returns a top-level attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Extract a string value using a JSON pointer (e.g., "/author/id").
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.0.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Extract a boolean value using a JSON pointer.
    pub fn get_bool(&self, pointer: &str) -> Option<bool> {
        self.0.pointer(pointer).and_then(|v| v.as_bool())
    }

    /// Extract a numeric value using a JSON pointer.
    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.0.pointer(pointer).and_then(|v| v.as_f64())
    }

    /// Attribute names, in source order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.as_object().into_iter().flat_map(|map| map.keys())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Default for EntityInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Map<String, Value>> for EntityInstance {
    fn from(map: Map<String, Value>) -> Self {
        Self(Value::Object(map))
    }
}

impl TryFrom<Value> for EntityInstance {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(_) => Ok(Self(value)),
            other => Err(format!("entity must be a JSON object, got {other}")),
        }
    }
}

impl From<EntityInstance> for Value {
    fn from(instance: EntityInstance) -> Self {
        instance.0
    }
}
