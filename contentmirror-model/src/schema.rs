use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The attribute every entity carries implicitly. Never materialized as a
/// model field.
pub const ID_FIELD: &str = "id";

/// Scalar kinds a source attribute can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Number,
    Integer,
    Boolean,
}

impl PrimitiveType {
    /// Parses a JSON-schema `type` keyword. Returns `None` for anything that
    /// is not a scalar (objects, arrays, null, unknown names).
    pub fn from_schema_type(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attribute of an entity kind as declared by the source schema.
///
/// References carry only the name of the kind they point at, never a nested
/// schema, so mutually referencing kinds (a user's pages, a page's author)
/// stay a flat description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDescriptor {
    /// A plain value.
    Scalar { primitive: PrimitiveType },
    /// A single reference to another entity.
    Reference { refers_to: Option<String> },
    /// A list of references to other entities.
    ReferenceList { refers_to: Option<String> },
}

impl FieldDescriptor {
    pub fn scalar(primitive: PrimitiveType) -> Self {
        Self::Scalar { primitive }
    }

    pub fn reference(refers_to: impl Into<String>) -> Self {
        Self::Reference {
            refers_to: Some(refers_to.into()),
        }
    }

    pub fn reference_list(refers_to: impl Into<String>) -> Self {
        Self::ReferenceList {
            refers_to: Some(refers_to.into()),
        }
    }

    /// Name of the referenced kind, for resolved references.
    pub fn refers_to(&self) -> Option<&str> {
        match self {
            Self::Scalar { .. } => None,
            Self::Reference { refers_to } | Self::ReferenceList { refers_to } => {
                refers_to.as_deref()
            }
        }
    }
}

/// What a model field stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum TargetType {
    Primitive(PrimitiveType),
    /// A reference to instances of the named entity kind.
    Entity(String),
    /// A reference whose target kind the source did not declare.
    Unresolved,
}

/// Target-store field definition derived from a [`FieldDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelField {
    pub target: TargetType,
    pub is_list: bool,
}

impl ModelField {
    /// Name of the stored type: the primitive name or the referenced kind.
    /// `None` for unresolved references.
    pub fn target_name(&self) -> Option<&str> {
        match &self.target {
            TargetType::Primitive(p) => Some(p.as_str()),
            TargetType::Entity(kind) => Some(kind.as_str()),
            TargetType::Unresolved => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        !matches!(self.target, TargetType::Primitive(_))
    }
}

impl From<&FieldDescriptor> for ModelField {
    fn from(descriptor: &FieldDescriptor) -> Self {
        let reference = |refers_to: &Option<String>| {
            refers_to
                .clone()
                .map_or(TargetType::Unresolved, TargetType::Entity)
        };

        match descriptor {
            FieldDescriptor::Scalar { primitive } => Self {
                target: TargetType::Primitive(*primitive),
                is_list: false,
            },
            FieldDescriptor::Reference { refers_to } => Self {
                target: reference(refers_to),
                is_list: false,
            },
            FieldDescriptor::ReferenceList { refers_to } => Self {
                target: reference(refers_to),
                is_list: true,
            },
        }
    }
}

/// Maps declared attributes to model fields, dropping `id`.
///
/// Output is keyed and ordered by field name, so repeated calls over the
/// same descriptors produce identical models.
pub fn map_fields(
    descriptors: &BTreeMap<String, FieldDescriptor>,
) -> BTreeMap<String, ModelField> {
    descriptors
        .iter()
        .filter(|(name, _)| name.as_str() != ID_FIELD)
        .map(|(name, descriptor)| (name.clone(), ModelField::from(descriptor)))
        .collect()
}
