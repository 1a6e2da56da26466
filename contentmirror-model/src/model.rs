use crate::schema::{map_fields, FieldDescriptor, ModelField, TargetType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// The model handed to the target store for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    pub fields: BTreeMap<String, ModelField>,
}

impl ModelDefinition {
    /// Runs the schema mapper over `descriptors` and names the result.
    ///
    /// Unresolved references are kept as best-effort fields and logged.
    pub fn from_descriptors(
        name: impl Into<String>,
        descriptors: &BTreeMap<String, FieldDescriptor>,
    ) -> Self {
        let model = Self {
            name: name.into(),
            fields: map_fields(descriptors),
        };

        for field in model.unresolved_fields() {
            warn!(
                "Model {}: field {} references an undeclared entity kind",
                model.name, field
            );
        }

        model
    }

    pub fn field(&self, name: &str) -> Option<&ModelField> {
        self.fields.get(name)
    }

    /// Names of reference fields whose target kind could not be resolved.
    pub fn unresolved_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, f)| f.target == TargetType::Unresolved)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Entity kinds this model points at, deduplicated and sorted.
    pub fn referenced_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self
            .fields
            .values()
            .filter_map(|f| match &f.target {
                TargetType::Entity(kind) => Some(kind.as_str()),
                _ => None,
            })
            .collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }
}
