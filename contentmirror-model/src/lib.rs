//! Schema mapping for contentmirror.
//!
//! Turns the source's per-kind attribute declarations into target-store
//! model definitions:
//! - [`FieldDescriptor`]: one declared attribute (scalar or reference)
//! - [`ModelField`]: the derived store field (`target` + `is_list`)
//! - [`map_fields`]: the pure descriptor → field mapping (drops `id`)
//! - [`ModelDefinition`]: a named set of fields for one entity kind
//!
//! Recovering reference targets from the source's JSON schema happens in
//! [`FieldDescriptor::from_schema_property`]; the mapper itself never
//! inspects raw schema JSON.

mod model;
mod schema;
mod source_schema;

pub use model::ModelDefinition;
pub use schema::{map_fields, FieldDescriptor, ModelField, PrimitiveType, TargetType, ID_FIELD};
pub use source_schema::{descriptors_from_schema, DISCRIMINATOR};
