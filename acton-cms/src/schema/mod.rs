//! Resource schemas and the schema registry
//!
//! A schema is a plural resource name plus an ordered list of fields. It is
//! built once from caller input and drives everything downstream: the four
//! tables, the module descriptors and the route table.

pub mod field;
pub mod naming;
pub mod registry;
pub mod resource;

pub use field::{FieldOptions, FieldSpec, FieldType, FieldValue};
pub use naming::Naming;
pub use registry::SchemaRegistry;
pub use resource::ResourceSchema;
