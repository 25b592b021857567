//! Canonical schema: column names, aliases and label types.

mod mapping;
mod types;

pub use mapping::{SchemaMapping, columns};
pub use types::{ColumnType, Severity, TimeOfDay};
