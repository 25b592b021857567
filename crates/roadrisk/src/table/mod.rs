//! Typed tables shared by the normalizer and the classifier.

mod frame;
mod persistence;
mod value;

pub(crate) use persistence::ensure_parent_dir;

pub use frame::{Column, Table};
pub use value::{Cell, TIMESTAMP_FORMAT, Value, infer_column_type, parse_cell, render_cell};
