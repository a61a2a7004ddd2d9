//! Core abstractions shared by the pipeline stages.
//!
//! - [`schema`]: table and column metadata
//! - [`value`]: row cell representation
//! - [`traits`]: reader, writer and type mapper seams
//! - [`identifier`]: identifier validation and quoting

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{Column, Table};
pub use traits::{ColumnMapping, SourceReader, TargetWriter, TypeMapper, TypeMapping};
pub use value::{Batch, SqlValue};
