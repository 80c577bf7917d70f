//! FILENAME: pivot-engine/src/lib.rs
//! Pivot subsystem for hierarchical tables.
//!
//! This crate turns flat records into a table whose row and column labels
//! are tuples. It depends on `table-engine` for the shared types (Table,
//! LabelAxis, CellValue) and hands back an ordinary `Table`, so every
//! calculation, search and reordering operation applies to the result.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the pivot IS)
//! - `cache`: Interned groups and accumulators (HOW we compute)
//! - `engine`: Field resolution and table assembly

pub mod cache;
pub mod definition;
pub mod engine;

pub use cache::{
    AggregateAccumulator, CellAccumulators, FieldCache, GroupKey, Observation, PivotCache, ValueId,
};
pub use definition::{AggregationType, FieldIndex, PivotDefinition, DEFAULT_MARGINS_NAME};
pub use engine::{calculate_pivot, resolve_fields, ResolvedFields};
