//! FILENAME: table-engine/src/lib.rs
//! PURPOSE: Main library entry point for tables with hierarchical labels.
//! CONTEXT: Re-exports public types and modules for use by other crates.

pub mod axis;
pub mod calculate;
pub mod calculations;
pub mod coord;
pub mod error;
pub mod find;
pub mod groups;
pub mod label;
pub mod layout;
pub mod reorder;
pub mod table;
pub mod value;

// Re-export commonly used types at the crate root
pub use axis::{unique_name, AxisKind, LabelAxis};
pub use calculate::{add_field, add_fields_by_group, DEFAULT_SUFFIX};
pub use calculations::{
    common_size_horizontal, common_size_vertical, difference, growth, product,
    relative_to_reference, sum,
};
pub use coord::{a1_to_coord, cell_range, col_to_index, coord_to_a1, coord_to_absolute_a1, index_to_col, CellCoord};
pub use error::{TableError, TableResult};
pub use find::{find_by_name, find_by_substring, find_like, find_positions};
pub use groups::{find_common_groups, find_exact_groups, group_by_prefix, LabelGroup};
pub use label::{Label, LevelRef, LevelValues};
pub use layout::{BlockRange, HeaderStyle, RenderOptions, TableAttributes, TextAlign, VerticalAlign};
pub use reorder::{move_axis_level_to_front, move_level_to_front, sort_axis_by_order, sort_by_order};
pub use table::Table;
pub use value::{CellValue, LevelValue, OrderedFloat};
