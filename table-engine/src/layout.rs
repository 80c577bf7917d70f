//! FILENAME: table-engine/src/layout.rs
//! PURPOSE: Sheet geometry and header styling for rendering a finished table.
//! CONTEXT: A renderer writes the row labels (index block) to the left, the
//! column labels (header block) on top and the grid (data block) below the
//! headers. `TableAttributes` computes where each block lands for a given
//! top-left corner. Multi-level column headers are followed by one spacer
//! row before the data. Header styling is an explicit `HeaderStyle` value
//! carried in `RenderOptions`; nothing here is process-wide.

use serde::{Deserialize, Serialize};

use crate::coord::{cell_range, coord_to_absolute_a1, CellCoord};
use crate::error::{TableError, TableResult};
use crate::table::Table;

// ============================================================================
// HEADER STYLE
// ============================================================================

/// Horizontal alignment of header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical alignment of header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VerticalAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Style applied to header cells (row and column labels).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderStyle {
    pub bold: bool,
    pub font_size: u8, // points
    pub font_name: String,
    pub horizontal: TextAlign,
    pub vertical: VerticalAlign,
}

impl Default for HeaderStyle {
    fn default() -> Self {
        HeaderStyle {
            bold: true,
            font_size: 12,
            font_name: "Garamond".to_string(),
            horizontal: TextAlign::Center,
            vertical: VerticalAlign::Center,
        }
    }
}

impl HeaderStyle {
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_font(mut self, name: impl Into<String>, size: u8) -> Self {
        self.font_name = name.into();
        self.font_size = size;
        self
    }

    pub fn with_alignment(mut self, horizontal: TextAlign, vertical: VerticalAlign) -> Self {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self
    }
}

/// Everything the renderer receives besides the table itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub start_row: u32,
    pub start_col: u32,
    pub header_style: HeaderStyle,
}

impl RenderOptions {
    /// Options placing the table's top-left corner at (row, col).
    pub fn at(start_row: u32, start_col: u32) -> Self {
        RenderOptions {
            start_row,
            start_col,
            header_style: HeaderStyle::default(),
        }
    }

    pub fn with_header_style(mut self, style: HeaderStyle) -> Self {
        self.header_style = style;
        self
    }

    /// Geometry of `table` at these options' position.
    pub fn attributes(&self, table: &Table) -> TableResult<TableAttributes> {
        TableAttributes::new(table, self.start_row, self.start_col)
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// An inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl BlockRange {
    pub fn start(&self) -> CellCoord {
        (self.start_row, self.start_col)
    }

    pub fn end(&self) -> CellCoord {
        (self.end_row, self.end_col)
    }

    /// e.g. `$B$3`
    pub fn start_cell(&self) -> String {
        coord_to_absolute_a1(self.start())
    }

    pub fn end_cell(&self) -> String {
        coord_to_absolute_a1(self.end())
    }

    pub fn cell_range(&self, absolute: bool) -> String {
        cell_range(self.start(), self.end(), absolute)
    }

    /// One range per row (`horizontal`) or per column of the block, as used
    /// for chart series.
    pub fn series_ranges(&self, horizontal: bool, absolute: bool) -> Vec<String> {
        if horizontal {
            (self.start_row..=self.end_row)
                .map(|row| cell_range((row, self.start_col), (row, self.end_col), absolute))
                .collect()
        } else {
            (self.start_col..=self.end_col)
                .map(|col| cell_range((self.start_row, col), (self.end_row, col), absolute))
                .collect()
        }
    }
}

/// Where a table lands on a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableAttributes {
    /// The whole rendered table, headers included.
    pub table: BlockRange,
    /// Row labels, one column per row level.
    pub index: BlockRange,
    /// Column labels, one row per column level.
    pub columns: BlockRange,
    pub data: BlockRange,
    pub index_is_multi: bool,
    pub columns_is_multi: bool,
    pub index_level_names: Vec<Option<String>>,
    pub column_level_names: Vec<Option<String>>,
}

impl TableAttributes {
    /// Computes the geometry of `table` with its top-left corner at
    /// (`start_row`, `start_col`). Fails for a table without rows or columns.
    pub fn new(table: &Table, start_row: u32, start_col: u32) -> TableResult<Self> {
        let (row_count, col_count) = table.shape();
        if row_count == 0 || col_count == 0 {
            return Err(TableError::Shape(format!(
                "cannot lay out a table with {} rows and {} columns",
                row_count, col_count
            )));
        }
        let to_u32 = |n: usize| {
            u32::try_from(n).map_err(|_| {
                TableError::Shape(format!("{} cells do not fit on a sheet", n))
            })
        };
        let index_levels = to_u32(table.row_level_count())?;
        let column_levels = to_u32(table.column_level_count())?;
        let rows = to_u32(row_count)?;
        let cols = to_u32(col_count)?;
        let spacer = if table.columns().is_multi_level() { 1 } else { 0 };

        let add = |a: u32, b: u32| {
            a.checked_add(b).ok_or_else(|| {
                TableError::Shape(format!(
                    "table placed at row {}, column {} runs past the sheet edge",
                    start_row, start_col
                ))
            })
        };
        // counts are all at least 1 here
        let header_end_row = add(start_row, column_levels - 1)?;
        let data_start_row = add(header_end_row, 1 + spacer)?;
        let data_start_col = add(start_col, index_levels)?;
        let end_row = add(data_start_row, rows - 1)?;
        let end_col = add(data_start_col, cols - 1)?;

        Ok(TableAttributes {
            table: BlockRange {
                start_row,
                start_col,
                end_row,
                end_col,
            },
            index: BlockRange {
                start_row: data_start_row,
                start_col,
                end_row,
                end_col: data_start_col - 1,
            },
            columns: BlockRange {
                start_row,
                start_col: data_start_col,
                end_row: header_end_row,
                end_col,
            },
            data: BlockRange {
                start_row: data_start_row,
                start_col: data_start_col,
                end_row,
                end_col,
            },
            index_is_multi: table.rows().is_multi_level(),
            columns_is_multi: table.columns().is_multi_level(),
            index_level_names: table.rows().names().to_vec(),
            column_level_names: table.columns().names().to_vec(),
        })
    }

    pub fn index_levels(&self) -> usize {
        self.index_level_names.len()
    }

    pub fn column_levels(&self) -> usize {
        self.column_level_names.len()
    }
}
