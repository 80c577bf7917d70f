//! FILENAME: table-engine/src/table.rs
//! PURPOSE: The rectangular value grid addressed by (row label, column label).
//! CONTEXT: A `Table` owns a row axis, a column axis and a dense row-major
//! grid. Row and column operations share one code path through `AxisKind`:
//! a "vector" along `Columns` is one column (one value per row), along
//! `Rows` it is one row (one value per column).

use serde::{Deserialize, Serialize};

use crate::axis::{AxisKind, LabelAxis};
use crate::error::{TableError, TableResult};
use crate::label::{Label, LevelRef};
use crate::value::{CellValue, LevelValue};

/// Serialized form; deserialization re-checks the grid against the axes.
#[derive(Serialize, Deserialize)]
struct RawTable {
    rows: LabelAxis,
    columns: LabelAxis,
    values: Vec<Vec<CellValue>>,
}

/// Tables are produced by the pivot engine or built directly from flat data,
/// then grown in place by calculated fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct Table {
    rows: LabelAxis,
    columns: LabelAxis,
    /// values[r][c] is the value at (rows[r], columns[c]).
    values: Vec<Vec<CellValue>>,
}

impl TryFrom<RawTable> for Table {
    type Error = TableError;

    fn try_from(raw: RawTable) -> TableResult<Self> {
        Table::new(raw.rows, raw.columns, raw.values)
    }
}

impl From<Table> for RawTable {
    fn from(table: Table) -> Self {
        RawTable {
            rows: table.rows,
            columns: table.columns,
            values: table.values,
        }
    }
}

impl Table {
    /// Creates a table, checking `|values| = |rows| x |columns|`.
    pub fn new(rows: LabelAxis, columns: LabelAxis, values: Vec<Vec<CellValue>>) -> TableResult<Self> {
        if values.len() != rows.len() {
            return Err(TableError::Shape(format!(
                "grid has {} rows, row axis has {} labels",
                values.len(),
                rows.len()
            )));
        }
        if let Some((r, row)) = values
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(TableError::Shape(format!(
                "grid row {} has {} values, column axis has {} labels",
                r,
                row.len(),
                columns.len()
            )));
        }

        Ok(Table { rows, columns, values })
    }

    /// Builds a flat table (one column per field, one row per record) from
    /// named columns. Rows are labelled `0..n`.
    pub fn from_columns<I, S>(columns: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = (S, Vec<CellValue>)>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        let mut data: Vec<Vec<CellValue>> = Vec::new();
        for (name, values) in columns {
            names.push(name.into());
            data.push(values);
        }

        let record_count = data.first().map_or(0, Vec::len);
        if let Some((i, _)) = data.iter().enumerate().find(|(_, c)| c.len() != record_count) {
            return Err(TableError::Shape(format!(
                "field '{}' has {} values, expected {}",
                names[i],
                data[i].len(),
                record_count
            )));
        }

        let column_axis = LabelAxis::single(None, names)?;
        let values = (0..record_count)
            .map(|r| data.iter().map(|column| column[r].clone()).collect())
            .collect();
        Table::new(LabelAxis::range(record_count), column_axis, values)
    }

    pub fn rows(&self) -> &LabelAxis {
        &self.rows
    }

    pub fn columns(&self) -> &LabelAxis {
        &self.columns
    }

    pub fn axis(&self, kind: AxisKind) -> &LabelAxis {
        match kind {
            AxisKind::Rows => &self.rows,
            AxisKind::Columns => &self.columns,
        }
    }

    /// (row count, column count)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_level_count(&self) -> usize {
        self.rows.depth()
    }

    pub fn column_level_count(&self) -> usize {
        self.columns.depth()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Row-major grid.
    pub fn values(&self) -> &[Vec<CellValue>] {
        &self.values
    }

    pub fn value_at(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.values.get(row).and_then(|r| r.get(col))
    }

    /// Looks up the value at (row label, column label).
    pub fn get(&self, row: &Label, column: &Label) -> Option<&CellValue> {
        let r = self.rows.position(row)?;
        let c = self.columns.position(column)?;
        self.value_at(r, c)
    }

    pub(crate) fn set_value(&mut self, row: usize, col: usize, value: CellValue) {
        self.values[row][col] = value;
    }

    /// The values along the other axis at position `pos` of `kind`.
    pub fn vector(&self, kind: AxisKind, pos: usize) -> TableResult<Vec<CellValue>> {
        let len = self.axis(kind).len();
        if pos >= len {
            return Err(TableError::NotFound(format!(
                "position {} is out of range for {} of length {}",
                pos, kind, len
            )));
        }
        Ok(match kind {
            AxisKind::Columns => self.values.iter().map(|row| row[pos].clone()).collect(),
            AxisKind::Rows => self.values[pos].clone(),
        })
    }

    /// The values along the other axis for an exact label of `kind`.
    pub fn vector_by_label(&self, kind: AxisKind, label: &Label) -> TableResult<Vec<CellValue>> {
        let pos = self.axis(kind).position(label).ok_or_else(|| {
            TableError::NotFound(format!(
                "{} '{}' does not exist in the table",
                kind.noun(),
                label
            ))
        })?;
        self.vector(kind, pos)
    }

    /// Inserts a labelled vector at `pos` of `kind`. `values` must have one
    /// entry per label of the other axis.
    pub fn insert_vector(
        &mut self,
        kind: AxisKind,
        pos: usize,
        label: Label,
        values: Vec<CellValue>,
    ) -> TableResult<()> {
        let expected = self.axis(kind.other()).len();
        if values.len() != expected {
            return Err(TableError::Shape(format!(
                "new {} {} has {} values, expected {}",
                kind.noun(),
                label,
                values.len(),
                expected
            )));
        }

        match kind {
            AxisKind::Columns => {
                self.columns.insert(pos, label)?;
                for (row, value) in self.values.iter_mut().zip(values) {
                    row.insert(pos, value);
                }
            }
            AxisKind::Rows => {
                self.rows.insert(pos, label)?;
                self.values.insert(pos, values);
            }
        }
        Ok(())
    }

    /// Swaps rows and columns.
    pub fn transpose(&self) -> Table {
        let (row_count, col_count) = self.shape();
        let values = (0..col_count)
            .map(|c| (0..row_count).map(|r| self.values[r][c].clone()).collect())
            .collect();
        Table {
            rows: self.columns.clone(),
            columns: self.rows.clone(),
            values,
        }
    }

    /// Replaces the axis of `kind`, re-projecting the grid so that entry `i`
    /// of the new axis takes the values previously at `order[i]`. `order`
    /// must be a permutation of `0..len`.
    pub fn with_axis(&self, kind: AxisKind, axis: LabelAxis, order: &[usize]) -> TableResult<Table> {
        let current = self.axis(kind).len();
        if axis.len() != current || order.len() != current {
            return Err(TableError::Shape(format!(
                "re-projection of {} needs {} labels, got {}",
                kind,
                current,
                axis.len()
            )));
        }
        let mut seen = vec![false; current];
        for &i in order {
            match seen.get_mut(i) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(TableError::Shape(format!(
                        "re-projection order of {} is not a permutation of 0..{}: {:?}",
                        kind, current, order
                    )))
                }
            }
        }

        let values = match kind {
            AxisKind::Rows => order.iter().map(|&r| self.values[r].clone()).collect(),
            AxisKind::Columns => self
                .values
                .iter()
                .map(|row| order.iter().map(|&c| row[c].clone()).collect())
                .collect(),
        };

        let (rows, columns) = match kind {
            AxisKind::Rows => (axis, self.columns.clone()),
            AxisKind::Columns => (self.rows.clone(), axis),
        };
        Table::new(rows, columns, values)
    }

    /// Values at one level of an axis (see [`LabelAxis::level_values`]).
    pub fn level_values(
        &self,
        kind: AxisKind,
        level: impl Into<LevelRef>,
        unique: bool,
    ) -> TableResult<Vec<LevelValue>> {
        self.axis(kind).level_values(&level.into(), unique)
    }
}
