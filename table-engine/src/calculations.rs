//! FILENAME: table-engine/src/calculations.rs
//! PURPOSE: Arithmetic used by calculated fields plus whole-table ratio
//! transformations (growth, common-size, relative-to-reference).
//! CONTEXT: The field functions share the signature expected by
//! `calculate::add_field`: they receive the source vectors in order and
//! return one vector. Empty operands propagate as Empty; any other
//! non-numeric operand is a type error.

use rustc_hash::FxHashMap;

use crate::axis::LabelAxis;
use crate::error::{TableError, TableResult};
use crate::label::{Label, LevelRef};
use crate::table::Table;
use crate::value::{CellValue, LevelValue};

// ============================================================================
// FIELD FUNCTIONS
// ============================================================================

fn operand(value: &CellValue, operation: &str) -> TableResult<Option<f64>> {
    if value.is_empty() {
        return Ok(None);
    }
    value.as_number().map(Some).ok_or_else(|| {
        TableError::Type(format!(
            "cannot use {} value '{}' in {}",
            value.kind_name(),
            value.display_value(),
            operation
        ))
    })
}

/// Applies `f` position by position across all vectors.
fn combine<F>(vectors: &[Vec<CellValue>], operation: &str, f: F) -> TableResult<Vec<CellValue>>
where
    F: Fn(&[f64]) -> f64,
{
    let len = match vectors.first() {
        Some(first) => first.len(),
        None => {
            return Err(TableError::InvalidInput(format!(
                "{} needs at least one operand",
                operation
            )))
        }
    };
    if vectors.iter().any(|v| v.len() != len) {
        return Err(TableError::Shape(format!(
            "{} operands have different lengths",
            operation
        )));
    }

    let mut result = Vec::with_capacity(len);
    let mut operands = Vec::with_capacity(vectors.len());
    for i in 0..len {
        operands.clear();
        let mut has_empty = false;
        for vector in vectors {
            match operand(&vector[i], operation)? {
                Some(n) => operands.push(n),
                None => has_empty = true,
            }
        }
        result.push(if has_empty {
            CellValue::Empty
        } else {
            CellValue::Number(f(&operands))
        });
    }
    Ok(result)
}

/// `x / y`, or 0 when `y` is 0.
fn safe_divide(x: f64, y: f64) -> f64 {
    if y == 0.0 {
        0.0
    } else {
        x / y
    }
}

pub fn sum(vectors: &[Vec<CellValue>]) -> TableResult<Vec<CellValue>> {
    combine(vectors, "sum", |ops| ops.iter().sum())
}

/// First operand minus all the others.
pub fn difference(vectors: &[Vec<CellValue>]) -> TableResult<Vec<CellValue>> {
    combine(vectors, "difference", |ops| {
        ops.iter().skip(1).fold(ops[0], |acc, n| acc - n)
    })
}

pub fn product(vectors: &[Vec<CellValue>]) -> TableResult<Vec<CellValue>> {
    combine(vectors, "product", |ops| ops.iter().product())
}

/// Ratio of two vectors, `x / y`, with 0 wherever `y` is 0.
pub fn growth(vectors: &[Vec<CellValue>]) -> TableResult<Vec<CellValue>> {
    if vectors.len() != 2 {
        return Err(TableError::InvalidInput(format!(
            "growth takes exactly 2 operands, got {}",
            vectors.len()
        )));
    }
    combine(vectors, "growth", |ops| safe_divide(ops[0], ops[1]))
}

fn ratio(numerator: &CellValue, denominator: &CellValue, operation: &str) -> TableResult<CellValue> {
    let x = operand(numerator, operation)?;
    let y = operand(denominator, operation)?;
    Ok(match (x, y) {
        (Some(x), Some(y)) => CellValue::Number(safe_divide(x, y)),
        _ => CellValue::Empty,
    })
}

// ============================================================================
// TABLE CALCULATIONS
// ============================================================================

fn ensure_has_values(table: &Table, operation: &str) -> TableResult<()> {
    if table.is_empty() {
        return Err(TableError::Shape(format!(
            "{} needs a table with at least one row and one column",
            operation
        )));
    }
    Ok(())
}

fn column_positions(table: &Table, columns: Option<&[Label]>) -> TableResult<Vec<usize>> {
    match columns {
        None => Ok((0..table.column_count()).collect()),
        Some(labels) => labels
            .iter()
            .map(|label| {
                table.columns().position(label).ok_or_else(|| {
                    TableError::NotFound(format!("column '{}' does not exist in the table", label))
                })
            })
            .collect(),
    }
}

/// Common-size statement down the rows.
///
/// Rows are grouped by the values at `group_levels`, or by every row level
/// except `category_level` when `None`. Within a group, each selected column
/// is divided by the value of the group's first row whose `category_level`
/// equals `reference`. `columns = None` selects every column; unselected
/// columns are copied unchanged.
pub fn common_size_vertical(
    table: &Table,
    category_level: impl Into<LevelRef>,
    reference: impl Into<LevelValue>,
    group_levels: Option<&[LevelRef]>,
    columns: Option<&[Label]>,
) -> TableResult<Table> {
    ensure_has_values(table, "common size")?;
    let level = table.rows().resolve_level(&category_level.into())?;
    let reference = reference.into();
    let selected = column_positions(table, columns)?;
    let key_levels: Vec<usize> = match group_levels {
        Some(levels) => levels
            .iter()
            .map(|l| table.rows().resolve_level(l))
            .collect::<TableResult<_>>()?,
        None => (0..table.row_level_count()).filter(|&l| l != level).collect(),
    };
    let group_of = |label: &Label| Label::new(key_levels.iter().map(|&l| &label[l]));

    let mut reference_rows: FxHashMap<Label, usize> = FxHashMap::default();
    for (pos, label) in table.rows().labels().iter().enumerate() {
        if label[level] == reference {
            reference_rows.entry(group_of(label)).or_insert(pos);
        }
    }

    let mut result = table.clone();
    for (r, label) in table.rows().labels().iter().enumerate() {
        let base = *reference_rows.get(&group_of(label)).ok_or_else(|| {
            TableError::NotFound(format!(
                "row group of {} has no '{}' row to divide by",
                label,
                reference
            ))
        })?;
        for &c in &selected {
            let value = ratio(&table.values()[r][c], &table.values()[base][c], "common size")?;
            result.set_value(r, c, value);
        }
    }
    Ok(result)
}

/// Each value divided by the value in the previous column of its row.
/// The first column has no predecessor and is dropped.
pub fn common_size_horizontal(table: &Table) -> TableResult<Table> {
    if table.column_count() < 2 {
        return Err(TableError::Shape(format!(
            "horizontal common size needs at least 2 columns, found {}",
            table.column_count()
        )));
    }

    let columns = LabelAxis::new(
        table.columns().names().to_vec(),
        table.columns().labels()[1..].to_vec(),
    )?;
    let values = table
        .values()
        .iter()
        .map(|row| {
            row.windows(2)
                .map(|pair| ratio(&pair[1], &pair[0], "horizontal common size"))
                .collect::<TableResult<Vec<_>>>()
        })
        .collect::<TableResult<Vec<_>>>()?;
    Table::new(table.rows().clone(), columns, values)
}

/// Selected columns divided by the values of `reference_row`.
pub fn relative_to_reference(
    table: &Table,
    reference_row: &Label,
    columns: &[Label],
) -> TableResult<Table> {
    ensure_has_values(table, "relative to reference")?;
    let base = table.rows().position(reference_row).ok_or_else(|| {
        TableError::NotFound(format!(
            "reference row '{}' does not exist in the table",
            reference_row
        ))
    })?;
    let selected = column_positions(table, Some(columns))?;

    let mut result = table.clone();
    for r in 0..table.row_count() {
        for &c in &selected {
            let value = ratio(&table.values()[r][c], &table.values()[base][c], "relative to reference")?;
            result.set_value(r, c, value);
        }
    }
    Ok(result)
}
