//! FILENAME: pivot-engine/src/engine.rs
//! Pivot Engine - Turns flat records into a hierarchical table.
//!
//! Steps:
//! 1. Resolve the definition against the record fields
//! 2. Build the cache (interned groups and accumulators)
//! 3. Lay out row labels: distinct row combinations, sorted
//! 4. Lay out column labels: value field x sorted column combinations
//! 5. Fill the grid, zero where no record exists, then append margins
//! 6. Promote the title level to the front of the column axis

use log::debug;
use table_engine::{
    move_level_to_front, AxisKind, CellValue, Label, LabelAxis, LevelValue, Table,
    TableError, TableResult,
};

use crate::cache::{CellAccumulators, GroupKey, PivotCache};
use crate::definition::{AggregationType, FieldIndex, PivotDefinition};

// ============================================================================
// FIELD RESOLUTION
// ============================================================================

/// Definition fields resolved to record field indices.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFields {
    pub row_fields: Vec<FieldIndex>,
    pub column_fields: Vec<FieldIndex>,
    pub value_fields: Vec<FieldIndex>,
    /// Name of every record field, by index.
    pub names: Vec<String>,
}

/// Checks `definition` against the fields of `records`. Every field not used
/// as a value or column field becomes a row field, in record order.
pub fn resolve_fields(definition: &PivotDefinition, records: &Table) -> TableResult<ResolvedFields> {
    if records.row_level_count() != 1 || records.column_level_count() != 1 {
        return Err(TableError::Shape(format!(
            "pivot input must be flat, found {} row and {} column levels",
            records.row_level_count(),
            records.column_level_count()
        )));
    }
    if records.row_count() == 0 {
        return Err(TableError::Shape("pivot input has no records".to_string()));
    }
    if definition.value_fields.is_empty() {
        return Err(TableError::InvalidInput(
            "a pivot needs at least one value field".to_string(),
        ));
    }

    let names: Vec<String> = records
        .columns()
        .labels()
        .iter()
        .map(|label| label[0].to_text())
        .collect();
    let lookup = |field: &String| {
        names.iter().position(|n| n == field).ok_or_else(|| {
            TableError::NotFound(format!("field '{}' does not exist in the records", field))
        })
    };
    let value_fields = definition.value_fields.iter().map(lookup).collect::<TableResult<Vec<_>>>()?;
    let column_fields = definition.column_fields.iter().map(lookup).collect::<TableResult<Vec<_>>>()?;

    if let Some(field) = definition
        .value_fields
        .iter()
        .find(|f| definition.column_fields.contains(*f))
    {
        return Err(TableError::InvalidInput(format!(
            "field '{}' cannot be both a value and a column field",
            field
        )));
    }
    if let Some(title) = &definition.title {
        if names.contains(title) {
            return Err(TableError::InvalidInput(format!(
                "title '{}' clashes with a field of the same name",
                title
            )));
        }
    }
    if !definition.include_value_level
        && (definition.value_fields.len() != 1 || definition.column_fields.is_empty())
    {
        return Err(TableError::InvalidInput(
            "the value level can only be left out for one value field with column fields"
                .to_string(),
        ));
    }

    let row_fields: Vec<FieldIndex> = (0..names.len())
        .filter(|i| !value_fields.contains(i) && !column_fields.contains(i))
        .collect();
    if row_fields.is_empty() {
        return Err(TableError::InvalidInput(
            "every field is a value or column field, nothing is left for the rows".to_string(),
        ));
    }

    Ok(ResolvedFields {
        row_fields,
        column_fields,
        value_fields,
        names,
    })
}

// ============================================================================
// CALCULATION
// ============================================================================

/// Pivots flat `records` (one row per record, one column per field) into a
/// table with hierarchical row and column labels.
pub fn calculate_pivot(definition: &PivotDefinition, records: &Table) -> TableResult<Table> {
    let fields = resolve_fields(definition, records)?;
    let cache = PivotCache::build(
        records,
        &fields.row_fields,
        &fields.column_fields,
        &fields.value_fields,
        definition.aggregation,
    )?;

    let row_keys = cache.sorted_row_keys();
    let column_keys = cache.sorted_column_keys();
    let column_margin = definition.margins && !fields.column_fields.is_empty();

    let rows = build_row_axis(definition, &fields, &cache, &row_keys)?;
    let columns = build_column_axis(definition, &fields, &cache, &column_keys, column_margin)?;

    let aggregation = definition.aggregation;
    let value_count = fields.value_fields.len();
    let mut values: Vec<Vec<CellValue>> = Vec::with_capacity(rows.len());
    for row in &row_keys {
        let cells: Vec<Option<&CellAccumulators>> =
            column_keys.iter().map(|column| cache.cell(row, column)).collect();
        let total = if column_margin { cache.row_total(row) } else { None };
        values.push(fill_row(&cells, total, column_margin, value_count, aggregation));
    }
    if definition.margins {
        let cells: Vec<Option<&CellAccumulators>> =
            column_keys.iter().map(|column| cache.column_total(column)).collect();
        let grand = if column_margin { Some(cache.grand_total()) } else { None };
        values.push(fill_row(&cells, grand, column_margin, value_count, aggregation));
    }

    let mut table = Table::new(rows, columns, values)?;
    if let Some(title) = &definition.title {
        table = move_level_to_front(&table, AxisKind::Columns, title)?;
    }

    debug!(
        "pivot: {} records ({} skipped) -> {} rows x {} columns",
        cache.record_count(),
        cache.skipped_count(),
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

/// One output row: per value field, every column cell followed by the
/// total when `with_total`. Cells no record fell into are 0.
fn fill_row(
    cells: &[Option<&CellAccumulators>],
    total: Option<&CellAccumulators>,
    with_total: bool,
    value_count: usize,
    aggregation: AggregationType,
) -> Vec<CellValue> {
    let compute = |accs: Option<&CellAccumulators>, v: usize| {
        accs.map_or(CellValue::Number(0.0), |accs| accs[v].compute(aggregation))
    };

    let mut row = Vec::with_capacity(value_count * (cells.len() + 1));
    for v in 0..value_count {
        row.extend(cells.iter().map(|&cell| compute(cell, v)));
        if with_total {
            row.push(compute(total, v));
        }
    }
    row
}

fn build_row_axis(
    definition: &PivotDefinition,
    fields: &ResolvedFields,
    cache: &PivotCache,
    row_keys: &[GroupKey],
) -> TableResult<LabelAxis> {
    let names = fields
        .row_fields
        .iter()
        .map(|&f| Some(fields.names[f].clone()))
        .collect();
    let mut labels: Vec<Label> = row_keys.iter().map(|key| Label::new(cache.row_values(key))).collect();
    if definition.margins {
        labels.push(margin_label(&definition.margins_name, &[], fields.row_fields.len()));
    }
    LabelAxis::new(names, labels)
}

fn build_column_axis(
    definition: &PivotDefinition,
    fields: &ResolvedFields,
    cache: &PivotCache,
    column_keys: &[GroupKey],
    column_margin: bool,
) -> TableResult<LabelAxis> {
    let mut names: Vec<Option<String>> = Vec::new();
    if definition.include_value_level {
        names.push(None);
    }
    if let Some(title) = &definition.title {
        names.push(Some(title.clone()));
    }
    names.extend(fields.column_fields.iter().map(|&f| Some(fields.names[f].clone())));

    let mut labels = Vec::new();
    for &value_field in &fields.value_fields {
        let mut head: Vec<LevelValue> = Vec::new();
        if definition.include_value_level {
            head.push(LevelValue::from(&fields.names[value_field]));
        }
        if let Some(title) = &definition.title {
            head.push(LevelValue::from(title));
        }
        for key in column_keys {
            labels.push(Label::new(head.iter().cloned().chain(cache.column_values(key))));
        }
        if column_margin {
            labels.push(margin_label(&definition.margins_name, &head, fields.column_fields.len()));
        }
    }
    LabelAxis::new(names, labels)
}

/// `head`, then `name`, then empty levels up to `head.len() + width`.
fn margin_label(name: &str, head: &[LevelValue], width: usize) -> Label {
    let mut values = head.to_vec();
    values.push(LevelValue::from(name));
    values.resize(head.len() + width, LevelValue::Empty);
    Label::from(values)
}
