//! FILENAME: table-engine/src/reorder.rs
//! PURPOSE: Axis reordering: explicit value order at one level, and moving a
//! named level to the front.
//! CONTEXT: Both operations permute labels or levels only. Table variants
//! re-project the grid so every value stays at its (row, column) label pair.

use std::cmp::Ordering;

use log::debug;
use rustc_hash::FxHashMap;

use crate::axis::{AxisKind, LabelAxis};
use crate::error::{TableError, TableResult};
use crate::label::{Label, LevelRef};
use crate::table::Table;
use crate::value::LevelValue;

/// Sorts an axis so the values at `level` follow `desired_order`.
///
/// Each label is keyed by its rank in `desired_order` at `level`
/// (`desired_order.len()` when absent) and by its own values elsewhere, then
/// sorted lexicographically. The sort is stable. Returns the new axis and the
/// permutation (`new[i] = old[perm[i]]`).
pub fn sort_axis_by_order<V>(
    axis: &LabelAxis,
    kind: AxisKind,
    desired_order: &[V],
    level: impl Into<LevelRef>,
) -> TableResult<(LabelAxis, Vec<usize>)>
where
    V: Into<LevelValue> + Clone,
{
    let level = axis.resolve_level(&level.into())?;
    let order: Vec<LevelValue> = desired_order.iter().cloned().map(Into::into).collect();

    let present = axis.level_values(&LevelRef::Index(level), true)?;
    if let Some(missing) = order.iter().find(|v| !present.contains(v)) {
        return Err(TableError::NotFound(format!(
            "'{}' not found in level {} of the {}.",
            missing, level, kind
        )));
    }

    let mut rank: FxHashMap<&LevelValue, usize> = FxHashMap::default();
    for (i, value) in order.iter().enumerate() {
        rank.entry(value).or_insert(i);
    }
    let rank_of = |label: &Label| rank.get(&label[level]).copied().unwrap_or(order.len());

    let compare = |a: &Label, b: &Label| -> Ordering {
        for i in 0..a.depth() {
            let ord = if i == level {
                rank_of(a).cmp(&rank_of(b))
            } else {
                a[i].cmp(&b[i])
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    };

    let labels = axis.labels();
    let mut permutation: Vec<usize> = (0..labels.len()).collect();
    permutation.sort_by(|&a, &b| compare(&labels[a], &labels[b]));
    Ok((axis.permuted(&permutation), permutation))
}

/// [`sort_axis_by_order`] applied to one axis of a table.
pub fn sort_by_order<V>(
    table: &Table,
    kind: AxisKind,
    desired_order: &[V],
    level: impl Into<LevelRef>,
) -> TableResult<Table>
where
    V: Into<LevelValue> + Clone,
{
    let (axis, permutation) = sort_axis_by_order(table.axis(kind), kind, desired_order, level)?;
    table.with_axis(kind, axis, &permutation)
}

/// Moves the level named `level_name` to position 0, keeping the relative
/// order of the other levels. Label order is unchanged.
pub fn move_axis_level_to_front(
    axis: &LabelAxis,
    kind: AxisKind,
    level_name: &str,
) -> TableResult<LabelAxis> {
    let from = axis.level_index(level_name).ok_or_else(|| {
        TableError::NotFound(format!(
            "The level '{}' is not found in the {}.",
            level_name, kind
        ))
    })?;
    if from == 0 {
        return Ok(axis.clone());
    }
    debug!("moving level '{}' of the {} from {} to 0", level_name, kind, from);
    Ok(axis.with_level_moved(from, 0))
}

/// [`move_axis_level_to_front`] applied to one axis of a table.
pub fn move_level_to_front(table: &Table, kind: AxisKind, level_name: &str) -> TableResult<Table> {
    let axis = move_axis_level_to_front(table.axis(kind), kind, level_name)?;
    let identity: Vec<usize> = (0..axis.len()).collect();
    table.with_axis(kind, axis, &identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label;
    use crate::value::CellValue;

    fn periods() -> Table {
        let columns = LabelAxis::new(
            vec![Some("duration".into()), Some("annum".into())],
            vec![
                label!["FY", 2023],
                label!["Q1", 2024],
                label!["FY", 2024],
                label!["H1", 2024],
                label!["Q1", 2023],
            ],
        )
        .unwrap();
        let rows = LabelAxis::single(Some("item"), ["revenue"]).unwrap();
        Table::new(rows, columns, vec![vec![1.into(), 2.into(), 3.into(), 4.into(), 5.into()]]).unwrap()
    }

    #[test]
    fn test_sort_by_order() {
        let table = periods();
        let sorted = sort_by_order(&table, AxisKind::Columns, &["Q1", "FY"], "duration").unwrap();
        assert_eq!(
            sorted.columns().labels(),
            &[
                label!["Q1", 2023],
                label!["Q1", 2024],
                label!["FY", 2023],
                label!["FY", 2024],
                label!["H1", 2024],
            ]
        );
        // values travel with their labels
        assert_eq!(
            sorted.get(&Label::from("revenue"), &label!["H1", 2024]),
            Some(&CellValue::Number(4.0))
        );
        assert_eq!(sorted.values()[0][0], CellValue::Number(5.0));
    }

    #[test]
    fn test_sort_is_idempotent() {
        let table = periods();
        let once = sort_by_order(&table, AxisKind::Columns, &["H1"], 0usize).unwrap();
        let twice = sort_by_order(&once, AxisKind::Columns, &["H1"], 0usize).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.columns().label(0), Some(&label!["H1", 2024]));
    }

    #[test]
    fn test_sort_missing_entry() {
        let table = periods();
        let err = sort_by_order(&table, AxisKind::Columns, &["Q3"], "duration").unwrap_err();
        assert_eq!(
            err,
            TableError::NotFound("'Q3' not found in level 0 of the columns.".to_string())
        );
    }

    #[test]
    fn test_sort_rows() {
        let table = periods().transpose();
        let sorted = sort_by_order(&table, AxisKind::Rows, &[2024], "annum").unwrap();
        // duration still leads the key; 2024 sorts first within each duration
        assert_eq!(sorted.rows().label(0), Some(&label!["FY", 2024]));
        assert_eq!(sorted.rows().label(1), Some(&label!["FY", 2023]));
        assert_eq!(sorted.rows().label(4), Some(&label!["Q1", 2023]));
    }

    #[test]
    fn test_move_level_to_front() {
        let table = periods();
        let moved = move_level_to_front(&table, AxisKind::Columns, "annum").unwrap();
        assert_eq!(
            moved.columns().names(),
            &[Some("annum".to_string()), Some("duration".to_string())]
        );
        assert_eq!(moved.columns().label(1), Some(&label![2024, "Q1"]));
        assert_eq!(moved.get(&"revenue".into(), &label![2024, "H1"]), Some(&CellValue::Number(4.0)));
    }

    #[test]
    fn test_move_level_round_trip() {
        let axis = periods().columns().clone();
        let moved = move_axis_level_to_front(&axis, AxisKind::Columns, "annum").unwrap();
        let back = move_axis_level_to_front(&moved, AxisKind::Columns, "duration").unwrap();
        assert_eq!(back, axis);
    }

    #[test]
    fn test_move_unknown_level() {
        let err = move_level_to_front(&periods(), AxisKind::Rows, "segment").unwrap_err();
        assert_eq!(
            err,
            TableError::NotFound("The level 'segment' is not found in the rows.".to_string())
        );
    }
}
