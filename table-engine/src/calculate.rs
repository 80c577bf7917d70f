//! FILENAME: table-engine/src/calculate.rs
//! PURPOSE: Inserts calculated fields (columns or rows) next to their sources.
//! CONTEXT: A calculated field is a function of one or more existing vectors
//! along an axis. It is placed directly after its rightmost source, either
//! once for explicit sources or once per complete label group.

use log::{debug, trace};

use crate::axis::AxisKind;
use crate::error::{TableError, TableResult};
use crate::groups::find_exact_groups;
use crate::label::Label;
use crate::table::Table;
use crate::value::{CellValue, LevelValue};

/// Leaf value given to per-group fields when no suffix is supplied.
pub const DEFAULT_SUFFIX: &str = "calculated";

fn ensure_not_empty(table: &Table) -> TableResult<()> {
    let (rows, columns) = table.shape();
    if rows == 0 || columns == 0 {
        return Err(TableError::Shape(format!(
            "cannot add a field to a table with {} rows and {} columns",
            rows, columns
        )));
    }
    Ok(())
}

/// A computed vector that has not been inserted yet.
struct PendingField {
    position: usize,
    label: Label,
    values: Vec<CellValue>,
}

/// Looks up the sources, evaluates `func` and validates the result without
/// touching the table.
fn prepare_field<F>(
    table: &Table,
    kind: AxisKind,
    func: &F,
    sources: &[Label],
    new_label: Option<Label>,
) -> TableResult<PendingField>
where
    F: Fn(&[Vec<CellValue>]) -> TableResult<Vec<CellValue>>,
{
    if sources.is_empty() {
        return Err(TableError::InvalidInput(format!(
            "a calculated {} needs at least one source",
            kind.noun()
        )));
    }

    let axis = table.axis(kind);
    let mut vectors = Vec::with_capacity(sources.len());
    let mut rightmost = 0;
    for source in sources {
        let pos = axis.position(source).ok_or_else(|| {
            TableError::NotFound(format!(
                "{} '{}' does not exist in the table",
                kind.noun(),
                source
            ))
        })?;
        rightmost = rightmost.max(pos);
        vectors.push(table.vector(kind, pos)?);
    }

    let values = func(&vectors)?;
    let expected = table.axis(kind.other()).len();
    if values.len() != expected {
        return Err(TableError::Shape(format!(
            "calculated {} has {} values, the table has {} {}",
            kind.noun(),
            values.len(),
            expected,
            kind.other()
        )));
    }

    let label = match new_label {
        Some(label) => {
            if label.depth() != axis.depth() {
                return Err(TableError::Shape(format!(
                    "new label {} has {} levels, the {} have {}",
                    label,
                    label.depth(),
                    kind,
                    axis.depth()
                )));
            }
            if axis.contains(&label) {
                return Err(TableError::InvalidInput(format!(
                    "{} '{}' already exists in the table",
                    kind.noun(),
                    label
                )));
            }
            label
        }
        None => axis.placeholder_label(kind),
    };

    Ok(PendingField {
        position: rightmost + 1,
        label,
        values,
    })
}

/// Adds one calculated vector along `kind`, computed by `func` from the
/// vectors of `sources` (in the order given).
///
/// The new vector lands at `1 + max(position(sources))`. Without `new_label`
/// a placeholder such as `new_column_4` is generated. Nothing is modified
/// unless every check passes. Returns the insertion position.
pub fn add_field<F>(
    table: &mut Table,
    kind: AxisKind,
    func: F,
    sources: &[Label],
    new_label: Option<Label>,
) -> TableResult<usize>
where
    F: Fn(&[Vec<CellValue>]) -> TableResult<Vec<CellValue>>,
{
    ensure_not_empty(table)?;
    let field = prepare_field(table, kind, &func, sources, new_label)?;
    let position = field.position;
    debug!(
        "inserting calculated {} {} at position {}",
        kind.noun(),
        field.label,
        position
    );
    table.insert_vector(kind, position, field.label, field.values)?;
    Ok(position)
}

/// Adds one calculated vector per label group along `kind`.
///
/// Groups are found with [`find_exact_groups`]: a group takes part only if it
/// holds every one of `leaf_names` exactly once. Each new label is the group
/// prefix followed by `new_suffix` and is placed after the group's rightmost
/// source. Incomplete groups are skipped. All fields are computed and
/// validated before the first insertion. Returns the new labels.
pub fn add_fields_by_group<F, I, V>(
    table: &mut Table,
    kind: AxisKind,
    func: F,
    leaf_names: I,
    new_suffix: impl Into<LevelValue>,
) -> TableResult<Vec<Label>>
where
    F: Fn(&[Vec<CellValue>]) -> TableResult<Vec<CellValue>>,
    I: IntoIterator<Item = V>,
    V: Into<LevelValue>,
{
    ensure_not_empty(table)?;
    let axis = table.axis(kind);
    if !axis.is_multi_level() {
        return Err(TableError::Shape(format!(
            "per-group fields need multi-level {}, found {} level",
            kind,
            axis.depth()
        )));
    }

    let suffix = new_suffix.into();
    let groups = find_exact_groups(axis, leaf_names)?;
    if groups.is_empty() {
        debug!("no complete groups in the {}; nothing inserted", kind);
        return Ok(Vec::new());
    }

    let mut pending: Vec<(PendingField, Vec<Label>)> = Vec::with_capacity(groups.len());
    for group in groups {
        let label = group.prefix.with_leaf(suffix.clone());
        if pending.iter().any(|(field, _)| field.label == label) {
            return Err(TableError::InvalidInput(format!(
                "{} '{}' would be inserted twice",
                kind.noun(),
                label
            )));
        }
        trace!("group {} -> {}", group.prefix, label);
        let field = prepare_field(table, kind, &func, &group.members, Some(label))?;
        pending.push((field, group.members));
    }

    let mut inserted = Vec::with_capacity(pending.len());
    for (field, sources) in pending {
        // Earlier insertions shift positions; resolve against the current axis.
        let axis = table.axis(kind);
        let position = sources
            .iter()
            .filter_map(|source| axis.position(source))
            .max()
            .map_or(field.position, |pos| pos + 1);
        inserted.push(field.label.clone());
        table.insert_vector(kind, position, field.label, field.values)?;
    }

    debug!("inserted {} calculated {}", inserted.len(), kind);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{growth, sum};
    use crate::label;

    fn abcd() -> Table {
        Table::from_columns([
            ("A", vec![1.into(), 2.into(), 3.into()]),
            ("B", vec![4.into(), 5.into(), 6.into()]),
            ("C", vec![7.into(), 8.into(), 9.into()]),
            ("D", vec![10.into(), 11.into(), 12.into()]),
        ])
        .unwrap()
    }

    fn column_names(table: &Table) -> Vec<String> {
        table.columns().labels().iter().map(|l| l.to_string()).collect()
    }

    fn segmented() -> Table {
        let columns = crate::LabelAxis::new(
            vec![Some("segment".into()), Some("metric".into())],
            vec![
                label!["Retail", "revenue"],
                label!["Retail", "cost"],
                label!["Online", "revenue"],
                label!["Online", "cost"],
                label!["Other", "revenue"],
            ],
        )
        .unwrap();
        let rows = crate::LabelAxis::single(Some("year"), [2023, 2024]).unwrap();
        let values = vec![
            vec![10.into(), 4.into(), 20.into(), 5.into(), 1.into()],
            vec![12.into(), 6.into(), 25.into(), 5.into(), 2.into()],
        ];
        Table::new(rows, columns, values).unwrap()
    }

    #[test]
    fn test_add_field_after_rightmost_source() {
        let mut table = abcd();
        let pos = add_field(
            &mut table,
            AxisKind::Columns,
            sum,
            &["A".into(), "C".into()],
            Some("E".into()),
        )
        .unwrap();
        assert_eq!(pos, 3);
        assert_eq!(column_names(&table), vec!["A", "B", "C", "E", "D"]);
        assert_eq!(
            table.vector_by_label(AxisKind::Columns, &"E".into()).unwrap(),
            vec![8.into(), 10.into(), 12.into()]
        );
    }

    #[test]
    fn test_position_ignores_source_order() {
        let mut table = abcd();
        let pos = add_field(&mut table, AxisKind::Columns, sum, &["D".into(), "B".into()], None).unwrap();
        assert_eq!(pos, 4);
        assert_eq!(table.columns().label(4), Some(&Label::from("new_column_4")));
    }

    #[test]
    fn test_add_row() {
        let mut table = abcd();
        add_field(
            &mut table,
            AxisKind::Rows,
            sum,
            &[Label::single(0), Label::single(1)],
            Some(Label::single("total")),
        )
        .unwrap();
        assert_eq!(table.shape(), (4, 4));
        assert_eq!(table.rows().position(&Label::single("total")), Some(2));
        assert_eq!(
            table.vector(AxisKind::Rows, 2).unwrap(),
            vec![3.into(), 9.into(), 15.into(), 21.into()]
        );
    }

    #[test]
    fn test_rows_match_transposed_columns() {
        let mut by_rows = abcd();
        add_field(&mut by_rows, AxisKind::Rows, sum, &[Label::single(2)], Some(Label::single("x"))).unwrap();

        let mut transposed = abcd().transpose();
        add_field(&mut transposed, AxisKind::Columns, sum, &[Label::single(2)], Some(Label::single("x"))).unwrap();
        assert_eq!(transposed.transpose(), by_rows);
    }

    #[test]
    fn test_failures_leave_table_untouched() {
        let mut table = abcd();
        let before = table.clone();

        let missing = add_field(&mut table, AxisKind::Columns, sum, &["A".into(), "Z".into()], None);
        assert!(matches!(missing, Err(TableError::NotFound(_))));

        let duplicate = add_field(&mut table, AxisKind::Columns, sum, &["A".into()], Some("B".into()));
        assert!(matches!(duplicate, Err(TableError::InvalidInput(_))));

        let wrong_len = add_field(&mut table, AxisKind::Columns, |_: &[Vec<CellValue>]| Ok(vec![]), &["A".into()], None);
        assert!(matches!(wrong_len, Err(TableError::Shape(_))));

        let no_sources = add_field(&mut table, AxisKind::Columns, sum, &[], None);
        assert!(matches!(no_sources, Err(TableError::InvalidInput(_))));

        assert_eq!(table, before);
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let mut table = Table::from_columns([("A", Vec::<CellValue>::new())]).unwrap();
        let result = add_field(&mut table, AxisKind::Columns, sum, &["A".into()], None);
        assert!(matches!(result, Err(TableError::Shape(_))));
    }

    #[test]
    fn test_fields_by_group() {
        let mut table = segmented();
        let added = add_fields_by_group(
            &mut table,
            AxisKind::Columns,
            growth,
            ["revenue", "cost"],
            "ratio",
        )
        .unwrap();

        assert_eq!(added, vec![label!["Retail", "ratio"], label!["Online", "ratio"]]);
        assert_eq!(table.columns().position(&label!["Retail", "ratio"]), Some(2));
        assert_eq!(table.columns().position(&label!["Online", "ratio"]), Some(5));
        assert_eq!(table.columns().position(&label!["Other", "revenue"]), Some(6));
        assert_eq!(
            table.get(&Label::single(2023), &label!["Online", "ratio"]),
            Some(&CellValue::Number(4.0))
        );
    }

    #[test]
    fn test_fields_by_group_needs_multi_level() {
        let mut table = abcd();
        let result = add_fields_by_group(&mut table, AxisKind::Columns, sum, ["A"], DEFAULT_SUFFIX);
        assert!(matches!(result, Err(TableError::Shape(_))));
    }

    #[test]
    fn test_fields_by_group_skips_when_nothing_matches() {
        let mut table = segmented();
        let added = add_fields_by_group(&mut table, AxisKind::Columns, sum, ["margin"], DEFAULT_SUFFIX).unwrap();
        assert!(added.is_empty());
        assert_eq!(table, segmented());
    }

    #[test]
    fn test_fields_by_group_is_all_or_nothing() {
        let mut table = segmented();
        // every group already holds a "cost" label
        let result = add_fields_by_group(&mut table, AxisKind::Columns, sum, ["revenue"], "cost");
        assert!(matches!(result, Err(TableError::InvalidInput(_))));
        assert_eq!(table, segmented());
    }
}
