//! FILENAME: table-engine/src/find.rs
//! PURPOSE: Exact, level-scoped and substring search over a label axis.
//! CONTEXT: Works on any `LabelAxis`; rows and columns are searched the
//! same way through `table.axis(AxisKind)`.

use crate::axis::LabelAxis;
use crate::error::{TableError, TableResult};
use crate::label::{Label, LevelRef};
use crate::value::LevelValue;

/// Labels whose value equals `name`.
///
/// With `level`, only that level is compared. Without it, a label matches if
/// `name` equals the value at any of its levels (exact equality, never a
/// substring); on a single-level axis this is plain label equality.
pub fn find_by_name(
    axis: &LabelAxis,
    name: impl Into<LevelValue>,
    level: Option<LevelRef>,
) -> TableResult<Vec<Label>> {
    let positions = find_positions(axis, name, level)?;
    Ok(positions.into_iter().map(|pos| axis.labels()[pos].clone()).collect())
}

/// Axis-order positions of the labels [`find_by_name`] returns.
pub fn find_positions(
    axis: &LabelAxis,
    name: impl Into<LevelValue>,
    level: Option<LevelRef>,
) -> TableResult<Vec<usize>> {
    let name = name.into();
    if name.is_empty() {
        return Err(TableError::InvalidInput(
            "search name must be a scalar value, got an empty value".to_string(),
        ));
    }
    if axis.is_empty() {
        return Err(TableError::InvalidInput(format!(
            "cannot search for '{}' in an empty axis",
            name
        )));
    }

    let level = level.map(|l| axis.resolve_level(&l)).transpose()?;
    let matches = |label: &Label| match level {
        Some(idx) => label[idx] == name,
        None => label.contains_value(&name),
    };

    Ok(axis
        .labels()
        .iter()
        .enumerate()
        .filter(|(_, label)| matches(label))
        .map(|(pos, _)| pos)
        .collect())
}

/// Labels containing any of `needles` as a case-sensitive substring.
///
/// The haystack is the concatenated text of all levels, or the text of the
/// single level given by `level`.
pub fn find_by_substring<S: AsRef<str>>(
    axis: &LabelAxis,
    needles: &[S],
    level: Option<LevelRef>,
) -> TableResult<Vec<Label>> {
    if needles.is_empty() {
        return Err(TableError::InvalidInput(
            "at least one substring is required".to_string(),
        ));
    }
    if axis.is_empty() {
        return Err(TableError::InvalidInput(
            "cannot search an empty axis".to_string(),
        ));
    }

    let level = level.map(|l| axis.resolve_level(&l)).transpose()?;
    let found = axis
        .labels()
        .iter()
        .filter(|label| {
            let haystack = match level {
                Some(idx) => label[idx].to_text(),
                None => label.joined_text(),
            };
            needles.iter().any(|needle| haystack.contains(needle.as_ref()))
        })
        .cloned()
        .collect();
    Ok(found)
}

/// Single-needle form of [`find_by_substring`].
pub fn find_like(axis: &LabelAxis, needle: &str, level: Option<LevelRef>) -> TableResult<Vec<Label>> {
    find_by_substring(axis, &[needle], level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label;

    fn columns() -> LabelAxis {
        LabelAxis::new(
            vec![Some("segment".into()), Some("metric".into()), Some("period".into())],
            vec![
                label!["Retail", "Revenue", 2023],
                label!["Retail", "Cost", 2023],
                label!["Wholesale", "Revenue", 2023],
                label!["Wholesale", "Revenue", 2024],
                label!["Revenue", "Margin", 2024],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_find_by_name_any_level() {
        let axis = columns();
        let found = find_by_name(&axis, "Revenue", None).unwrap();
        assert_eq!(found.len(), 4);
        assert_eq!(found[3], label!["Revenue", "Margin", 2024]);
    }

    #[test]
    fn test_find_by_name_at_level() {
        let axis = columns();
        let found = find_by_name(&axis, "Revenue", Some("metric".into())).unwrap();
        assert_eq!(
            found,
            vec![
                label!["Retail", "Revenue", 2023],
                label!["Wholesale", "Revenue", 2023],
                label!["Wholesale", "Revenue", 2024],
            ]
        );
        let by_year = find_by_name(&axis, 2024, Some(LevelRef::Index(2))).unwrap();
        assert_eq!(by_year.len(), 2);
    }

    #[test]
    fn test_find_by_name_is_not_substring() {
        let axis = columns();
        assert!(find_by_name(&axis, "Rev", None).unwrap().is_empty());
    }

    #[test]
    fn test_find_single_level() {
        let axis = LabelAxis::single(None, ["A", "B", "AB"]).unwrap();
        assert_eq!(find_by_name(&axis, "A", None).unwrap(), vec![Label::from("A")]);
        assert_eq!(find_positions(&axis, "AB", None).unwrap(), vec![2]);
    }

    #[test]
    fn test_find_positions() {
        let axis = columns();
        assert_eq!(find_positions(&axis, "Wholesale", Some(LevelRef::Index(0))).unwrap(), vec![2, 3]);
        assert_eq!(find_positions(&axis, "Cost", None).unwrap(), vec![1]);
    }

    #[test]
    fn test_find_rejects_bad_input() {
        let axis = columns();
        assert!(matches!(
            find_by_name(&axis, LevelValue::Empty, None),
            Err(TableError::InvalidInput(_))
        ));
        assert!(matches!(
            find_by_name(&axis, "Cost", Some("region".into())),
            Err(TableError::NotFound(_))
        ));
        let empty = LabelAxis::new(vec![None], Vec::new()).unwrap();
        assert!(matches!(
            find_by_name(&empty, "Cost", None),
            Err(TableError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_find_by_substring() {
        let axis = columns();
        let found = find_by_substring(&axis, &["sale", "Cost"], None).unwrap();
        assert_eq!(found.len(), 3);

        // "RetailRevenue2023" contains "lRev" across the level boundary
        assert_eq!(find_like(&axis, "lRev", None).unwrap().len(), 1);

        let at_level = find_by_substring(&axis, &["202"], Some("period".into())).unwrap();
        assert_eq!(at_level.len(), 5);
        assert!(find_like(&axis, "revenue", None).unwrap().is_empty());
    }

    #[test]
    fn test_find_by_substring_needs_needles() {
        let axis = columns();
        let none: [&str; 0] = [];
        assert!(matches!(
            find_by_substring(&axis, &none, None),
            Err(TableError::InvalidInput(_))
        ));
    }
}
