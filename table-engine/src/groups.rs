//! FILENAME: table-engine/src/groups.rs
//! PURPOSE: Groups labels of a multi-level axis by prefix and decides which
//! groups are complete for a requested set of leaf values.
//! CONTEXT: A group is every label sharing all levels but the last. The
//! calculated-field inserter uses the exact-group mode to find sources for
//! per-group derived fields.

use rustc_hash::FxHashMap;

use crate::axis::LabelAxis;
use crate::error::{TableError, TableResult};
use crate::label::Label;
use crate::value::LevelValue;

/// Labels sharing one prefix that matched the requested leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelGroup {
    /// All levels but the last.
    pub prefix: Label,
    /// Matched labels. Axis order from [`group_by_prefix`], leaf order from
    /// [`find_exact_groups`].
    pub members: Vec<Label>,
}

impl LabelGroup {
    fn leaves(&self) -> impl Iterator<Item = &LevelValue> {
        self.members.iter().filter_map(Label::leaf)
    }

    /// True if every requested leaf occurs among the members.
    pub fn covers(&self, leaf_names: &[LevelValue]) -> bool {
        leaf_names.iter().all(|name| self.leaves().any(|leaf| leaf == name))
    }
}

/// Validates the axis and de-duplicates `leaf_names`, keeping first occurrences.
fn prepare_leaves<I, V>(axis: &LabelAxis, leaf_names: I) -> TableResult<Vec<LevelValue>>
where
    I: IntoIterator<Item = V>,
    V: Into<LevelValue>,
{
    if !axis.is_multi_level() {
        return Err(TableError::Shape(format!(
            "grouping needs a multi-level axis, this axis has {} level",
            axis.depth()
        )));
    }

    let mut leaves: Vec<LevelValue> = Vec::new();
    for name in leaf_names {
        let name = name.into();
        if !leaves.contains(&name) {
            leaves.push(name);
        }
    }
    if leaves.is_empty() {
        return Err(TableError::InvalidInput(
            "at least one leaf name is required".to_string(),
        ));
    }
    Ok(leaves)
}

/// Groups the labels whose last level is one of `leaf_names` by prefix.
/// Groups appear in order of first appearance; members keep axis order.
pub fn group_by_prefix<I, V>(axis: &LabelAxis, leaf_names: I) -> TableResult<Vec<LabelGroup>>
where
    I: IntoIterator<Item = V>,
    V: Into<LevelValue>,
{
    let leaves = prepare_leaves(axis, leaf_names)?;
    Ok(collect_groups(axis, &leaves))
}

fn collect_groups(axis: &LabelAxis, leaves: &[LevelValue]) -> Vec<LabelGroup> {
    let mut groups: Vec<LabelGroup> = Vec::new();
    let mut index: FxHashMap<Label, usize> = FxHashMap::default();

    for label in axis.labels() {
        let matched = label.leaf().is_some_and(|leaf| leaves.contains(leaf));
        if !matched {
            continue;
        }
        let prefix = label.prefix();
        let slot = *index.entry(prefix.clone()).or_insert_with(|| {
            groups.push(LabelGroup {
                prefix,
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].members.push(label.clone());
    }
    groups
}

/// Labels of every group whose leaves are a superset of `leaf_names`,
/// in original axis order.
pub fn find_common_groups<I, V>(axis: &LabelAxis, leaf_names: I) -> TableResult<Vec<Label>>
where
    I: IntoIterator<Item = V>,
    V: Into<LevelValue>,
{
    let leaves = prepare_leaves(axis, leaf_names)?;
    let complete: FxHashMap<Label, ()> = collect_groups(axis, &leaves)
        .into_iter()
        .filter(|group| group.covers(&leaves))
        .map(|group| (group.prefix, ()))
        .collect();

    Ok(axis
        .labels()
        .iter()
        .filter(|label| {
            label.leaf().is_some_and(|leaf| leaves.contains(leaf))
                && complete.contains_key(&label.prefix())
        })
        .cloned()
        .collect())
}

/// Groups holding each requested leaf exactly once, members ordered like
/// `leaf_names`. Groups missing any leaf are left out.
pub fn find_exact_groups<I, V>(axis: &LabelAxis, leaf_names: I) -> TableResult<Vec<LabelGroup>>
where
    I: IntoIterator<Item = V>,
    V: Into<LevelValue>,
{
    let leaves = prepare_leaves(axis, leaf_names)?;
    let groups = collect_groups(axis, &leaves)
        .into_iter()
        .filter(|group| group.members.len() == leaves.len() && group.covers(&leaves))
        .map(|group| {
            let members = leaves
                .iter()
                .filter_map(|leaf| {
                    group
                        .members
                        .iter()
                        .find(|label| label.leaf() == Some(leaf))
                        .cloned()
                })
                .collect();
            LabelGroup {
                prefix: group.prefix,
                members,
            }
        })
        .collect();
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label;

    fn axis(labels: Vec<Label>) -> LabelAxis {
        let depth = labels[0].depth();
        LabelAxis::new(vec![None; depth], labels).unwrap()
    }

    fn ab_xy() -> LabelAxis {
        axis(vec![
            Label::from(["A", "x"]),
            Label::from(["A", "y"]),
            Label::from(["B", "x"]),
            Label::from(["B", "y"]),
        ])
    }

    #[test]
    fn test_all_groups_complete() {
        let found = find_common_groups(&ab_xy(), ["x", "y"]).unwrap();
        assert_eq!(found, ab_xy().labels().to_vec());
    }

    #[test]
    fn test_missing_leaf_yields_nothing() {
        let found = find_common_groups(&ab_xy(), ["x", "z"]).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_partial_groups_are_dropped() {
        let axis = axis(vec![
            label!["A", "x"],
            label!["B", "x"],
            label!["A", "y"],
            label!["C", "total"],
        ]);
        let found = find_common_groups(&axis, ["x", "y"]).unwrap();
        assert_eq!(found, vec![label!["A", "x"], label!["A", "y"]]);
    }

    #[test]
    fn test_deeper_prefixes() {
        let axis = axis(vec![
            label!["East", "Retail", "actual"],
            label!["East", "Retail", "budget"],
            label!["East", "Online", "actual"],
            label!["West", "Retail", "budget"],
            label!["West", "Retail", "actual"],
        ]);
        let found = find_common_groups(&axis, ["actual", "budget"]).unwrap();
        assert_eq!(found.len(), 4);
        assert!(!found.contains(&label!["East", "Online", "actual"]));
    }

    #[test]
    fn test_completeness_is_monotone() {
        let axis = axis(vec![
            label!["A", "x"],
            label!["A", "y"],
            label!["A", "z"],
            label!["B", "x"],
            label!["B", "y"],
            label!["C", "x"],
        ]);
        let prefixes = |names: &[&str]| -> Vec<Label> {
            group_by_prefix(&axis, names.iter().copied())
                .unwrap()
                .into_iter()
                .filter(|g| g.covers(&names.iter().map(|n| LevelValue::from(*n)).collect::<Vec<_>>()))
                .map(|g| g.prefix)
                .collect()
        };
        let large = prefixes(&["x", "y", "z"]);
        let small = prefixes(&["x", "y"]);
        let smallest = prefixes(&["x"]);
        assert!(large.iter().all(|p| small.contains(p)));
        assert!(small.iter().all(|p| smallest.contains(p)));
        assert_eq!(smallest.len(), 3);
    }

    #[test]
    fn test_exact_groups_follow_leaf_order() {
        let groups = find_exact_groups(&ab_xy(), ["y", "x"]).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].prefix, Label::from("A"));
        assert_eq!(groups[0].members, vec![Label::from(["A", "y"]), Label::from(["A", "x"])]);
    }

    #[test]
    fn test_single_level_axis_is_rejected() {
        let flat = LabelAxis::single(None, ["x", "y"]).unwrap();
        assert!(matches!(
            find_common_groups(&flat, ["x"]),
            Err(TableError::Shape(_))
        ));
        let none: [&str; 0] = [];
        assert!(matches!(
            find_common_groups(&ab_xy(), none),
            Err(TableError::InvalidInput(_))
        ));
    }
}
