//! FILENAME: table-engine/src/axis.rs
//! PURPOSE: The ordered, uniquely-labelled row or column dimension of a table.
//! CONTEXT: A `LabelAxis` owns its label tuples and one optional name per
//! level. Positions are backed by an index map so matching and group
//! lookups never rescan the axis.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{TableError, TableResult};
use crate::label::{Label, LevelRef};
use crate::value::LevelValue;

/// Which dimension of a table an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisKind {
    Rows,
    Columns,
}

impl AxisKind {
    /// The perpendicular axis.
    pub fn other(self) -> AxisKind {
        match self {
            AxisKind::Rows => AxisKind::Columns,
            AxisKind::Columns => AxisKind::Rows,
        }
    }

    /// Singular noun used for generated labels ("new_column_4").
    pub fn noun(self) -> &'static str {
        match self {
            AxisKind::Rows => "row",
            AxisKind::Columns => "column",
        }
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisKind::Rows => f.write_str("rows"),
            AxisKind::Columns => f.write_str("columns"),
        }
    }
}

/// Serialized form of an axis. Deserialization goes through
/// [`LabelAxis::new`] so duplicates and ragged labels are rejected.
#[derive(Serialize, Deserialize)]
struct RawAxis {
    names: Vec<Option<String>>,
    labels: Vec<Label>,
}

/// Ordered sequence of unique label tuples plus per-level names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawAxis", into = "RawAxis")]
pub struct LabelAxis {
    names: Vec<Option<String>>,
    labels: Vec<Label>,
    positions: FxHashMap<Label, usize>,
}

impl PartialEq for LabelAxis {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names && self.labels == other.labels
    }
}

impl TryFrom<RawAxis> for LabelAxis {
    type Error = TableError;

    fn try_from(raw: RawAxis) -> TableResult<Self> {
        LabelAxis::new(raw.names, raw.labels)
    }
}

impl From<LabelAxis> for RawAxis {
    fn from(axis: LabelAxis) -> Self {
        RawAxis {
            names: axis.names,
            labels: axis.labels,
        }
    }
}

impl LabelAxis {
    /// Creates an axis; every label must have one value per level name.
    pub fn new(names: Vec<Option<String>>, labels: Vec<Label>) -> TableResult<Self> {
        if names.is_empty() {
            return Err(TableError::Shape(
                "an axis needs at least one level".to_string(),
            ));
        }

        let mut positions = FxHashMap::default();
        positions.reserve(labels.len());
        for (pos, label) in labels.iter().enumerate() {
            if label.depth() != names.len() {
                return Err(TableError::Shape(format!(
                    "label {} has {} levels, axis has {}",
                    label,
                    label.depth(),
                    names.len()
                )));
            }
            if positions.insert(label.clone(), pos).is_some() {
                return Err(TableError::InvalidInput(format!(
                    "duplicate label {} in axis",
                    label
                )));
            }
        }

        Ok(LabelAxis {
            names,
            labels,
            positions,
        })
    }

    /// A single-level axis from plain values.
    pub fn single<I, V>(name: Option<&str>, values: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<LevelValue>,
    {
        let labels = values.into_iter().map(Label::single).collect();
        LabelAxis::new(vec![name.map(str::to_string)], labels)
    }

    /// The default record index: unnamed single level `0..len`.
    pub fn range(len: usize) -> Self {
        let labels: Vec<Label> = (0..len).map(Label::single).collect();
        let positions = labels
            .iter()
            .enumerate()
            .map(|(pos, label)| (label.clone(), pos))
            .collect();
        LabelAxis {
            names: vec![None],
            labels,
            positions,
        }
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn is_multi_level(&self) -> bool {
        self.names.len() > 1
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    pub fn label(&self, pos: usize) -> Option<&Label> {
        self.labels.get(pos)
    }

    /// O(1) position lookup.
    pub fn position(&self, label: &Label) -> Option<usize> {
        self.positions.get(label).copied()
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.positions.contains_key(label)
    }

    /// Resolves a level reference to a level index.
    pub fn resolve_level(&self, level: &LevelRef) -> TableResult<usize> {
        match level {
            LevelRef::Index(i) if *i < self.depth() => Ok(*i),
            LevelRef::Index(i) => Err(TableError::NotFound(format!(
                "level {} does not exist, axis has {} level(s)",
                i,
                self.depth()
            ))),
            LevelRef::Name(name) => self.level_index(name).ok_or_else(|| {
                TableError::NotFound(format!("level '{}' does not exist in the axis", name))
            }),
        }
    }

    /// Index of the level carrying `name`.
    pub fn level_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_deref() == Some(name))
    }

    /// The values at one level, in axis order; `unique` keeps first occurrences only.
    pub fn level_values(&self, level: &LevelRef, unique: bool) -> TableResult<Vec<LevelValue>> {
        let idx = self.resolve_level(level)?;
        let values = self.labels.iter().map(|label| label[idx].clone());
        if !unique {
            return Ok(values.collect());
        }
        let mut seen = rustc_hash::FxHashSet::default();
        Ok(values.filter(|v| seen.insert(v.clone())).collect())
    }

    /// Inserts `label` at `pos`, shifting later labels.
    pub fn insert(&mut self, pos: usize, label: Label) -> TableResult<()> {
        if label.depth() != self.depth() {
            return Err(TableError::Shape(format!(
                "label {} has {} levels, axis has {}",
                label,
                label.depth(),
                self.depth()
            )));
        }
        if self.contains(&label) {
            return Err(TableError::InvalidInput(format!(
                "label {} already exists in the axis",
                label
            )));
        }
        if pos > self.labels.len() {
            return Err(TableError::Shape(format!(
                "insert position {} is past the end of an axis of length {}",
                pos,
                self.labels.len()
            )));
        }

        self.labels.insert(pos, label);
        for (i, label) in self.labels.iter().enumerate().skip(pos) {
            self.positions.insert(label.clone(), i);
        }
        Ok(())
    }

    /// A new axis whose i-th label is `self.labels[order[i]]`.
    /// `order` must be a permutation of `0..len`.
    pub(crate) fn permuted(&self, order: &[usize]) -> LabelAxis {
        let labels: Vec<Label> = order.iter().map(|&i| self.labels[i].clone()).collect();
        let positions = labels
            .iter()
            .enumerate()
            .map(|(pos, label)| (label.clone(), pos))
            .collect();
        LabelAxis {
            names: self.names.clone(),
            labels,
            positions,
        }
    }

    /// Moves one level (name and every label's value) from `from` to `to`.
    /// Label order is untouched.
    pub(crate) fn with_level_moved(&self, from: usize, to: usize) -> LabelAxis {
        let mut names = self.names.clone();
        let name = names.remove(from);
        names.insert(to, name);

        let labels: Vec<Label> = self
            .labels
            .iter()
            .map(|label| label.with_level_moved(from, to))
            .collect();
        let positions = labels
            .iter()
            .enumerate()
            .map(|(pos, label)| (label.clone(), pos))
            .collect();
        LabelAxis {
            names,
            labels,
            positions,
        }
    }

    /// Default generated label text for a new entry of `kind`, e.g. `new_column_4`.
    pub fn placeholder_label(&self, kind: AxisKind) -> Label {
        let existing: Vec<String> = self
            .labels
            .iter()
            .filter_map(|label| label[0].as_text().map(str::to_string))
            .collect();
        let name = unique_name(&format!("new_{}_{}", kind.noun(), self.len()), &existing);

        let mut label = Label::single(name);
        for _ in 1..self.depth() {
            label = label.with_leaf(LevelValue::Empty);
        }
        label
    }
}

/// Returns `candidate` if unused, otherwise the first free `candidate_N`.
pub fn unique_name<S: AsRef<str>>(candidate: &str, existing: &[S]) -> String {
    let taken = |name: &str| existing.iter().any(|e| e.as_ref() == name);
    if !taken(candidate) {
        return candidate.to_string();
    }

    let mut counter = 1;
    loop {
        let name = format!("{}_{}", candidate, counter);
        if !taken(&name) {
            return name;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label;

    fn two_level() -> LabelAxis {
        LabelAxis::new(
            vec![Some("segment".to_string()), Some("metric".to_string())],
            vec![
                Label::from(["A", "x"]),
                Label::from(["A", "y"]),
                Label::from(["B", "x"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_duplicates() {
        let result = LabelAxis::single(Some("k"), ["a", "b", "a"]);
        assert!(matches!(result, Err(TableError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_ragged_labels() {
        let result = LabelAxis::new(
            vec![None, None],
            vec![Label::from(["a", "b"]), Label::from("c")],
        );
        assert!(matches!(result, Err(TableError::Shape(_))));
    }

    #[test]
    fn test_positions_follow_insert() {
        let mut axis = two_level();
        axis.insert(1, Label::from(["A", "z"])).unwrap();
        assert_eq!(axis.position(&Label::from(["A", "z"])), Some(1));
        assert_eq!(axis.position(&Label::from(["A", "y"])), Some(2));
        assert_eq!(axis.position(&Label::from(["B", "x"])), Some(3));
        assert!(axis.insert(0, Label::from(["A", "z"])).is_err());
    }

    #[test]
    fn test_resolve_level_by_name_and_index() {
        let axis = two_level();
        assert_eq!(axis.resolve_level(&"metric".into()).unwrap(), 1);
        assert_eq!(axis.resolve_level(&LevelRef::Index(0)).unwrap(), 0);
        assert!(matches!(
            axis.resolve_level(&"period".into()),
            Err(TableError::NotFound(_))
        ));
        assert!(axis.resolve_level(&LevelRef::Index(2)).is_err());
    }

    #[test]
    fn test_level_values() {
        let axis = two_level();
        let unique = axis.level_values(&LevelRef::Index(0), true).unwrap();
        assert_eq!(unique, vec![LevelValue::from("A"), LevelValue::from("B")]);
        assert_eq!(axis.level_values(&"metric".into(), false).unwrap().len(), 3);
    }

    #[test]
    fn test_placeholder_is_padded_and_unique() {
        let axis = LabelAxis::new(
            vec![None, None],
            vec![label!["new_column_1", ""], label!["b", "c"]],
        )
        .unwrap();
        let placeholder = axis.placeholder_label(AxisKind::Columns);
        assert_eq!(placeholder, label!["new_column_2", LevelValue::Empty]);
    }

    #[test]
    fn test_unique_name() {
        assert_eq!(unique_name("sales", &["cost"]), "sales");
        assert_eq!(unique_name("sales", &["sales", "sales_1"]), "sales_2");
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"names":[null],"labels":[[{"Text":"a"}],[{"Text":"a"}]]}"#;
        let result: Result<LabelAxis, _> = serde_json::from_str(json);
        assert!(result.is_err());

        let json = r#"{"names":["k"],"labels":[[{"Text":"a"}],[{"Text":"b"}]]}"#;
        let axis: LabelAxis = serde_json::from_str(json).unwrap();
        assert_eq!(axis.position(&Label::from("b")), Some(1));
    }
}
