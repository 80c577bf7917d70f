//! FILENAME: table-engine/src/label.rs
//! PURPOSE: Hierarchical label tuples and level addressing.
//! CONTEXT: A `Label` identifies one position along an axis. Its length is
//! the axis depth; a single-level axis uses one-element labels. Level names
//! are not stored here, they belong to the owning `LabelAxis`.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::value::LevelValue;

/// Inline capacity covers the usual (segment, metric, period) depth.
pub type LevelValues = SmallVec<[LevelValue; 4]>;

/// An ordered, fixed-length tuple of level values.
/// Equality and hashing are element-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(LevelValues);

impl Label {
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<LevelValue>,
    {
        Label(values.into_iter().map(Into::into).collect())
    }

    /// A one-level label.
    pub fn single(value: impl Into<LevelValue>) -> Self {
        let mut values = LevelValues::new();
        values.push(value.into());
        Label(values)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn values(&self) -> &[LevelValue] {
        &self.0
    }

    pub fn level(&self, level: usize) -> Option<&LevelValue> {
        self.0.get(level)
    }

    /// The last level (the "leaf" inside a group).
    pub fn leaf(&self) -> Option<&LevelValue> {
        self.0.last()
    }

    /// All levels but the last; identifies the group this label belongs to.
    pub fn prefix(&self) -> Label {
        let end = self.0.len().saturating_sub(1);
        Label(self.0[..end].iter().cloned().collect())
    }

    /// Returns a copy with `value` appended as a new innermost level.
    pub fn with_leaf(&self, value: impl Into<LevelValue>) -> Label {
        let mut values = self.0.clone();
        values.push(value.into());
        Label(values)
    }

    /// Returns a copy with the level at `from` moved to index `to`.
    pub(crate) fn with_level_moved(&self, from: usize, to: usize) -> Label {
        let mut values = self.0.clone();
        let value = values.remove(from);
        values.insert(to, value);
        Label(values)
    }

    /// Concatenation of every level's text; the haystack for substring search.
    pub fn joined_text(&self) -> String {
        self.0.iter().map(LevelValue::to_text).collect()
    }

    pub fn contains_value(&self, value: &LevelValue) -> bool {
        self.0.iter().any(|v| v == value)
    }
}

impl Deref for Label {
    type Target = [LevelValue];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() == 1 {
            return write!(f, "{}", self.0[0]);
        }
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str(")")
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::single(value)
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::single(value)
    }
}

impl From<LevelValue> for Label {
    fn from(value: LevelValue) -> Self {
        Label::single(value)
    }
}

impl From<Vec<LevelValue>> for Label {
    fn from(values: Vec<LevelValue>) -> Self {
        Label(values.into_iter().collect())
    }
}

impl<V: Into<LevelValue>, const N: usize> From<[V; N]> for Label {
    fn from(values: [V; N]) -> Self {
        Label::new(values)
    }
}

/// Builds a [`Label`] from heterogeneous level values: `label!["One", "A", 1]`.
#[macro_export]
macro_rules! label {
    ($($value:expr),* $(,)?) => {
        $crate::Label::from(vec![$($crate::LevelValue::from($value)),*])
    };
}

/// Addresses one level of an axis, by position or by level name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelRef {
    Index(usize),
    Name(String),
}

impl fmt::Display for LevelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelRef::Index(i) => write!(f, "{}", i),
            LevelRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

impl From<usize> for LevelRef {
    fn from(index: usize) -> Self {
        LevelRef::Index(index)
    }
}

impl From<&str> for LevelRef {
    fn from(name: &str) -> Self {
        LevelRef::Name(name.to_string())
    }
}

impl From<String> for LevelRef {
    fn from(name: String) -> Self {
        LevelRef::Name(name)
    }
}
