//! FILENAME: table-engine/src/value.rs
//! PURPOSE: Scalar types stored in a table grid and used as label levels.
//! CONTEXT: `CellValue` is what a grid cell holds. `LevelValue` is the
//! hashable, totally ordered counterpart used inside label tuples, so that
//! labels can key hash maps and be sorted lexicographically.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Represents the value held by one cell of a table grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
}

impl CellValue {
    /// Returns the numeric content, `None` for every other kind.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Short kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "text",
            CellValue::Boolean(_) => "boolean",
            CellValue::Date(_) => "date",
        }
    }

    /// Returns the display value of the cell as a String.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_value())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<&LevelValue> for CellValue {
    fn from(value: &LevelValue) -> Self {
        match value {
            LevelValue::Empty => CellValue::Empty,
            LevelValue::Number(n) => CellValue::Number(n.get()),
            LevelValue::Text(s) => CellValue::Text(s.clone()),
            LevelValue::Boolean(b) => CellValue::Boolean(*b),
            LevelValue::Date(d) => CellValue::Date(*d),
        }
    }
}

/// An f64 usable as a label key. `-0.0` is stored as `0.0` and every NaN
/// as one canonical NaN, so bit equality, hashing and `total_cmp` agree.
/// NaN sorts after every number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct OrderedFloat(f64);

impl OrderedFloat {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            OrderedFloat(f64::NAN)
        } else if value == 0.0 {
            OrderedFloat(0.0)
        } else {
            OrderedFloat(value)
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for OrderedFloat {
    fn from(value: f64) -> Self {
        OrderedFloat::new(value)
    }
}

impl From<OrderedFloat> for f64 {
    fn from(value: OrderedFloat) -> Self {
        value.0
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// One position of a label tuple: a hashable, ordered scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelValue {
    Empty,
    Number(OrderedFloat),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
}

impl LevelValue {
    /// Text form used by substring matching and generated names.
    pub fn to_text(&self) -> String {
        match self {
            LevelValue::Empty => String::new(),
            LevelValue::Number(n) => format_number(n.get()),
            LevelValue::Text(s) => s.clone(),
            LevelValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            LevelValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LevelValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            LevelValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            LevelValue::Empty => 0,
            LevelValue::Number(_) => 1,
            LevelValue::Text(_) => 2,
            LevelValue::Boolean(_) => 3,
            LevelValue::Date(_) => 4,
        }
    }
}

impl PartialOrd for LevelValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LevelValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (LevelValue::Number(a), LevelValue::Number(b)) => a.cmp(b),
            (LevelValue::Text(a), LevelValue::Text(b)) => a.cmp(b),
            (LevelValue::Boolean(a), LevelValue::Boolean(b)) => a.cmp(b),
            (LevelValue::Date(a), LevelValue::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for LevelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&CellValue> for LevelValue {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => LevelValue::Empty,
            CellValue::Number(n) => LevelValue::Number(OrderedFloat::new(*n)),
            CellValue::Text(s) => LevelValue::Text(s.clone()),
            CellValue::Boolean(b) => LevelValue::Boolean(*b),
            CellValue::Date(d) => LevelValue::Date(*d),
        }
    }
}

impl From<f64> for LevelValue {
    fn from(value: f64) -> Self {
        LevelValue::Number(OrderedFloat::new(value))
    }
}

impl From<i32> for LevelValue {
    fn from(value: i32) -> Self {
        LevelValue::Number(OrderedFloat::new(value as f64))
    }
}

impl From<i64> for LevelValue {
    fn from(value: i64) -> Self {
        LevelValue::Number(OrderedFloat::new(value as f64))
    }
}

impl From<usize> for LevelValue {
    fn from(value: usize) -> Self {
        LevelValue::Number(OrderedFloat::new(value as f64))
    }
}

impl From<&str> for LevelValue {
    fn from(value: &str) -> Self {
        LevelValue::Text(value.to_string())
    }
}

impl From<String> for LevelValue {
    fn from(value: String) -> Self {
        LevelValue::Text(value)
    }
}

impl From<&String> for LevelValue {
    fn from(value: &String) -> Self {
        LevelValue::Text(value.clone())
    }
}

impl From<bool> for LevelValue {
    fn from(value: bool) -> Self {
        LevelValue::Boolean(value)
    }
}

impl From<NaiveDate> for LevelValue {
    fn from(value: NaiveDate) -> Self {
        LevelValue::Date(value)
    }
}

impl From<&LevelValue> for LevelValue {
    fn from(value: &LevelValue) -> Self {
        value.clone()
    }
}

/// Formats without unnecessary decimal places: 2020.0 -> "2020".
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}
