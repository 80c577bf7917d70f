//! FILENAME: pivot-engine/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains the types needed to DESCRIBE a pivot:
//! which fields feed values, which become column levels, how values are
//! aggregated and whether totals are appended. Every field not named here
//! becomes a row level. Definitions are plain data and round-trip through
//! serde so callers can keep them in configuration files.

use serde::{Deserialize, Serialize};

/// Index into the source record fields (0-based).
pub type FieldIndex = usize;

/// Label of the synthetic total row and columns unless configured otherwise.
pub const DEFAULT_MARGINS_NAME: &str = "Total";

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for value fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationType {
    Sum,
    Count,
    Average,
    Min,
    Max,
    CountNumbers,
    StdDev,
    StdDevP,
    Var,
    VarP,
    Product,
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Sum
    }
}

impl AggregationType {
    /// Count aggregations take any non-empty value; the rest need numbers.
    pub fn accepts_non_numbers(self) -> bool {
        matches!(self, AggregationType::Count | AggregationType::CountNumbers)
    }

    pub fn name(self) -> &'static str {
        match self {
            AggregationType::Sum => "sum",
            AggregationType::Count => "count",
            AggregationType::Average => "average",
            AggregationType::Min => "min",
            AggregationType::Max => "max",
            AggregationType::CountNumbers => "count numbers",
            AggregationType::StdDev => "stddev",
            AggregationType::StdDevP => "stddevp",
            AggregationType::Var => "var",
            AggregationType::VarP => "varp",
            AggregationType::Product => "product",
        }
    }
}

// ============================================================================
// PIVOT DEFINITION
// ============================================================================

fn default_margins_name() -> String {
    DEFAULT_MARGINS_NAME.to_string()
}

fn default_true() -> bool {
    true
}

/// The complete pivot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotDefinition {
    /// Fields whose values are aggregated, in output order.
    pub value_fields: Vec<String>,

    /// Fields whose values become column levels (outer to inner).
    pub column_fields: Vec<String>,

    /// Optional constant outermost column level; also the level's name.
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub aggregation: AggregationType,

    /// Append a total row and, when column fields exist, a total column
    /// per value field.
    #[serde(default)]
    pub margins: bool,

    #[serde(default = "default_margins_name")]
    pub margins_name: String,

    /// Whether the column axis carries a level naming the value field.
    /// Only a single value field may omit it.
    #[serde(default = "default_true")]
    pub include_value_level: bool,
}

impl PivotDefinition {
    pub fn new<V, C, S, T>(value_fields: V, column_fields: C) -> Self
    where
        V: IntoIterator<Item = S>,
        C: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        PivotDefinition {
            value_fields: value_fields.into_iter().map(Into::into).collect(),
            column_fields: column_fields.into_iter().map(Into::into).collect(),
            title: None,
            aggregation: AggregationType::Sum,
            margins: false,
            margins_name: default_margins_name(),
            include_value_level: true,
        }
    }

    /// Financial statement layout: `amount` by (`duration`, `annum`).
    pub fn standard(title: Option<&str>) -> Self {
        Self::preset(["duration", "annum"], title)
    }

    /// Time series layout: `amount` by (`duration`, `period_ending`).
    pub fn series(title: Option<&str>) -> Self {
        Self::preset(["duration", "period_ending"], title)
    }

    fn preset(column_fields: [&str; 2], title: Option<&str>) -> Self {
        let mut definition = PivotDefinition::new(["amount"], column_fields).without_value_level();
        definition.title = title.map(str::to_string);
        definition
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_aggregation(mut self, aggregation: AggregationType) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Enables total row/columns labelled `name`.
    pub fn with_margins(mut self, name: impl Into<String>) -> Self {
        self.margins = true;
        self.margins_name = name.into();
        self
    }

    pub fn without_value_level(mut self) -> Self {
        self.include_value_level = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let def = PivotDefinition::new(["Sales"], ["Region"]);
        assert_eq!(def.aggregation, AggregationType::Sum);
        assert!(!def.margins);
        assert_eq!(def.margins_name, "Total");
        assert!(def.include_value_level);
    }

    #[test]
    fn test_presets() {
        let standard = PivotDefinition::standard(Some("Income"));
        assert_eq!(standard.value_fields, vec!["amount"]);
        assert_eq!(standard.column_fields, vec!["duration", "annum"]);
        assert_eq!(standard.title.as_deref(), Some("Income"));
        assert!(!standard.include_value_level);

        let series = PivotDefinition::series(None);
        assert_eq!(series.column_fields, vec!["duration", "period_ending"]);
        assert!(series.title.is_none());
    }

    #[test]
    fn test_definition_from_minimal_json() {
        let json = r#"{"value_fields":["Sales"],"column_fields":["Region"]}"#;
        let def: PivotDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def, PivotDefinition::new(["Sales"], ["Region"]));

        let full = def.with_title("Report").with_aggregation(AggregationType::Average).with_margins("All");
        let back: PivotDefinition = serde_json::from_str(&serde_json::to_string(&full).unwrap()).unwrap();
        assert_eq!(back, full);
    }

    #[test]
    fn test_aggregation_input_kinds() {
        assert!(AggregationType::Count.accepts_non_numbers());
        assert!(!AggregationType::Sum.accepts_non_numbers());
        assert_eq!(AggregationType::default().name(), "sum");
    }
}
