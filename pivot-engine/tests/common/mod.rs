//! FILENAME: tests/common/mod.rs
//! Fixtures and assertion helpers for pivot integration tests.

#![allow(dead_code)]

use table_engine::{CellValue, Label, Table};

// ============================================================================
// FIXTURES
// ============================================================================

/// Quarterly sales by region and product.
pub struct SalesFixture;

impl SalesFixture {
    pub fn headers() -> Vec<&'static str> {
        vec!["Region", "Product", "Quarter", "Sales", "Quantity"]
    }

    pub fn data() -> Vec<(&'static str, &'static str, &'static str, f64, f64)> {
        vec![
            ("North", "Widget", "Q1", 10000.0, 100.0),
            ("North", "Widget", "Q2", 12000.0, 120.0),
            ("North", "Gadget", "Q1", 8000.0, 80.0),
            ("North", "Gadget", "Q2", 9000.0, 90.0),
            ("South", "Widget", "Q1", 15000.0, 150.0),
            ("South", "Widget", "Q2", 14000.0, 140.0),
            ("South", "Gadget", "Q1", 11000.0, 110.0),
            ("South", "Gadget", "Q2", 13000.0, 130.0),
            ("East", "Widget", "Q1", 9000.0, 90.0),
            ("East", "Widget", "Q2", 11000.0, 110.0),
            ("East", "Gadget", "Q1", 7000.0, 70.0),
        ]
    }

    /// The records as a flat table, one column per header.
    pub fn table() -> Table {
        let data = Self::data();
        let headers = Self::headers();
        Table::from_columns([
            (headers[0], data.iter().map(|r| CellValue::from(r.0)).collect()),
            (headers[1], data.iter().map(|r| CellValue::from(r.1)).collect()),
            (headers[2], data.iter().map(|r| CellValue::from(r.2)).collect()),
            (headers[3], data.iter().map(|r| CellValue::Number(r.3)).collect()),
            (headers[4], data.iter().map(|r| CellValue::Number(r.4)).collect::<Vec<_>>()),
        ])
        .unwrap()
    }
}

/// Line items of an income statement in the shape the `standard` preset
/// expects: `line_item`, `duration`, `annum`, `amount`.
pub struct StatementFixture;

impl StatementFixture {
    pub fn data() -> Vec<(&'static str, &'static str, i32, f64)> {
        vec![
            ("revenue", "FY", 2022, 800.0),
            ("revenue", "FY", 2023, 1000.0),
            ("revenue", "FY", 2024, 1250.0),
            ("cost", "FY", 2022, 500.0),
            ("cost", "FY", 2023, 600.0),
            ("cost", "FY", 2024, 700.0),
        ]
    }

    pub fn table() -> Table {
        let data = Self::data();
        Table::from_columns([
            ("line_item", data.iter().map(|r| CellValue::from(r.0)).collect()),
            ("duration", data.iter().map(|r| CellValue::from(r.1)).collect()),
            ("annum", data.iter().map(|r| CellValue::from(r.2)).collect()),
            ("amount", data.iter().map(|r| CellValue::Number(r.3)).collect::<Vec<_>>()),
        ])
        .unwrap()
    }
}

// ============================================================================
// ASSERTION HELPERS
// ============================================================================

/// Assert that a cell contains an expected number value.
pub fn assert_cell_number(table: &Table, row: &Label, column: &Label, expected: f64) {
    match table.get(row, column) {
        Some(CellValue::Number(n)) => {
            assert!(
                (n - expected).abs() < 0.001,
                "Cell ({}, {}) expected {} but got {}",
                row, column, expected, n
            );
        }
        other => panic!(
            "Cell ({}, {}) expected Number({}) but got {:?}",
            row, column, expected, other
        ),
    }
}
