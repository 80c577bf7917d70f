//! FILENAME: table-engine/src/coord.rs
//! PURPOSE: Conversions between A1-style references and 0-based (row, col)
//! coordinates for the geometry handed to a spreadsheet renderer.
//! CONTEXT: Column "A" = 0, "Z" = 25, "AA" = 26. Row 1 in A1 notation is
//! row 0 internally. Absolute references carry `$` before both parts.

use crate::error::{TableError, TableResult};

/// A cell coordinate as (row, col) with 0-based indices.
pub type CellCoord = (u32, u32);

/// Converts a column string ("A", "AA", "abc") to a 0-based column index.
pub fn col_to_index(col_str: &str) -> TableResult<u32> {
    if col_str.is_empty() || !col_str.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(TableError::InvalidInput(format!(
            "'{}' is not a column reference",
            col_str
        )));
    }

    let mut result: u32 = 0;
    for c in col_str.chars() {
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result
            .checked_mul(26)
            .and_then(|r| r.checked_add(digit))
            .ok_or_else(|| {
                TableError::InvalidInput(format!("column '{}' is out of range", col_str))
            })?;
    }
    Ok(result - 1)
}

/// Converts a 0-based column index to a column string.
/// 0 -> "A", 25 -> "Z", 26 -> "AA".
pub fn index_to_col(mut col_index: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col_index % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }
    result
}

/// (0, 0) -> "A1", (99, 26) -> "AA100"
pub fn coord_to_a1(coord: CellCoord) -> String {
    let (row, col) = coord;
    format!("{}{}", index_to_col(col), row + 1)
}

/// (0, 0) -> "$A$1"
pub fn coord_to_absolute_a1(coord: CellCoord) -> String {
    let (row, col) = coord;
    format!("${}${}", index_to_col(col), row + 1)
}

/// Parses "B2", "$B$2" or "b$2" into a 0-based coordinate.
pub fn a1_to_coord(reference: &str) -> TableResult<CellCoord> {
    let invalid = || TableError::InvalidInput(format!("'{}' is not an A1 cell reference", reference));

    let rest = reference.strip_prefix('$').unwrap_or(reference);
    let split = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .ok_or_else(invalid)?;
    let (col_str, row_part) = rest.split_at(split);
    let row_str = row_part.strip_prefix('$').unwrap_or(row_part);

    if col_str.is_empty() || row_str.is_empty() || !row_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let row_num: u32 = row_str.parse().map_err(|_| invalid())?;
    if row_num == 0 {
        return Err(invalid());
    }
    Ok((row_num - 1, col_to_index(col_str)?))
}

/// "A1:C3" style range between two coordinates.
pub fn cell_range(start: CellCoord, end: CellCoord, absolute: bool) -> String {
    if absolute {
        format!("{}:{}", coord_to_absolute_a1(start), coord_to_absolute_a1(end))
    } else {
        format!("{}:{}", coord_to_a1(start), coord_to_a1(end))
    }
}
