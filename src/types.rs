//! Cell values and grid coordinates

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A typed scalar stored in one grid cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellValue {
    /// Empty cell
    Empty,
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// DateTime value (Excel serial date number)
    DateTime(f64),
}

impl CellValue {
    /// Convert cell value to string
    pub fn as_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(d) => d.to_string(),
        }
    }

    /// Check if cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// Represents a cell with its position
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based)
    pub col: u32,
    /// Cell value
    pub value: CellValue,
}

impl Cell {
    /// Create a new cell
    pub fn new(row: u32, col: u32, value: CellValue) -> Self {
        Cell { row, col, value }
    }

    /// Get Excel-style cell reference (e.g., "A1", "B2")
    pub fn reference(&self) -> String {
        cell_reference(self.row, self.col)
    }
}

/// Excel-style reference for a 0-based coordinate
pub fn cell_reference(row: u32, col: u32) -> String {
    let mut result = col_to_letter(col);
    let mut buf = itoa::Buffer::new();
    result.push_str(buf.format(row as u64 + 1));
    result
}

/// Convert column index to Excel letter (0 -> A, 25 -> Z, 26 -> AA)
pub fn col_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut col = col as u64 + 1;

    while col > 0 {
        col -= 1;
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }

    result
}

/// Inclusive rectangle of cells, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl CellRange {
    /// Create a range from its corners
    pub fn new(first_row: u32, first_col: u32, last_row: u32, last_col: u32) -> Self {
        CellRange {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    /// Single-cell range
    pub fn cell(row: u32, col: u32) -> Self {
        Self::new(row, col, row, col)
    }

    /// Number of rows covered
    pub fn rows(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    /// Number of columns covered
    pub fn columns(&self) -> u32 {
        self.last_col - self.first_col + 1
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    /// Smallest range covering both `self` and the given cell
    pub fn expand_to(&self, row: u32, col: u32) -> Self {
        CellRange {
            first_row: self.first_row.min(row),
            first_col: self.first_col.min(col),
            last_row: self.last_row.max(row),
            last_col: self.last_col.max(col),
        }
    }

    /// Excel-style address, e.g. "A1:C4"
    pub fn address(&self) -> String {
        format!(
            "{}:{}",
            cell_reference(self.first_row, self.first_col),
            cell_reference(self.last_row, self.last_col)
        )
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

/// Represents a row of cells
#[derive(Debug, Clone)]
pub struct Row {
    /// Row index (0-based)
    pub index: u32,
    /// Cells in this row
    pub cells: Vec<CellValue>,
}

impl Row {
    /// Create a new row
    pub fn new(index: u32, cells: Vec<CellValue>) -> Self {
        Row { index, cells }
    }

    /// Convert row to vector of strings
    pub fn to_strings(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.as_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_reference() {
        let cell = Cell::new(0, 0, CellValue::Empty);
        assert_eq!(cell.reference(), "A1");

        let cell = Cell::new(0, 25, CellValue::Empty);
        assert_eq!(cell.reference(), "Z1");

        let cell = Cell::new(9, 26, CellValue::Empty);
        assert_eq!(cell.reference(), "AA10");
    }

    #[test]
    fn test_row_to_strings() {
        let row = Row::new(0, vec![CellValue::Empty, CellValue::Int(7), CellValue::Bool(true)]);
        assert_eq!(row.to_strings(), vec!["", "7", "true"]);
        assert!(row.cells[0].is_empty());
    }

    #[test]
    fn test_range_geometry() {
        let range = CellRange::new(1, 0, 3, 2);
        assert_eq!(range.rows(), 3);
        assert_eq!(range.columns(), 3);
        assert_eq!(range.address(), "A2:C4");
        assert!(range.contains(2, 1));
        assert!(!range.contains(0, 1));

        let grown = CellRange::cell(5, 5).expand_to(2, 7);
        assert_eq!(grown, CellRange::new(2, 5, 5, 7));
    }
}
