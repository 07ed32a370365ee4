//! In-memory cell grid

use crate::convert::DefaultConverter;
use crate::csv::TextEncoder;
use crate::error::Result;
use crate::format::TextFormat;
use crate::loader;
use crate::sink::CellSink;
use crate::types::{Cell, CellRange, CellValue, Row};
use std::collections::BTreeMap;

/// Sparse worksheet-like grid implementing [`CellSink`]
///
/// # Examples
///
/// ```
/// use sheetload::{CellValue, Grid, TextFormat};
///
/// let mut grid = Grid::new();
/// let range = grid
///     .load_text(0, 0, "Name,Age\nAlice,30", &TextFormat::csv())
///     .unwrap()
///     .unwrap();
///
/// assert_eq!(range.address(), "A1:B2");
/// assert_eq!(grid.value(1, 1), &CellValue::Int(30));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Grid {
    rows: BTreeMap<u32, BTreeMap<u32, CellValue>>,
    bounds: Option<CellRange>,
}

static EMPTY: CellValue = CellValue::Empty;

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load delimited text at `(row, col)` using the format's default conversion
    ///
    /// Returns `None` when the text is empty or every line was skipped.
    pub fn load_text(
        &mut self,
        row: u32,
        col: u32,
        text: &str,
        format: &TextFormat,
    ) -> Result<Option<CellRange>> {
        let converter = DefaultConverter::new(format);
        loader::load_text(self, row, col, text, format, &converter)
    }

    /// Cell value if one was written
    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.rows.get(&row).and_then(|cells| cells.get(&col))
    }

    /// Cell value, `Empty` when never written
    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        self.get(row, col).unwrap_or(&EMPTY)
    }

    /// Values of `row` across the columns of `range`
    pub fn row_values(&self, row: u32, range: &CellRange) -> Row {
        let cells = (range.first_col..=range.last_col)
            .map(|col| self.value(row, col).clone())
            .collect();
        Row::new(row, cells)
    }

    /// Every row of `range`, top to bottom
    pub fn rows_in(&self, range: &CellRange) -> Vec<Row> {
        (range.first_row..=range.last_row)
            .map(|row| self.row_values(row, range))
            .collect()
    }

    /// All stored cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.rows.iter().flat_map(|(&row, cells)| {
            cells
                .iter()
                .map(move |(&col, value)| Cell::new(row, col, value.clone()))
        })
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.bounds = None;
    }

    /// Serialise `range` as delimited text readable by [`Grid::load_text`]
    pub fn to_text(&self, range: &CellRange, format: &TextFormat) -> String {
        let encoder = TextEncoder::with_format(format);
        let rows: Vec<Vec<String>> = self
            .rows_in(range)
            .iter()
            .map(Row::to_strings)
            .collect();
        let mut buffer = String::new();
        encoder.encode_rows(&rows, &mut buffer);
        buffer
    }
}

impl CellSink for Grid {
    fn write(&mut self, row: u32, col: u32, value: CellValue) -> Result<()> {
        self.rows.entry(row).or_default().insert(col, value);
        self.bounds = Some(match self.bounds {
            Some(bounds) => bounds.expand_to(row, col),
            None => CellRange::cell(row, col),
        });
        Ok(())
    }

    fn current_bounds(&self) -> Option<CellRange> {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_tracks_bounds() {
        let mut grid = Grid::new();
        assert_eq!(grid.current_bounds(), None);

        grid.write(2, 3, CellValue::Int(1)).unwrap();
        grid.write(0, 5, CellValue::Empty).unwrap();
        assert_eq!(grid.current_bounds(), Some(CellRange::new(0, 3, 2, 5)));
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn test_value_defaults_to_empty() {
        let mut grid = Grid::new();
        grid.write(0, 0, "x".into()).unwrap();
        assert_eq!(grid.value(0, 0), &CellValue::String("x".to_string()));
        assert_eq!(grid.value(4, 4), &CellValue::Empty);
        assert!(grid.get(4, 4).is_none());
    }

    #[test]
    fn test_rows_in_range() {
        let mut grid = Grid::new();
        grid.write_row(1, 1, vec!["a".into(), CellValue::Int(2)]).unwrap();
        grid.write(2, 1, "b".into()).unwrap();

        let rows = grid.rows_in(&CellRange::new(1, 1, 2, 2));
        assert_eq!(rows[0].to_strings(), vec!["a", "2"]);
        assert_eq!(rows[1].to_strings(), vec!["b", ""]);
    }

    #[test]
    fn test_cells_row_major() {
        let mut grid = Grid::new();
        grid.write(1, 0, "c".into()).unwrap();
        grid.write(0, 1, "b".into()).unwrap();
        grid.write(0, 0, "a".into()).unwrap();

        let refs: Vec<String> = grid.cells().map(|c| c.reference()).collect();
        assert_eq!(refs, vec!["A1", "B1", "A2"]);
    }

    #[test]
    fn test_to_text_escapes() {
        let mut grid = Grid::new();
        grid.write_row(0, 0, vec!["a,b".into(), "say \"hi\"".into()]).unwrap();
        grid.write_row(1, 0, vec!["c".into(), "d".into()]).unwrap();

        let text = grid.to_text(&CellRange::new(0, 0, 1, 1), &TextFormat::csv());
        assert_eq!(text, "\"a,b\",\"say \"\"hi\"\"\"\nc,d");
    }

    #[test]
    fn test_clear() {
        let mut grid = Grid::new();
        grid.write(0, 0, CellValue::Bool(true)).unwrap();
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.current_bounds(), None);
    }
}
