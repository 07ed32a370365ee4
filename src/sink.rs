//! Destination for loaded cell values

use crate::error::{LoadError, Result};
use crate::types::{CellRange, CellValue};

/// Grid storage that loaders write into
///
/// Coordinates are 0-based. A sink is written by one loader at a time;
/// loading into disjoint sinks from several threads is fine.
pub trait CellSink {
    /// Store `value` at `(row, col)`
    fn write(&mut self, row: u32, col: u32, value: CellValue) -> Result<()>;

    /// Bounding rectangle of everything written so far
    fn current_bounds(&self) -> Option<CellRange>;

    /// Store a row of values starting at `(row, col)`
    ///
    /// Nothing is written when the row would run past the last column.
    fn write_row(&mut self, row: u32, col: u32, values: Vec<CellValue>) -> Result<()> {
        if let Some(last) = values.len().checked_sub(1) {
            offset(col, last)?;
        }
        for (index, value) in values.into_iter().enumerate() {
            self.write(row, offset(col, index)?, value)?;
        }
        Ok(())
    }
}

/// `base + by` as a grid coordinate
pub(crate) fn offset(base: u32, by: usize) -> Result<u32> {
    u32::try_from(by)
        .ok()
        .and_then(|by| base.checked_add(by))
        .ok_or_else(|| LoadError::WriteError("cell coordinate out of range".to_string()))
}

impl<S: CellSink + ?Sized> CellSink for &mut S {
    fn write(&mut self, row: u32, col: u32, value: CellValue) -> Result<()> {
        (**self).write(row, col, value)
    }

    fn current_bounds(&self) -> Option<CellRange> {
        (**self).current_bounds()
    }
}
