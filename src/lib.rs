//! # sheetload
//!
//! Load delimited text into a grid of typed cells.
//!
//! The text engine splits raw text into logical lines (quote-aware, with any
//! end-of-line marker, including multi-character ones), tokenizes each line into
//! fields (doubled qualifiers decode to one literal qualifier), converts every
//! token into a [`CellValue`] and writes it into a [`CellSink`].
//!
//! ## Quick Start
//!
//! ```
//! use sheetload::{CellValue, Grid, TextFormat};
//!
//! let format = TextFormat::csv().skip_leading(1);
//! let mut grid = Grid::new();
//!
//! let range = grid
//!     .load_text(0, 0, "id,name\n1,\"Doe, Jane\"\n2,\"Say \"\"hi\"\"\"", &format)
//!     .unwrap()
//!     .expect("rows loaded");
//!
//! assert_eq!(range.address(), "A1:B2");
//! assert_eq!(grid.value(0, 1), &CellValue::from("Doe, Jane"));
//! assert_eq!(grid.value(1, 1), &CellValue::from("Say \"hi\""));
//! ```
//!
//! Empty input is not an error: loaders return `Ok(None)`.

pub mod convert;
pub mod csv;
pub mod error;
pub mod format;
pub mod grid;
pub mod loader;
pub mod sink;
pub mod text_reader;
pub mod types;

pub use convert::{DefaultConverter, StringConverter, ValueConverter};
pub use error::{LoadError, Result};
pub use format::{ColumnType, Locale, TextFormat};
pub use grid::Grid;
pub use loader::{load_from_arrays, load_from_dictionaries, load_text};
pub use sink::CellSink;
pub use text_reader::load_text_file;
pub use types::{Cell, CellRange, CellValue, Row};
