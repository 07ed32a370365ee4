//! Loading text and in-memory rows into a cell sink
//!
//! Every loader writes one grid row per source row, in source order, starting
//! at the given top-left cell, and returns the rectangle it filled. `Ok(None)`
//! means there was nothing to load; it is not an error.

use crate::convert::ValueConverter;
use crate::csv::{split_lines, FieldTokenizer};
use crate::error::Result;
use crate::format::TextFormat;
use crate::sink::{offset, CellSink};
use crate::types::{CellRange, CellValue};
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Parse `text` and write its fields into `sink` starting at `(row, col)`
///
/// Lines are numbered from 1. Lines numbered up to `skip_leading`, or past
/// `total - skip_trailing`, are counted but neither tokenized nor written.
/// Converter errors are returned unchanged. A line is written only once all
/// of its fields converted, so a failing line leaves its row untouched.
/// Coordinates past `u32::MAX` fail with [`LoadError::WriteError`].
///
/// [`LoadError::WriteError`]: crate::error::LoadError::WriteError
///
/// # Examples
///
/// ```
/// use sheetload::{load_text, CellRange, CellValue, DefaultConverter, Grid, TextFormat};
///
/// let format = TextFormat::csv().delimiter(';');
/// let mut grid = Grid::new();
/// let range = load_text(&mut grid, 2, 1, "x;\"y;z\"\n1;2", &format, &DefaultConverter::new(&format))
///     .unwrap()
///     .unwrap();
///
/// assert_eq!(range, CellRange::new(2, 1, 3, 2));
/// assert_eq!(grid.value(2, 2), &CellValue::String("y;z".to_string()));
/// ```
pub fn load_text<S, C>(
    sink: &mut S,
    row: u32,
    col: u32,
    text: &str,
    format: &TextFormat,
    converter: &C,
) -> Result<Option<CellRange>>
where
    S: CellSink + ?Sized,
    C: ValueConverter + ?Sized,
{
    if text.is_empty() {
        debug!("empty input, nothing to load");
        return Ok(None);
    }
    format.validate()?;

    let lines = split_lines(text, format)?;
    let total = lines.len();
    let last_kept = total.saturating_sub(format.skip_trailing);
    let kept: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| (index + 1, *line))
        .filter(|(line_no, _)| {
            let keep = *line_no > format.skip_leading && *line_no <= last_kept;
            if !keep {
                trace!(line = line_no, "skipping line");
            }
            keep
        })
        .collect();

    let (row_count, max_fields) = write_rows(sink, row, col, &kept, format, converter)?;
    if row_count == 0 {
        debug!(lines = total, "every line was skipped");
        return Ok(None);
    }

    // Every tokenized line has at least one field
    let range = CellRange::new(row, col, offset(row, row_count - 1)?, offset(col, max_fields - 1)?);
    debug!(lines = total, rows = row_count, range = %range, "loaded text");
    Ok(Some(range))
}

#[cfg(not(feature = "parallel"))]
fn write_rows<S, C>(
    sink: &mut S,
    row: u32,
    col: u32,
    lines: &[(usize, &str)],
    format: &TextFormat,
    converter: &C,
) -> Result<(usize, usize)>
where
    S: CellSink + ?Sized,
    C: ValueConverter + ?Sized,
{
    let tokenizer = FieldTokenizer::with_format(format);
    let mut max_fields = 0;
    let mut emitted = 0;

    for &(line_no, line) in lines {
        let target = offset(row, emitted)?;
        let mut values = Vec::new();
        let fields = tokenizer.tokenize_with(line, line_no, |field, raw, qualified| {
            values.push(converter.convert(&raw, field, qualified)?);
            Ok(())
        })?;
        sink.write_row(target, col, values)?;
        max_fields = max_fields.max(fields);
        emitted += 1;
    }
    Ok((emitted, max_fields))
}

/// Tokenizes lines on the rayon pool, then converts and writes in order
#[cfg(feature = "parallel")]
fn write_rows<S, C>(
    sink: &mut S,
    row: u32,
    col: u32,
    lines: &[(usize, &str)],
    format: &TextFormat,
    converter: &C,
) -> Result<(usize, usize)>
where
    S: CellSink + ?Sized,
    C: ValueConverter + ?Sized,
{
    use rayon::prelude::*;

    let tokenizer = FieldTokenizer::with_format(format);
    let tokenized: Vec<_> = lines
        .par_iter()
        .map(|&(line_no, line)| tokenizer.parse_line(line, line_no))
        .collect();

    let mut max_fields = 0;
    let mut emitted = 0;
    for tokens in tokenized {
        let tokens = tokens?;
        let target = offset(row, emitted)?;
        let values = tokens
            .iter()
            .enumerate()
            .map(|(field, token)| converter.convert(&token.text, field, token.qualified))
            .collect::<Result<Vec<_>>>()?;
        sink.write_row(target, col, values)?;
        max_fields = max_fields.max(tokens.len());
        emitted += 1;
    }
    Ok((emitted, max_fields))
}

/// Write each slice as one row
///
/// The filled range is as wide as the longest row (at least one column).
pub fn load_from_arrays<S, I, R>(sink: &mut S, row: u32, col: u32, rows: I) -> Result<Option<CellRange>>
where
    S: CellSink + ?Sized,
    I: IntoIterator<Item = R>,
    R: AsRef<[CellValue]>,
{
    let mut emitted = 0;
    let mut max_columns = 0;

    for values in rows {
        let values = values.as_ref();
        sink.write_row(offset(row, emitted)?, col, values.to_vec())?;
        max_columns = max_columns.max(values.len());
        emitted += 1;
    }

    if emitted == 0 {
        return Ok(None);
    }
    debug!(rows = emitted, "loaded arrays");
    Ok(Some(CellRange::new(
        row,
        col,
        offset(row, emitted - 1)?,
        offset(col, max_columns.saturating_sub(1))?,
    )))
}

/// Write ordered maps as rows, one column per key
///
/// Columns follow `keys` when given, otherwise the keys of the first item.
/// Keys missing from an item leave an `Empty` cell. With `print_headers` the
/// key names are written as the first row.
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use sheetload::{load_from_dictionaries, CellValue, Grid};
///
/// let mut item = IndexMap::new();
/// item.insert("Id".to_string(), CellValue::Int(1));
/// item.insert("Name".to_string(), CellValue::from("TestName 1"));
///
/// let mut grid = Grid::new();
/// let range = load_from_dictionaries(&mut grid, 0, 0, &[item], true, None).unwrap().unwrap();
/// assert_eq!(range.address(), "A1:B2");
/// assert_eq!(grid.value(0, 1), &CellValue::from("Name"));
/// ```
pub fn load_from_dictionaries<S>(
    sink: &mut S,
    row: u32,
    col: u32,
    items: &[IndexMap<String, CellValue>],
    print_headers: bool,
    keys: Option<&[&str]>,
) -> Result<Option<CellRange>>
where
    S: CellSink + ?Sized,
{
    let Some(first) = items.first() else {
        return Ok(None);
    };
    let columns: Vec<&str> = match keys {
        Some(keys) => keys.to_vec(),
        None => first.keys().map(String::as_str).collect(),
    };

    let header_rows = usize::from(print_headers);
    if print_headers {
        let headers = columns.iter().map(|k| CellValue::from(*k)).collect();
        sink.write_row(row, col, headers)?;
    }
    for (index, item) in items.iter().enumerate() {
        let values = columns
            .iter()
            .map(|key| item.get(*key).cloned().unwrap_or(CellValue::Empty))
            .collect();
        sink.write_row(offset(row, header_rows + index)?, col, values)?;
    }

    let row_count = header_rows + items.len();
    debug!(rows = row_count, columns = columns.len(), "loaded dictionaries");
    Ok(Some(CellRange::new(
        row,
        col,
        offset(row, row_count - 1)?,
        offset(col, columns.len().saturating_sub(1))?,
    )))
}
