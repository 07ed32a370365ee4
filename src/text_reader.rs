//! Reading text files (plain or compressed) for loading
//!
//! Bytes are decoded with the format's encoding before they reach the parser.
//! A byte-order mark, when present, overrides the configured encoding.

use crate::convert::ValueConverter;
use crate::error::{LoadError, Result};
use crate::format::TextFormat;
use crate::loader;
use crate::sink::CellSink;
use crate::types::CellRange;
use encoding_rs::Encoding;
use s_zip::StreamingZipReader;
use std::path::Path;
use tracing::{debug, warn};

/// Read and decode a whole text file
///
/// # File Extensions
/// - `.zst`, `.zip` → Zstd-compressed archive, first entry is read
/// - `.gz` → Deflate-compressed archive, first entry is read
/// - anything else → read as-is
///
/// # Examples
///
/// ```no_run
/// use sheetload::text_reader::read_text;
///
/// let text = read_text("data.csv", encoding_rs::WINDOWS_1252).unwrap();
/// let text = read_text("data.csv.zst", encoding_rs::UTF_8).unwrap();
/// ```
pub fn read_text<P: AsRef<Path>>(path: P, encoding: &'static Encoding) -> Result<String> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(LoadError::ReadError(format!(
            "File does not exist {}",
            path_ref.display()
        )));
    }

    let bytes = if is_compressed(path_ref) {
        read_archive_entry(path_ref)?
    } else {
        std::fs::read(path_ref)
            .map_err(|e| LoadError::ReadError(format!("Failed to read file: {}", e)))?
    };

    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        warn!(
            path = %path_ref.display(),
            encoding = used.name(),
            "malformed byte sequences replaced while decoding"
        );
    }
    debug!(path = %path_ref.display(), bytes = bytes.len(), encoding = used.name(), "read text file");
    Ok(text.into_owned())
}

/// Read a text file and load it into `sink` at `(row, col)`
///
/// # Examples
///
/// ```no_run
/// use sheetload::text_reader::load_text_file;
/// use sheetload::{DefaultConverter, Grid, TextFormat};
///
/// let format = TextFormat::csv().skip_leading(1);
/// let mut grid = Grid::new();
/// let range = load_text_file(&mut grid, 0, 0, "data.csv", &format, &DefaultConverter::new(&format)).unwrap();
/// ```
pub fn load_text_file<S, C, P>(
    sink: &mut S,
    row: u32,
    col: u32,
    path: P,
    format: &TextFormat,
    converter: &C,
) -> Result<Option<CellRange>>
where
    S: CellSink + ?Sized,
    C: ValueConverter + ?Sized,
    P: AsRef<Path>,
{
    let text = read_text(path, format.encoding)?;
    loader::load_text(sink, row, col, &text, format, converter)
}

fn is_compressed(path: &Path) -> bool {
    let path_str = path.to_str().unwrap_or("");
    path_str.ends_with(".zst") || path_str.ends_with(".zip") || path_str.ends_with(".gz")
}

fn read_archive_entry(path: &Path) -> Result<Vec<u8>> {
    let mut zip = StreamingZipReader::open(path)
        .map_err(|e| LoadError::ReadError(format!("Failed to open ZIP: {}", e)))?;

    // Prefer a text-looking entry, fall back to the first one
    let entry_name = zip
        .entries()
        .iter()
        .find(|e| e.name.ends_with(".csv") || e.name.ends_with(".txt"))
        .or_else(|| zip.entries().first())
        .ok_or_else(|| LoadError::ReadError("No entry found in archive".to_string()))?
        .name
        .clone();

    zip.read_entry_by_name(&entry_name)
        .map_err(|e| LoadError::ReadError(format!("Failed to read ZIP entry: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::types::CellValue;
    use std::io::Write;

    #[test]
    fn test_missing_file() {
        let err = read_text("definitely_missing_file.csv", encoding_rs::UTF_8).unwrap_err();
        assert!(matches!(err, LoadError::ReadError(msg) if msg.contains("does not exist")));
    }

    #[test]
    fn test_decodes_with_configured_encoding() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        // "café;1" in Windows-1252
        file.write_all(b"caf\xe9;1")?;
        file.flush()?;

        let text = read_text(file.path(), encoding_rs::WINDOWS_1252)?;
        assert_eq!(text, "café;1");
        Ok(())
    }

    #[test]
    fn test_bom_overrides_encoding() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"\xef\xbb\xbfa,b")?;
        file.flush()?;

        let text = read_text(file.path(), encoding_rs::WINDOWS_1252)?;
        assert_eq!(text, "a,b");
        Ok(())
    }

    #[test]
    fn test_load_text_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"Name,Age\r\n\"Smith, J\",42\r\n")?;
        file.flush()?;

        let format = TextFormat::csv().eol("\r\n").skip_trailing(1);
        let mut grid = Grid::new();
        let range = load_text_file(
            &mut grid,
            0,
            0,
            file.path(),
            &format,
            &crate::convert::DefaultConverter::new(&format),
        )?;

        assert_eq!(range, Some(CellRange::new(0, 0, 1, 1)));
        assert_eq!(grid.value(1, 0), &CellValue::from("Smith, J"));
        assert_eq!(grid.value(1, 1), &CellValue::Int(42));
        Ok(())
    }
}
