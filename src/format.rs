//! Format descriptor for delimited text

use crate::error::{LoadError, Result};
use encoding_rs::Encoding;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Platform line terminator used as the default end-of-line marker
#[cfg(windows)]
pub const DEFAULT_EOL: &str = "\r\n";
/// Platform line terminator used as the default end-of-line marker
#[cfg(not(windows))]
pub const DEFAULT_EOL: &str = "\n";

/// How a column's tokens should be coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColumnType {
    /// Guess: number, percentage, date, boolean, then string
    #[default]
    Unknown,
    /// Keep the raw text
    String,
    Number,
    DateTime,
    /// Number divided by 100, with an optional trailing `%`
    Percent,
}

/// Number and date conventions used when coercing tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub decimal_separator: char,
    pub group_separator: char,
    /// chrono patterns tried in order; patterns without a time part are parsed as dates
    pub date_formats: Vec<String>,
}

impl Default for Locale {
    fn default() -> Self {
        Locale {
            decimal_separator: '.',
            group_separator: ',',
            date_formats: [
                "%Y-%m-%d %H:%M:%S",
                "%Y-%m-%dT%H:%M:%S",
                "%Y-%m-%d %H:%M",
                "%Y-%m-%d",
                "%Y/%m/%d",
                "%m/%d/%Y %H:%M:%S",
                "%m/%d/%Y",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Locale {
    /// Comma decimal separator, dot grouping, day-first dates
    pub fn european() -> Self {
        Locale {
            decimal_separator: ',',
            group_separator: '.',
            date_formats: [
                "%d.%m.%Y %H:%M:%S",
                "%d.%m.%Y",
                "%d/%m/%Y",
                "%Y-%m-%d",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Describes how raw text is split into lines and fields
///
/// # Examples
///
/// ```
/// use sheetload::TextFormat;
///
/// let format = TextFormat::new()
///     .delimiter(';')
///     .quote('"')
///     .eol("\r\n")
///     .skip_leading(1);
/// assert!(format.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct TextFormat {
    pub delimiter: char,
    /// Text qualifier; `None` disables quoting entirely
    pub quote: Option<char>,
    /// End-of-line marker; empty means the whole input is one line
    pub eol: String,
    pub skip_leading: usize,
    pub skip_trailing: usize,
    /// Used only when reading files
    pub encoding: &'static Encoding,
    pub column_types: Vec<ColumnType>,
    pub locale: Locale,
}

impl Default for TextFormat {
    fn default() -> Self {
        TextFormat {
            delimiter: ',',
            quote: None,
            eol: DEFAULT_EOL.to_string(),
            skip_leading: 0,
            skip_trailing: 0,
            encoding: encoding_rs::UTF_8,
            column_types: Vec::new(),
            locale: Locale::default(),
        }
    }
}

impl TextFormat {
    /// Comma separated, unquoted, platform line endings
    pub fn new() -> Self {
        Self::default()
    }

    /// Comma separated, `"` qualified, `\n` line endings
    pub fn csv() -> Self {
        Self::default().quote('"').eol("\n")
    }

    /// Set field delimiter (builder pattern)
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set text qualifier (builder pattern)
    pub fn quote(mut self, quote: char) -> Self {
        self.quote = Some(quote);
        self
    }

    /// Disable text qualifiers
    pub fn no_quote(mut self) -> Self {
        self.quote = None;
        self
    }

    /// Set end-of-line marker (builder pattern)
    pub fn eol(mut self, eol: impl Into<String>) -> Self {
        self.eol = eol.into();
        self
    }

    pub fn skip_leading(mut self, lines: usize) -> Self {
        self.skip_leading = lines;
        self
    }

    pub fn skip_trailing(mut self, lines: usize) -> Self {
        self.skip_trailing = lines;
        self
    }

    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Per-column coercion, indexed by field position
    pub fn column_types(mut self, types: impl Into<Vec<ColumnType>>) -> Self {
        self.column_types = types.into();
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Explicit type for a column, if one was configured
    pub fn column_type(&self, column: usize) -> Option<ColumnType> {
        self.column_types.get(column).copied()
    }

    /// Check the descriptor's invariants
    pub fn validate(&self) -> Result<()> {
        if self.quote == Some(self.delimiter) {
            return Err(LoadError::InvalidFormat(format!(
                "delimiter and text qualifier must differ (both {:?})",
                self.delimiter
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let format = TextFormat::default();
        assert_eq!(format.delimiter, ',');
        assert_eq!(format.quote, None);
        assert_eq!(format.eol, DEFAULT_EOL);
        assert_eq!(format.skip_leading, 0);
        assert_eq!(format.skip_trailing, 0);
        assert_eq!(format.encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn test_same_delimiter_and_quote_rejected() {
        let format = TextFormat::new().delimiter('\'').quote('\'');
        assert!(matches!(format.validate(), Err(LoadError::InvalidFormat(_))));
        assert!(TextFormat::csv().validate().is_ok());
    }

    #[test]
    fn test_column_type_lookup() {
        let format = TextFormat::new().column_types([ColumnType::String, ColumnType::Percent]);
        assert_eq!(format.column_type(1), Some(ColumnType::Percent));
        assert_eq!(format.column_type(2), None);
    }
}
