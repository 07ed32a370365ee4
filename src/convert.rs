//! Turning raw tokens into typed cell values

use crate::error::Result;
use crate::format::{ColumnType, Locale, TextFormat};
use crate::types::CellValue;
use chrono::{NaiveDate, NaiveDateTime};

/// Converts one raw token into a cell value
///
/// `qualified` is true when the token was wrapped in text qualifiers, which
/// usually means it should stay text. Errors are passed to the caller of the
/// loader unchanged.
pub trait ValueConverter {
    fn convert(&self, raw: &str, column: usize, qualified: bool) -> Result<CellValue>;
}

impl<F> ValueConverter for F
where
    F: Fn(&str, usize, bool) -> Result<CellValue>,
{
    fn convert(&self, raw: &str, column: usize, qualified: bool) -> Result<CellValue> {
        self(raw, column, qualified)
    }
}

/// Converter that keeps every token as text (empty tokens become `Empty`)
pub struct StringConverter;

impl ValueConverter for StringConverter {
    fn convert(&self, raw: &str, _column: usize, _qualified: bool) -> Result<CellValue> {
        Ok(text_or_empty(raw))
    }
}

/// Locale-aware converter driven by a format's column types
///
/// # Examples
///
/// ```
/// use sheetload::{CellValue, DefaultConverter, TextFormat, ValueConverter};
///
/// let converter = DefaultConverter::new(&TextFormat::default());
/// assert_eq!(converter.convert("42", 0, false).unwrap(), CellValue::Int(42));
/// assert_eq!(converter.convert("42", 0, true).unwrap(), CellValue::String("42".into()));
/// assert_eq!(converter.convert("12.5%", 0, false).unwrap(), CellValue::Float(0.125));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultConverter {
    column_types: Vec<ColumnType>,
    locale: Locale,
}

impl DefaultConverter {
    pub fn new(format: &TextFormat) -> Self {
        DefaultConverter {
            column_types: format.column_types.clone(),
            locale: format.locale.clone(),
        }
    }

    fn guess(&self, raw: &str) -> CellValue {
        if let Some(number) = raw.strip_suffix('%').and_then(|v| self.parse_number(v)) {
            return CellValue::Float(number.as_f64() / 100.0);
        }
        if let Some(number) = self.parse_number(raw) {
            return number.into_value();
        }
        if let Some(serial) = self.parse_date(raw) {
            return CellValue::DateTime(serial);
        }
        if raw.eq_ignore_ascii_case("true") {
            return CellValue::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return CellValue::Bool(false);
        }
        text_or_empty(raw)
    }

    /// Parse a number written with the locale's separators
    fn parse_number(&self, raw: &str) -> Option<Number> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let mut normalized = String::with_capacity(trimmed.len());
        let mut is_integer = true;
        for ch in trimmed.chars() {
            match ch {
                c if c == self.locale.group_separator => {}
                c if c == self.locale.decimal_separator => {
                    normalized.push('.');
                    is_integer = false;
                }
                '0'..='9' | '+' | '-' => normalized.push(ch),
                'e' | 'E' => {
                    normalized.push(ch);
                    is_integer = false;
                }
                _ => return None,
            }
        }

        if is_integer {
            if let Ok(i) = normalized.parse::<i64>() {
                return Some(Number::Int(i));
            }
        }
        normalized.parse::<f64>().ok().map(Number::Float)
    }

    /// Parse a date or date-time into an Excel serial number
    fn parse_date(&self, raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.locale.date_formats.iter().find_map(|pattern| {
            NaiveDateTime::parse_from_str(trimmed, pattern)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(trimmed, pattern)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
                .map(excel_serial)
        })
    }
}

impl ValueConverter for DefaultConverter {
    fn convert(&self, raw: &str, column: usize, qualified: bool) -> Result<CellValue> {
        let value = match self.column_types.get(column).copied() {
            None if qualified => text_or_empty(raw),
            None | Some(ColumnType::Unknown) => self.guess(raw),
            Some(ColumnType::String) => CellValue::String(raw.to_string()),
            Some(ColumnType::Number) => match self.parse_number(raw) {
                Some(number) => number.into_value(),
                None => CellValue::String(raw.to_string()),
            },
            Some(ColumnType::DateTime) => match self.parse_date(raw) {
                Some(serial) => CellValue::DateTime(serial),
                None => CellValue::String(raw.to_string()),
            },
            Some(ColumnType::Percent) => {
                let digits = raw.strip_suffix('%').unwrap_or(raw);
                match self.parse_number(digits) {
                    Some(number) => CellValue::Float(number.as_f64() / 100.0),
                    None => CellValue::String(raw.to_string()),
                }
            }
        };
        Ok(value)
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn into_value(self) -> CellValue {
        match self {
            Number::Int(i) => CellValue::Int(i),
            Number::Float(f) => CellValue::Float(f),
        }
    }
}

fn text_or_empty(raw: &str) -> CellValue {
    if raw.is_empty() {
        CellValue::Empty
    } else {
        CellValue::String(raw.to_string())
    }
}

/// Days since 1899-12-30, with the time of day as the fraction
pub fn excel_serial(datetime: NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let elapsed = datetime - epoch;
    elapsed.num_milliseconds() as f64 / 86_400_000.0
}
