//! Field encoding, the inverse of the tokenizer

use crate::format::TextFormat;

/// Encoder for writing delimited text that the tokenizer reads back unchanged
pub struct TextEncoder<'a> {
    delimiter: char,
    quote: Option<char>,
    eol: &'a str,
}

impl<'a> TextEncoder<'a> {
    /// Create a new encoder with custom delimiter, qualifier and line marker
    pub fn new(delimiter: char, quote: Option<char>, eol: &'a str) -> Self {
        Self {
            delimiter,
            quote,
            eol,
        }
    }

    pub fn with_format(format: &'a TextFormat) -> Self {
        Self::new(format.delimiter, format.quote, &format.eol)
    }

    /// Encode entire row into buffer
    pub fn encode_row<S: AsRef<str>>(&self, fields: &[S], buffer: &mut String) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                buffer.push(self.delimiter);
            }
            self.encode_field(field.as_ref(), buffer);
        }
    }

    /// Encode rows separated by the line marker
    pub fn encode_rows<R, S>(&self, rows: &[R], buffer: &mut String)
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                buffer.push_str(self.eol);
            }
            self.encode_row(row.as_ref(), buffer);
        }
    }

    /// Encode single field with proper quoting/escaping
    fn encode_field(&self, field: &str, buffer: &mut String) {
        match self.quote {
            Some(quote) if self.needs_quoting(field, quote) => {
                buffer.push(quote);
                for ch in field.chars() {
                    if ch == quote {
                        // Escape quotes by doubling: " -> ""
                        buffer.push(quote);
                    }
                    buffer.push(ch);
                }
                buffer.push(quote);
            }
            _ => buffer.push_str(field),
        }
    }

    /// Check if field requires quoting
    fn needs_quoting(&self, field: &str, quote: char) -> bool {
        field
            .chars()
            .any(|c| c == self.delimiter || c == quote || c == '\n' || c == '\r')
            || (!self.eol.is_empty() && field.contains(self.eol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(fields: &[&str]) -> String {
        let encoder = TextEncoder::new(',', Some('"'), "\n");
        let mut buffer = String::new();
        encoder.encode_row(fields, &mut buffer);
        buffer
    }

    #[test]
    fn test_simple_fields() {
        assert_eq!(encode(&["a", "b", "c"]), "a,b,c");
    }

    #[test]
    fn test_quoted_fields() {
        assert_eq!(encode(&["a,b", "c"]), r#""a,b",c"#);
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(encode(&[r#"Say "Hello""#, "world"]), r#""Say ""Hello""",world"#);
    }

    #[test]
    fn test_newlines() {
        assert_eq!(encode(&["Line 1\nLine 2", "normal"]), "\"Line 1\nLine 2\",normal");
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(encode(&["a", "", "c"]), "a,,c");
        assert_eq!(encode(&["", "", ""]), ",,");
    }

    #[test]
    fn test_multi_char_marker_is_quoted() {
        let encoder = TextEncoder::new(';', Some('\''), "<br>");
        let mut buffer = String::new();
        encoder.encode_rows(&[vec!["a<br>b", "c"], vec!["d", "e"]], &mut buffer);
        assert_eq!(buffer, "'a<br>b';c<br>d;e");
    }

    #[test]
    fn test_unquoted_format_writes_raw() {
        let encoder = TextEncoder::new(',', None, "\n");
        let mut buffer = String::new();
        encoder.encode_row(&["a\"b", "c"], &mut buffer);
        assert_eq!(buffer, "a\"b,c");
    }
}
