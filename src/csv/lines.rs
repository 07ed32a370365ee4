//! Splitting raw text into logical lines

use crate::error::{LoadError, Result};
use crate::format::TextFormat;

/// Lazy iterator over the logical lines of a text
///
/// End-of-line markers inside a qualified span are data, not separators.
/// When the text ends on a marker, one empty final line is produced.
/// The iterator is `Clone`, so the same input can be scanned again from any point.
///
/// # Examples
///
/// ```
/// use sheetload::csv::LineSplitter;
///
/// let lines: Vec<&str> = LineSplitter::new("a\r\n\"b\r\nc\"\r\n", "\r\n", Some('"'))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(lines, vec!["a", "\"b\r\nc\"", ""]);
/// ```
#[derive(Debug, Clone)]
pub struct LineSplitter<'a> {
    text: &'a str,
    eol: &'a str,
    quote: Option<char>,
    // Byte offset where the next line starts
    start: usize,
    produced: usize,
    finished: bool,
}

impl<'a> LineSplitter<'a> {
    pub fn new(text: &'a str, eol: &'a str, quote: Option<char>) -> Self {
        LineSplitter {
            text,
            eol,
            quote,
            start: 0,
            produced: 0,
            finished: false,
        }
    }

    /// Splitter configured from a format descriptor
    pub fn with_format(text: &'a str, format: &'a TextFormat) -> Self {
        Self::new(text, &format.eol, format.quote)
    }

    /// Number of lines yielded so far
    pub fn produced(&self) -> usize {
        self.produced
    }

    fn emit(&mut self, line: &'a str) -> Option<Result<&'a str>> {
        self.produced += 1;
        Some(Ok(trim_cr_lf(line, self.eol)))
    }

    fn finish(&mut self) -> Option<Result<&'a str>> {
        self.finished = true;
        let rest = &self.text[self.start..];
        self.start = self.text.len();
        self.emit(rest)
    }

    fn next_literal(&mut self) -> Option<Result<&'a str>> {
        let rest = &self.text[self.start..];
        match rest.find(self.eol) {
            Some(pos) => {
                self.start += pos + self.eol.len();
                self.emit(&rest[..pos])
            }
            None => self.finish(),
        }
    }

    fn next_qualified(&mut self, quote: char) -> Option<Result<&'a str>> {
        let rest = &self.text[self.start..];
        let mut in_quote = false;

        for (pos, ch) in rest.char_indices() {
            if ch == quote {
                in_quote = !in_quote;
            } else if !in_quote && rest[pos..].starts_with(self.eol) {
                self.start += pos + self.eol.len();
                return self.emit(&rest[..pos]);
            }
        }

        if in_quote {
            self.finished = true;
            return Some(Err(LoadError::UnterminatedQualifier {
                line: self.produced + 1,
                text: None,
            }));
        }
        self.finish()
    }
}

impl<'a> Iterator for LineSplitter<'a> {
    type Item = Result<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.eol.is_empty() {
            return self.finish();
        }
        match self.quote {
            Some(quote) => self.next_qualified(quote),
            None => self.next_literal(),
        }
    }
}

/// Compensate for `\r\n` pairs when only one half was declared as the marker
fn trim_cr_lf<'a>(line: &'a str, eol: &str) -> &'a str {
    match eol {
        "\n" => line.strip_suffix('\r').unwrap_or(line),
        "\r" => line.strip_prefix('\n').unwrap_or(line),
        _ => line,
    }
}

/// Collect every logical line of `text`, failing on an open qualifier
pub fn split_lines<'a>(text: &'a str, format: &'a TextFormat) -> Result<Vec<&'a str>> {
    LineSplitter::with_format(text, format).collect()
}
