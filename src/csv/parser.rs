//! Field tokenizing with text-qualifier handling

use crate::error::{LoadError, Result};
use crate::format::TextFormat;

/// One decoded field of a logical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldToken {
    pub text: String,
    /// The field was wrapped in text qualifiers at least once
    pub qualified: bool,
}

impl FieldToken {
    pub fn new(text: impl Into<String>, qualified: bool) -> Self {
        FieldToken {
            text: text.into(),
            qualified,
        }
    }
}

/// Splits a logical line into fields
///
/// Doubled qualifiers inside a qualified span decode to one literal qualifier,
/// and delimiters inside a qualified span are data.
pub struct FieldTokenizer {
    delimiter: char,
    quote: Option<char>,
}

/// Accumulation state for the field being read
#[derive(Default)]
struct FieldState {
    text: String,
    // Consecutive qualifiers just seen
    run: usize,
    in_qualifier: bool,
    qualified: bool,
}

impl FieldState {
    /// Turn a pending qualifier run into literal qualifiers
    fn resolve_run(&mut self, quote: char) {
        let literal = if self.run > 1 && !self.text.is_empty() {
            self.run / 2
        } else if self.run > 2 && self.text.is_empty() {
            (self.run - 1) / 2
        } else {
            0
        };
        self.text.extend(std::iter::repeat(quote).take(literal));
    }

    fn take(&mut self) -> (String, bool) {
        let qualified = self.qualified;
        self.qualified = false;
        (std::mem::take(&mut self.text), qualified)
    }
}

impl FieldTokenizer {
    /// Create a tokenizer with custom delimiter and optional text qualifier
    pub fn new(delimiter: char, quote: Option<char>) -> Self {
        Self { delimiter, quote }
    }

    pub fn with_format(format: &TextFormat) -> Self {
        Self::new(format.delimiter, format.quote)
    }

    /// Parse a line into tokens
    ///
    /// `line_no` is the 1-based logical line, used in error reports.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetload::csv::{FieldToken, FieldTokenizer};
    ///
    /// let tokenizer = FieldTokenizer::new(',', Some('"'));
    /// let fields = tokenizer.parse_line(r#"a,"b""c",d"#, 1).unwrap();
    /// assert_eq!(fields[1], FieldToken::new("b\"c", true));
    /// ```
    pub fn parse_line(&self, line: &str, line_no: usize) -> Result<Vec<FieldToken>> {
        let mut fields = Vec::new();
        self.tokenize_with(line, line_no, |_, text, qualified| {
            fields.push(FieldToken { text, qualified });
            Ok(())
        })?;
        Ok(fields)
    }

    /// Stream the fields of a line to `on_field(column, text, qualified)`
    ///
    /// Always reports at least one field. Errors returned by `on_field` abort
    /// the scan and are passed through unchanged.
    pub fn tokenize_with<F>(&self, line: &str, line_no: usize, mut on_field: F) -> Result<usize>
    where
        F: FnMut(usize, String, bool) -> Result<()>,
    {
        let Some(quote) = self.quote else {
            let mut count = 0;
            for (column, text) in line.split(self.delimiter).enumerate() {
                on_field(column, text.to_string(), false)?;
                count += 1;
            }
            return Ok(count);
        };

        let unclosed = || LoadError::UnterminatedQualifier {
            line: line_no,
            text: Some(line.to_string()),
        };

        let mut state = FieldState::default();
        let mut column = 0;
        let mut line_quotes = 0usize;

        for ch in line.chars() {
            if ch == quote {
                if !state.qualified && !state.text.is_empty() {
                    return Err(LoadError::MisplacedQualifier {
                        line: line_no,
                        text: line.to_string(),
                    });
                }
                state.in_qualifier = !state.in_qualifier;
                state.run += 1;
                state.qualified = true;
                line_quotes += 1;
                continue;
            }

            state.resolve_run(quote);

            if state.in_qualifier {
                state.text.push(ch);
            } else if ch == self.delimiter {
                let (text, qualified) = state.take();
                on_field(column, text, qualified)?;
                column += 1;
            } else {
                if state.run % 2 == 1 {
                    return Err(unclosed());
                }
                state.text.push(ch);
            }
            state.run = 0;
        }

        state.resolve_run(quote);
        if line_quotes % 2 == 1 {
            return Err(unclosed());
        }
        let (text, qualified) = state.take();
        on_field(column, text, qualified)?;
        Ok(column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[FieldToken]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    fn quoted() -> FieldTokenizer {
        FieldTokenizer::new(',', Some('"'))
    }

    #[test]
    fn test_simple() {
        let tokens = quoted().parse_line("a,b,c", 1).unwrap();
        assert_eq!(texts(&tokens), vec!["a", "b", "c"]);
        assert!(tokens.iter().all(|t| !t.qualified));
    }

    #[test]
    fn test_quoted_delimiter() {
        let tokens = quoted().parse_line(r#"a,b,"c,d",e"#, 1).unwrap();
        assert_eq!(texts(&tokens), vec!["a", "b", "c,d", "e"]);
        let flags: Vec<bool> = tokens.iter().map(|t| t.qualified).collect();
        assert_eq!(flags, vec![false, false, true, false]);
    }

    #[test]
    fn test_escaped_quotes() {
        let tokens = quoted().parse_line(r#"a,"b""c",d"#, 1).unwrap();
        assert_eq!(texts(&tokens), vec!["a", "b\"c", "d"]);

        let tokens = quoted().parse_line(r#""Say ""Hello""",world"#, 1).unwrap();
        assert_eq!(texts(&tokens), vec![r#"Say "Hello""#, "world"]);
    }

    #[test]
    fn test_leading_escaped_quote() {
        let tokens = quoted().parse_line(r#""""x",y"#, 1).unwrap();
        assert_eq!(texts(&tokens), vec!["\"x", "y"]);
    }

    #[test]
    fn test_lone_escaped_quote_field() {
        let tokens = quoted().parse_line(r#"a,"""""#, 1).unwrap();
        assert_eq!(texts(&tokens), vec!["a", "\""]);
    }

    #[test]
    fn test_empty_fields() {
        let tokens = quoted().parse_line("a,,c", 1).unwrap();
        assert_eq!(texts(&tokens), vec!["a", "", "c"]);
        let tokens = quoted().parse_line(",,", 1).unwrap();
        assert_eq!(texts(&tokens), vec!["", "", ""]);
    }

    #[test]
    fn test_empty_line_is_one_field() {
        let tokens = quoted().parse_line("", 1).unwrap();
        assert_eq!(tokens, vec![FieldToken::new("", false)]);
    }

    #[test]
    fn test_quoted_empty() {
        let tokens = quoted().parse_line(r#""","""#, 1).unwrap();
        assert_eq!(tokens, vec![FieldToken::new("", true), FieldToken::new("", true)]);
    }

    #[test]
    fn test_quoted_with_newline() {
        let tokens = quoted().parse_line("\"Line 1\nLine 2\",normal", 1).unwrap();
        assert_eq!(texts(&tokens), vec!["Line 1\nLine 2", "normal"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let tokenizer = FieldTokenizer::new(';', Some('\''));
        let tokens = tokenizer.parse_line("a;'b;c';d", 1).unwrap();
        assert_eq!(texts(&tokens), vec!["a", "b;c", "d"]);
    }

    #[test]
    fn test_no_quote_keeps_quote_chars() {
        let tokenizer = FieldTokenizer::new(',', None);
        let tokens = tokenizer.parse_line(r#"a,"b,c""#, 1).unwrap();
        assert_eq!(texts(&tokens), vec!["a", "\"b", "c\""]);
    }

    #[test]
    fn test_odd_quote_count_fails() {
        let err = quoted().parse_line(r#"a,"b,c"#, 4).unwrap_err();
        match err {
            LoadError::UnterminatedQualifier { line, text } => {
                assert_eq!(line, 4);
                assert_eq!(text.as_deref(), Some(r#"a,"b,c"#));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_text_after_closing_quote_fails() {
        let err = quoted().parse_line(r#""ab"c,d"#, 2).unwrap_err();
        assert!(matches!(err, LoadError::UnterminatedQualifier { line: 2, .. }));
    }

    #[test]
    fn test_misplaced_quote() {
        let err = quoted().parse_line(r#"ab"c",d"#, 7).unwrap_err();
        assert!(matches!(err, LoadError::MisplacedQualifier { line: 7, .. }));
    }

    #[test]
    fn test_callback_error_propagates() {
        let err = quoted()
            .tokenize_with("a,b", 1, |column, value, _| {
                if column == 1 {
                    Err(LoadError::BadValue {
                        column,
                        value,
                        reason: "rejected".to_string(),
                    })
                } else {
                    Ok(())
                }
            })
            .unwrap_err();
        assert!(matches!(err, LoadError::BadValue { column: 1, .. }));
    }
}
