//! Error types for text loading

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors produced while splitting, tokenizing, converting or storing text data
#[derive(Error, Debug)]
pub enum LoadError {
    /// A text qualifier was opened but never closed.
    ///
    /// `line` is the 1-based logical line. The line-splitting pass has no
    /// complete line to show, so `text` is `None` there.
    #[error("Text qualifier is not closed in line {line}{}", fmt_text(.text))]
    UnterminatedQualifier { line: usize, text: Option<String> },

    /// A qualifier appeared after unqualified text had already been read
    #[error("Invalid text qualifier placement in line {line}: {text}")]
    MisplacedQualifier { line: usize, text: String },

    /// A converter rejected a token
    #[error("Bad value {value:?} in column {column}: {reason}")]
    BadValue {
        column: usize,
        value: String,
        reason: String,
    },

    /// The format descriptor is not usable
    #[error("Invalid text format: {0}")]
    InvalidFormat(String),

    #[error("Read error: {0}")]
    ReadError(String),

    #[error("Write error: {0}")]
    WriteError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_text(text: &Option<String>) -> String {
    match text {
        Some(t) => format!(": {}", t),
        None => String::new(),
    }
}

impl LoadError {
    /// 1-based logical line the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::UnterminatedQualifier { line, .. }
            | LoadError::MisplacedQualifier { line, .. } => Some(*line),
            _ => None,
        }
    }
}
