//! Delimited text codec: line splitting, field tokenizing and encoding

mod encoder;
mod lines;
mod parser;

pub use encoder::TextEncoder;
pub use lines::{split_lines, LineSplitter};
pub use parser::{FieldToken, FieldTokenizer};
