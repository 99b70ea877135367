//! Output formatting for CLI.

mod json;
mod text;

pub use json::{CheckOutput, ErrorOutput, JsonFormatter};
pub use text::TextFormatter;
