//! Output formatters for Markdown and JSON.

mod json;
mod markdown;

pub use self::json::*;
pub use markdown::*;
