// File: ./src/model/mod.rs
// Aggregates the split model files
pub mod item;
pub mod warning;

pub use item::{Analysis, Browser, ParsedBookmark, ParsedFolder, ParsedImport};
pub use warning::{ImportError, ImportWarning};

/// Outcome of a single `parse` call.
pub type BookmarkParseResult = Result<ParsedImport, ImportError>;
