pub mod cli;
pub mod config;
pub mod importer;
pub mod model;
pub mod records;
pub mod storage;

#[cfg(feature = "tui")]
pub mod tui;

pub use importer::{HtmlBookmarkParser, ParseOptions, parse};
pub use model::{
    BookmarkParseResult, ImportError, ImportWarning, ParsedBookmark, ParsedFolder, ParsedImport,
};
