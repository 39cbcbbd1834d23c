// File: ./src/importer/mod.rs
//! Netscape bookmark file importer.
//!
//! Turns the HTML that Chrome, Firefox, Safari and Edge write when exporting
//! bookmarks into a [`ParsedImport`] tree. Parsing is a single synchronous
//! pass with no state kept between calls; the statistics walk in
//! [`analysis`] only runs when asked for.
pub mod analysis;
pub mod browser;
pub mod builder;
pub mod entities;
pub mod tokenizer;

use crate::importer::builder::TreeBuilder;
use crate::importer::tokenizer::{Token, tokenize};
use crate::model::{BookmarkParseResult, ImportError, ParsedImport};
use chrono::Utc;
use log::debug;
use std::time::Instant;

pub const DEFAULT_PATH_SEPARATOR: &str = "/";

/// Parse an export with the default options.
pub fn parse(markup: &str, compute_analysis: bool) -> BookmarkParseResult {
    HtmlBookmarkParser::new().parse(markup, compute_analysis)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Joins ancestor names into `ParsedFolder::path`.
    pub path_separator: String,
    /// Fill in `<origin>/favicon.ico` for http(s) bookmarks without an ICON attribute.
    pub derive_favicons: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
            derive_favicons: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HtmlBookmarkParser {
    options: ParseOptions,
}

impl HtmlBookmarkParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn parse(&self, markup: &str, compute_analysis: bool) -> BookmarkParseResult {
        let started = Instant::now();

        if markup.trim().is_empty() {
            return Err(ImportError::EmptyInput);
        }

        let stream = tokenize(markup);
        let recognizable = stream
            .tokens
            .iter()
            .any(|t| matches!(t, Token::Open(tag) if tag.is("A") || tag.is("H3")));
        if !recognizable {
            return Err(ImportError::NoBookmarkMarkup);
        }

        let mut tree = TreeBuilder::new(&self.options).build(&stream.tokens)?;
        let mut warnings = stream.warnings;
        warnings.append(&mut tree.warnings);
        for w in &warnings {
            debug!("Bookmark import: {}", w);
        }

        let mut import = ParsedImport {
            total_bookmarks: tree.total_bookmarks,
            total_folders: tree.total_folders,
            browser: browser::detect(markup),
            parse_date: Utc::now(),
            folders: tree.folders,
            bookmarks: tree.bookmarks,
            analysis: None,
            warnings,
        };

        if compute_analysis {
            import.analysis = Some(analysis::analyze(&import, started));
            import.parse_date = Utc::now();
        }

        debug!(
            "Parsed {} bookmarks in {} folders ({} export, {} warnings) in {:?}",
            import.total_bookmarks,
            import.total_folders,
            import.browser,
            import.warnings.len(),
            started.elapsed()
        );
        Ok(import)
    }
}
