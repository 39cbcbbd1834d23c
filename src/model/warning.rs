// File: ./src/model/warning.rs
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Fatal import failure. Its `Display` is the error message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("The bookmark file is empty")]
    EmptyInput,

    #[error("No bookmarks or folders were found in the file (expected <A> or <H3> tags)")]
    NoBookmarkMarkup,

    #[error("Internal error while building the bookmark tree: {0}")]
    Internal(String),
}

/// Non-fatal anomaly found while importing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportWarning {
    #[error("Skipped a bookmark without an HREF attribute{}", title_suffix(.0))]
    MissingHref(Option<String>),

    #[error("Ignored invalid {attribute} value '{value}' on {context}")]
    InvalidDate {
        attribute: &'static str,
        value: String,
        context: String,
    },

    #[error("Folder without a name was imported as '{0}'")]
    EmptyFolderName(String),

    #[error("Ignored unmatched closing tag </{0}>")]
    UnmatchedClosingTag(String),

    #[error("Tag starting at byte {0} is never closed with '>'")]
    UnterminatedTag(usize),

    #[error("Anchor for {0} has no closing </A>")]
    UnclosedAnchor(String),

    #[error("Heading for folder '{0}' has no closing </H3>")]
    UnclosedHeading(String),

    #[error("Folder '{0}' has no <DL> list; imported as empty")]
    FolderWithoutList(String),

    #[error("Folder '{0}' was not closed before the end of the file")]
    ImplicitFolderClose(String),

    #[error("Folder '{0}' is empty")]
    EmptyFolder(String),

    #[error("URL {0} is bookmarked more than once")]
    DuplicateUrl(String),
}

fn title_suffix(title: &Option<String>) -> String {
    match title {
        Some(t) if !t.is_empty() => format!(" ('{}')", t),
        _ => String::new(),
    }
}

impl Serialize for ImportWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
