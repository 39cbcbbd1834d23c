// File: ./src/model/item.rs
use crate::model::warning::ImportWarning;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One `<A>` entry of a bookmark export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedBookmark {
    pub title: String,
    pub url: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub add_date: Option<DateTime<Utc>>,
    pub icon: Option<String>,
}

/// One `<H3>` + `<DL>` pairing of a bookmark export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFolder {
    pub name: String,
    pub path: String,
    pub depth: usize,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub add_date: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub last_modified: Option<DateTime<Utc>>,
    pub is_toolbar_folder: bool,
    pub bookmarks: Vec<ParsedBookmark>,
    pub children: Vec<ParsedFolder>,
}

impl ParsedFolder {
    /// Bookmarks in this folder and every folder below it.
    pub fn bookmark_count(&self) -> usize {
        self.bookmarks.len()
            + self
                .children
                .iter()
                .map(ParsedFolder::bookmark_count)
                .sum::<usize>()
    }

    /// This folder plus all of its descendants.
    pub fn folder_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ParsedFolder::folder_count)
            .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty() && self.children.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    Edge,
    #[default]
    Unknown,
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Safari => "safari",
            Browser::Edge => "edge",
            Browser::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Statistics computed by the optional second walk over a finished tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub max_depth: usize,
    #[serde(rename = "processingTime", serialize_with = "serialize_millis")]
    pub processing_time: Duration,
    pub warnings: Vec<ImportWarning>,
}

impl Analysis {
    pub fn processing_time_ms(&self) -> f64 {
        self.processing_time.as_secs_f64() * 1000.0
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

/// Success payload of an import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedImport {
    pub total_bookmarks: usize,
    pub total_folders: usize,
    pub browser: Browser,
    pub parse_date: DateTime<Utc>,
    pub folders: Vec<ParsedFolder>,
    pub bookmarks: Vec<ParsedBookmark>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ImportWarning>,
}

impl ParsedImport {
    /// Pre-order walk over every folder in the tree.
    pub fn iter_folders(&self) -> FolderIter<'_> {
        FolderIter {
            stack: self.folders.iter().rev().collect(),
        }
    }

    pub fn find_folder(&self, path: &str) -> Option<&ParsedFolder> {
        self.iter_folders().find(|f| f.path == path)
    }

    /// True when there is something the user should be told about.
    pub fn has_caveats(&self) -> bool {
        !self.warnings.is_empty()
            || self
                .analysis
                .as_ref()
                .is_some_and(|a| !a.warnings.is_empty())
    }

    /// Tree equality ignoring wall-clock fields.
    pub fn same_tree(&self, other: &ParsedImport) -> bool {
        self.folders == other.folders && self.bookmarks == other.bookmarks
    }
}

pub struct FolderIter<'a> {
    stack: Vec<&'a ParsedFolder>,
}

impl<'a> Iterator for FolderIter<'a> {
    type Item = &'a ParsedFolder;

    fn next(&mut self) -> Option<Self::Item> {
        let folder = self.stack.pop()?;
        self.stack.extend(folder.children.iter().rev());
        Some(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(name: &str, depth: usize, children: Vec<ParsedFolder>) -> ParsedFolder {
        ParsedFolder {
            name: name.to_string(),
            path: name.to_string(),
            depth,
            add_date: None,
            last_modified: None,
            is_toolbar_folder: false,
            bookmarks: vec![],
            children,
        }
    }

    #[test]
    fn test_iter_folders_is_preorder() {
        let tree = folder(
            "a",
            0,
            vec![folder("b", 1, vec![folder("c", 2, vec![])]), folder("d", 1, vec![])],
        );
        let import = ParsedImport {
            total_bookmarks: 0,
            total_folders: 4,
            browser: Browser::Unknown,
            parse_date: Utc::now(),
            folders: vec![tree, folder("e", 0, vec![])],
            bookmarks: vec![],
            analysis: None,
            warnings: vec![],
        };
        let names: Vec<&str> = import.iter_folders().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(import.folders[0].folder_count(), 4);
    }

    #[test]
    fn test_browser_label() {
        assert_eq!(Browser::Chrome.to_string(), "chrome");
        assert_eq!(Browser::default().to_string(), "unknown");
    }
}
