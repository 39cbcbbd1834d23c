// File: ./src/importer/analysis.rs
// Optional statistics pass over an already-built tree
use crate::model::{Analysis, ImportWarning, ParsedImport};
use std::collections::HashSet;
use std::time::Instant;

/// Walks the finished tree once. `started` is when the whole parse began, so
/// the reported time covers tokenizing, building and this walk.
pub fn analyze(import: &ParsedImport, started: Instant) -> Analysis {
    let mut findings = Vec::new();

    let mut seen_urls: HashSet<&str> = HashSet::new();
    let mut reported: HashSet<&str> = HashSet::new();
    let all_bookmarks = import
        .bookmarks
        .iter()
        .chain(import.iter_folders().flat_map(|f| f.bookmarks.iter()));
    for bookmark in all_bookmarks {
        let url = bookmark.url.as_str();
        if !seen_urls.insert(url) && reported.insert(url) {
            findings.push(ImportWarning::DuplicateUrl(url.to_string()));
        }
    }

    let mut max_depth = 0;
    for folder in import.iter_folders() {
        max_depth = max_depth.max(folder.depth);
        if folder.is_empty() {
            findings.push(ImportWarning::EmptyFolder(folder.path.clone()));
        }
    }

    let mut warnings = import.warnings.clone();
    warnings.extend(findings);

    Analysis {
        max_depth,
        processing_time: started.elapsed(),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Browser, ParsedBookmark, ParsedFolder};
    use chrono::Utc;

    fn bookmark(url: &str) -> ParsedBookmark {
        ParsedBookmark {
            title: url.to_string(),
            url: url.to_string(),
            add_date: None,
            icon: None,
        }
    }

    fn folder(
        path: &str,
        depth: usize,
        bookmarks: Vec<ParsedBookmark>,
        children: Vec<ParsedFolder>,
    ) -> ParsedFolder {
        ParsedFolder {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            depth,
            add_date: None,
            last_modified: None,
            is_toolbar_folder: false,
            bookmarks,
            children,
        }
    }

    fn import(folders: Vec<ParsedFolder>, bookmarks: Vec<ParsedBookmark>) -> ParsedImport {
        ParsedImport {
            total_bookmarks: 0,
            total_folders: 0,
            browser: Browser::Unknown,
            parse_date: Utc::now(),
            folders,
            bookmarks,
            analysis: None,
            warnings: vec![ImportWarning::MissingHref(None)],
        }
    }

    #[test]
    fn test_max_depth_and_findings() {
        let tree = folder(
            "a",
            0,
            vec![bookmark("https://x.io")],
            vec![folder(
                "a/b",
                1,
                vec![bookmark("https://x.io"), bookmark("https://x.io")],
                vec![folder("a/b/c", 2, vec![], vec![])],
            )],
        );
        let result = analyze(&import(vec![tree], vec![]), Instant::now());
        assert_eq!(result.max_depth, 2);
        assert_eq!(
            result.warnings,
            vec![
                ImportWarning::MissingHref(None),
                ImportWarning::DuplicateUrl("https://x.io".into()),
                ImportWarning::EmptyFolder("a/b/c".into()),
            ]
        );
    }

    #[test]
    fn test_no_folders_means_depth_zero() {
        let result = analyze(&import(vec![], vec![bookmark("https://y.io")]), Instant::now());
        assert_eq!(result.max_depth, 0);
        assert_eq!(result.warnings.len(), 1);
    }
}
