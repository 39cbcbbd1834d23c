// File: ./src/importer/browser.rs
// Best-effort guess of which browser produced an export
use crate::model::Browser;

/// Ordered from most to least specific; the first signature found wins.
const SIGNATURES: &[(Browser, &[&str])] = &[
    (
        Browser::Firefox,
        &["ICON_URI=", "LAST_CHARSET=", "SHORTCUTURL=", ">BOOKMARKS MENU<", ">MOZILLA FIREFOX<"],
    ),
    (
        Browser::Edge,
        &[">FAVORITES BAR<", ">즐겨찾기 모음<", ">FAVORITES<"],
    ),
    (Browser::Safari, &["<H3 FOLDED", ">BOOKMARKSBAR<", ">READING LIST<"]),
    (
        Browser::Chrome,
        &["PERSONAL_TOOLBAR_FOLDER=\"TRUE\"", ">BOOKMARKS BAR<", ">북마크바<", ">북마크 바<"],
    ),
];

/// Signatures are matched ASCII-case-insensitively against the raw markup.
pub fn detect(markup: &str) -> Browser {
    let haystack = markup.as_bytes();
    SIGNATURES
        .iter()
        .find(|(_, needles)| {
            needles
                .iter()
                .any(|n| contains_ignore_ascii_case(haystack, n.as_bytes()))
        })
        .map(|(browser, _)| *browser)
        .unwrap_or_default()
}

fn contains_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty()
        && haystack
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle))
}
