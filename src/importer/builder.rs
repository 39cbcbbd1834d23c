// File: ./src/importer/builder.rs
// Builds the folder tree from the token stream.
//
// Folders live in an arena and refer to each other by index. Each open <DL>
// is one stack entry; a heading's folder becomes the owner of the next <DL>.
// Exports leave <DT>/<p> unclosed, so only <DL>/</DL> decide nesting.
use crate::importer::ParseOptions;
use crate::importer::entities::decode;
use crate::importer::tokenizer::{Tag, Token};
use crate::model::{ImportError, ImportWarning, ParsedBookmark, ParsedFolder};
use chrono::{DateTime, TimeZone, Utc};
use url::Url;

pub const UNTITLED_FOLDER: &str = "Untitled folder";

type FolderId = usize;

/// Tags that end a run of heading/anchor text even without the proper closing tag.
const STRUCTURAL: &[&str] = &["DT", "DL", "DD", "H3", "A"];

#[derive(Debug)]
struct FolderNode {
    name: String,
    path: String,
    depth: usize,
    add_date: Option<DateTime<Utc>>,
    last_modified: Option<DateTime<Utc>>,
    is_toolbar_folder: bool,
    bookmarks: Vec<ParsedBookmark>,
    children: Vec<FolderId>,
}

#[derive(Debug, Clone, Copy)]
struct OpenList {
    folder: Option<FolderId>,
    /// False for a stray <DL> that merely continues its enclosing container.
    owned: bool,
}

#[derive(Debug, Default)]
pub struct BuiltTree {
    pub folders: Vec<ParsedFolder>,
    pub bookmarks: Vec<ParsedBookmark>,
    pub total_folders: usize,
    pub total_bookmarks: usize,
    pub warnings: Vec<ImportWarning>,
}

pub struct TreeBuilder<'o> {
    options: &'o ParseOptions,
    arena: Vec<FolderNode>,
    roots: Vec<FolderId>,
    root_bookmarks: Vec<ParsedBookmark>,
    open_lists: Vec<OpenList>,
    pending: Option<FolderId>,
    warnings: Vec<ImportWarning>,
}

impl<'o> TreeBuilder<'o> {
    pub fn new(options: &'o ParseOptions) -> Self {
        Self {
            options,
            arena: Vec::new(),
            roots: Vec::new(),
            root_bookmarks: Vec::new(),
            open_lists: Vec::new(),
            pending: None,
            warnings: Vec::new(),
        }
    }

    pub fn build(mut self, tokens: &[Token<'_>]) -> Result<BuiltTree, ImportError> {
        let mut i = 0;
        while i < tokens.len() {
            i = match &tokens[i] {
                Token::Open(tag) if tag.is("H3") => self.heading(tag, tokens, i + 1)?,
                Token::Open(tag) if tag.is("A") => self.anchor(tag, tokens, i + 1)?,
                Token::Open(tag) if tag.is("DL") => {
                    self.open_list();
                    i + 1
                }
                Token::Close(name) if name == "DL" => {
                    self.close_list();
                    i + 1
                }
                Token::Close(name) if name == "H3" || name == "A" => {
                    self.warnings
                        .push(ImportWarning::UnmatchedClosingTag(name.clone()));
                    i + 1
                }
                _ => i + 1,
            };
        }
        self.finish()
    }

    /// Folder owning the innermost open list, `None` for the root container.
    fn current(&self) -> Option<FolderId> {
        self.open_lists.last().and_then(|l| l.folder)
    }

    fn node(&self, id: FolderId) -> Result<&FolderNode, ImportError> {
        self.arena
            .get(id)
            .ok_or_else(|| ImportError::Internal(format!("folder #{} is not in the arena", id)))
    }

    fn node_mut(&mut self, id: FolderId) -> Result<&mut FolderNode, ImportError> {
        self.arena
            .get_mut(id)
            .ok_or_else(|| ImportError::Internal(format!("folder #{} is not in the arena", id)))
    }

    /// A heading that never got its <DL> stays in the tree as an empty folder.
    fn drop_pending(&mut self) -> Result<(), ImportError> {
        if let Some(id) = self.pending.take() {
            let name = self.node(id)?.name.clone();
            self.warnings.push(ImportWarning::FolderWithoutList(name));
        }
        Ok(())
    }

    fn heading(
        &mut self,
        tag: &Tag<'_>,
        tokens: &[Token<'_>],
        from: usize,
    ) -> Result<usize, ImportError> {
        self.drop_pending()?;

        let (text, next, closed) = collect_text(tokens, from, "H3");
        let mut name = decode(&text).trim().to_string();
        if name.is_empty() {
            name = UNTITLED_FOLDER.to_string();
            self.warnings
                .push(ImportWarning::EmptyFolderName(name.clone()));
        }
        if !closed {
            self.warnings
                .push(ImportWarning::UnclosedHeading(name.clone()));
        }

        let context = format!("folder '{}'", name);
        let add_date = self.timestamp(tag, "ADD_DATE", &context);
        let last_modified = self.timestamp(tag, "LAST_MODIFIED", &context);
        let is_toolbar_folder = tag
            .attr("PERSONAL_TOOLBAR_FOLDER")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        let parent = self.current();
        let (path, depth) = match parent {
            Some(pid) => {
                let p = self.node(pid)?;
                (
                    format!("{}{}{}", p.path, self.options.path_separator, name),
                    p.depth + 1,
                )
            }
            None => (name.clone(), 0),
        };

        let id = self.arena.len();
        self.arena.push(FolderNode {
            name,
            path,
            depth,
            add_date,
            last_modified,
            is_toolbar_folder,
            bookmarks: Vec::new(),
            children: Vec::new(),
        });
        match parent {
            Some(pid) => self.node_mut(pid)?.children.push(id),
            None => self.roots.push(id),
        }
        self.pending = Some(id);

        Ok(next)
    }

    fn anchor(
        &mut self,
        tag: &Tag<'_>,
        tokens: &[Token<'_>],
        from: usize,
    ) -> Result<usize, ImportError> {
        self.drop_pending()?;

        let (text, next, closed) = collect_text(tokens, from, "A");
        let title = decode(&text).trim().to_string();
        let url = tag
            .attr("HREF")
            .map(|h| decode(h).trim().to_string())
            .filter(|h| !h.is_empty());

        let Some(url) = url else {
            let title = (!title.is_empty()).then_some(title);
            self.warnings.push(ImportWarning::MissingHref(title));
            return Ok(next);
        };
        if !closed {
            self.warnings
                .push(ImportWarning::UnclosedAnchor(url.clone()));
        }

        let title = if title.is_empty() { url.clone() } else { title };
        let add_date = self.timestamp(tag, "ADD_DATE", &format!("bookmark '{}'", title));
        let icon = tag
            .attr("ICON")
            .or_else(|| tag.attr("ICON_URI"))
            .map(|v| decode(v).trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| {
                if self.options.derive_favicons {
                    default_favicon(&url)
                } else {
                    None
                }
            });

        let bookmark = ParsedBookmark {
            title,
            url,
            add_date,
            icon,
        };
        match self.current() {
            Some(id) => self.node_mut(id)?.bookmarks.push(bookmark),
            None => self.root_bookmarks.push(bookmark),
        }

        Ok(next)
    }

    fn open_list(&mut self) {
        let list = match self.pending.take() {
            Some(id) => OpenList {
                folder: Some(id),
                owned: true,
            },
            None => OpenList {
                folder: self.current(),
                owned: false,
            },
        };
        self.open_lists.push(list);
    }

    fn close_list(&mut self) {
        if let Some(id) = self.pending.take()
            && let Some(node) = self.arena.get(id)
        {
            self.warnings
                .push(ImportWarning::FolderWithoutList(node.name.clone()));
        }
        if self.open_lists.pop().is_none() {
            self.warnings
                .push(ImportWarning::UnmatchedClosingTag("DL".to_string()));
        }
    }

    fn timestamp(
        &mut self,
        tag: &Tag<'_>,
        attribute: &'static str,
        context: &str,
    ) -> Option<DateTime<Utc>> {
        let raw = tag.attr(attribute)?;
        let parsed = raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|secs| *secs >= 0)
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
        if parsed.is_none() {
            self.warnings.push(ImportWarning::InvalidDate {
                attribute,
                value: raw.to_string(),
                context: context.to_string(),
            });
        }
        parsed
    }

    /// Closes whatever is still open and assembles the owned tree.
    fn finish(mut self) -> Result<BuiltTree, ImportError> {
        self.drop_pending()?;
        while let Some(list) = self.open_lists.pop() {
            if list.owned
                && let Some(id) = list.folder
            {
                let path = self.node(id)?.path.clone();
                self.warnings.push(ImportWarning::ImplicitFolderClose(path));
            }
        }

        let total_folders = self.arena.len();
        let total_bookmarks = self.root_bookmarks.len()
            + self.arena.iter().map(|n| n.bookmarks.len()).sum::<usize>();

        // Children always have a larger id than their parent, so assembling in
        // reverse id order sees every child before its parent.
        let mut built: Vec<Option<ParsedFolder>> = Vec::with_capacity(total_folders);
        built.resize_with(total_folders, || None);
        for (id, node) in self.arena.into_iter().enumerate().rev() {
            let mut children = Vec::with_capacity(node.children.len());
            for child in node.children {
                if child <= id {
                    return Err(ImportError::Internal(format!(
                        "folder #{} lists #{} as a child",
                        id, child
                    )));
                }
                let folder = built
                    .get_mut(child)
                    .and_then(Option::take)
                    .ok_or_else(|| {
                        ImportError::Internal(format!("folder #{} has two parents", child))
                    })?;
                children.push(folder);
            }
            built[id] = Some(ParsedFolder {
                name: node.name,
                path: node.path,
                depth: node.depth,
                add_date: node.add_date,
                last_modified: node.last_modified,
                is_toolbar_folder: node.is_toolbar_folder,
                bookmarks: node.bookmarks,
                children,
            });
        }

        let folders = self
            .roots
            .iter()
            .map(|&id| {
                built
                    .get_mut(id)
                    .and_then(Option::take)
                    .ok_or_else(|| ImportError::Internal(format!("root folder #{} is missing", id)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BuiltTree {
            folders,
            bookmarks: self.root_bookmarks,
            total_folders,
            total_bookmarks,
            warnings: self.warnings,
        })
    }
}

/// Concatenated text up to the closing `close` tag.
/// Returns the text, the index to resume at, and whether the closing tag was found.
fn collect_text(tokens: &[Token<'_>], from: usize, close: &str) -> (String, usize, bool) {
    let mut text = String::new();
    for (j, token) in tokens.iter().enumerate().skip(from) {
        match token {
            Token::Text(s) => text.push_str(s),
            Token::Close(name) if name == close => return (text, j + 1, true),
            Token::Close(name) if STRUCTURAL.contains(&name.as_str()) => {
                return (text, j, false);
            }
            Token::Open(tag) if STRUCTURAL.contains(&tag.name.as_str()) => {
                return (text, j, false);
            }
            _ => {}
        }
    }
    (text, tokens.len(), false)
}

fn default_favicon(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }
    Some(format!("{}/favicon.ico", parsed.origin().ascii_serialization()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::tokenizer::tokenize;

    fn build(markup: &str) -> BuiltTree {
        let options = ParseOptions::default();
        let stream = tokenize(markup);
        TreeBuilder::new(&options)
            .build(&stream.tokens)
            .expect("build should succeed")
    }

    #[test]
    fn test_heading_without_list_is_empty_folder() {
        let tree = build("<DL><DT><H3>Lonely</H3><DT><A HREF=\"https://a.io\">a</A></DL>");
        assert_eq!(tree.total_folders, 1);
        assert!(tree.folders[0].bookmarks.is_empty());
        assert_eq!(tree.bookmarks.len(), 1);
        assert_eq!(
            tree.warnings,
            vec![ImportWarning::FolderWithoutList("Lonely".into())]
        );
    }

    #[test]
    fn test_stray_list_continues_enclosing_folder() {
        let tree = build(
            "<DL><DT><H3>F</H3><DL><DL><DT><A HREF=\"https://a.io\">a</A></DL><DT><A HREF=\"https://b.io\">b</A></DL></DL>",
        );
        assert_eq!(tree.folders[0].bookmarks.len(), 2);
        assert!(tree.warnings.is_empty());
    }

    #[test]
    fn test_extra_closing_list_warns() {
        let tree = build("<DT><A HREF=\"https://a.io\">a</A></DL>");
        assert_eq!(tree.total_bookmarks, 1);
        assert_eq!(
            tree.warnings,
            vec![ImportWarning::UnmatchedClosingTag("DL".into())]
        );
    }

    #[test]
    fn test_empty_folder_name_gets_placeholder() {
        let tree = build("<DT><H3>  </H3><DL></DL>");
        assert_eq!(tree.folders[0].name, UNTITLED_FOLDER);
        assert_eq!(
            tree.warnings,
            vec![ImportWarning::EmptyFolderName(UNTITLED_FOLDER.into())]
        );
    }

    #[test]
    fn test_unclosed_anchor_text_stops_at_next_entry() {
        let tree = build("<DL><DT><A HREF=\"https://a.io\">First<DT><A HREF=\"https://b.io\">Second</A></DL>");
        assert_eq!(tree.bookmarks[0].title, "First");
        assert_eq!(tree.bookmarks[1].title, "Second");
        assert_eq!(
            tree.warnings,
            vec![ImportWarning::UnclosedAnchor("https://a.io".into())]
        );
    }

    #[test]
    fn test_unclosed_heading_warns_and_keeps_folder() {
        let tree = build(
            "<DL><p><DT><H3 ADD_DATE=\"1\">Work<DL><p><DT><A HREF=\"https://a.io\">a</A></DL></DL>",
        );
        assert_eq!(tree.folders[0].name, "Work");
        assert_eq!(tree.folders[0].bookmarks.len(), 1);
        assert_eq!(
            tree.warnings,
            vec![ImportWarning::UnclosedHeading("Work".into())]
        );
    }

    #[test]
    fn test_inline_markup_inside_title_is_kept_as_text() {
        let tree = build("<DT><A HREF=\"https://a.io\">Hello <B>bold</B> world</A>");
        assert_eq!(tree.bookmarks[0].title, "Hello bold world");
    }

    #[test]
    fn test_icon_attribute_beats_derived_favicon() {
        let tree = build(
            "<DT><A HREF=\"https://a.io/x\" ICON=\"data:image/png;base64,AAAA\">a</A>\
             <DT><A HREF=\"https://b.io:8443/y\">b</A>\
             <DT><A HREF=\"javascript:void(0)\">c</A>",
        );
        assert_eq!(tree.bookmarks[0].icon.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(tree.bookmarks[1].icon.as_deref(), Some("https://b.io:8443/favicon.ico"));
        assert_eq!(tree.bookmarks[2].icon, None);
    }

    #[test]
    fn test_derived_favicon_can_be_disabled() {
        let options = ParseOptions {
            derive_favicons: false,
            ..ParseOptions::default()
        };
        let stream = tokenize("<DT><A HREF=\"https://a.io\">a</A>");
        let tree = TreeBuilder::new(&options).build(&stream.tokens).unwrap();
        assert_eq!(tree.bookmarks[0].icon, None);
    }

    #[test]
    fn test_dates_are_epoch_seconds() {
        let tree = build(
            "<DT><H3 ADD_DATE=\"1609459200\" LAST_MODIFIED=\"abc\">F</H3><DL>\
             <DT><A HREF=\"https://a.io\" ADD_DATE=\"-1\">a</A></DL>",
        );
        let folder = &tree.folders[0];
        assert_eq!(folder.add_date.map(|d| d.timestamp()), Some(1_609_459_200));
        assert_eq!(folder.last_modified, None);
        assert_eq!(folder.bookmarks[0].add_date, None);
        assert_eq!(tree.warnings.len(), 2);
        assert!(matches!(
            &tree.warnings[0],
            ImportWarning::InvalidDate { attribute: "LAST_MODIFIED", value, .. } if value == "abc"
        ));
    }
}
