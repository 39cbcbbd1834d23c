// File: ./src/records.rs
// Flattens a parsed tree into the ordered record list a persistence layer consumes
use crate::model::{ParsedBookmark, ParsedFolder, ParsedImport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImportRecord {
    Folder(FolderRecord),
    Bookmark(BookmarkRecord),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FolderRecord {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub parent_path: Option<String>,
    pub name: String,
    pub path: String,
    pub depth: usize,
    /// Position among the parent's child folders.
    pub position: usize,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub add_date: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub last_modified: Option<DateTime<Utc>>,
    pub is_toolbar_folder: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BookmarkRecord {
    pub id: Uuid,
    /// `None` for bookmarks that sit at the root of the export.
    pub folder_id: Option<Uuid>,
    pub folder_path: Option<String>,
    /// Position among the folder's bookmarks.
    pub position: usize,
    pub title: String,
    pub url: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub add_date: Option<DateTime<Utc>>,
    pub icon: Option<String>,
}

impl ImportRecord {
    pub fn id(&self) -> Uuid {
        match self {
            ImportRecord::Folder(f) => f.id,
            ImportRecord::Bookmark(b) => b.id,
        }
    }
}

/// Pre-order: root bookmarks first, then each folder followed by its own
/// bookmarks and then its sub-folders. Parents always precede children.
pub fn flatten(import: &ParsedImport) -> Vec<ImportRecord> {
    let mut records = Vec::with_capacity(import.total_folders + import.total_bookmarks);
    push_bookmarks(&mut records, &import.bookmarks, None);

    // (folder, parent id, position among siblings)
    let mut stack: Vec<(&ParsedFolder, Option<(Uuid, &str)>, usize)> = import
        .folders
        .iter()
        .enumerate()
        .rev()
        .map(|(pos, f)| (f, None, pos))
        .collect();

    while let Some((folder, parent, position)) = stack.pop() {
        let id = Uuid::new_v4();
        records.push(ImportRecord::Folder(FolderRecord {
            id,
            parent_id: parent.map(|(pid, _)| pid),
            parent_path: parent.map(|(_, path)| path.to_string()),
            name: folder.name.clone(),
            path: folder.path.clone(),
            depth: folder.depth,
            position,
            add_date: folder.add_date,
            last_modified: folder.last_modified,
            is_toolbar_folder: folder.is_toolbar_folder,
        }));
        push_bookmarks(&mut records, &folder.bookmarks, Some((id, &folder.path)));
        stack.extend(
            folder
                .children
                .iter()
                .enumerate()
                .rev()
                .map(|(pos, child)| (child, Some((id, folder.path.as_str())), pos)),
        );
    }

    records
}

fn push_bookmarks(
    records: &mut Vec<ImportRecord>,
    bookmarks: &[ParsedBookmark],
    folder: Option<(Uuid, &str)>,
) {
    records.extend(bookmarks.iter().enumerate().map(|(position, b)| {
        ImportRecord::Bookmark(BookmarkRecord {
            id: Uuid::new_v4(),
            folder_id: folder.map(|(id, _)| id),
            folder_path: folder.map(|(_, path)| path.to_string()),
            position,
            title: b.title.clone(),
            url: b.url.clone(),
            add_date: b.add_date,
            icon: b.icon.clone(),
        })
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::parse;

    const NESTED: &str = r#"<DL><p>
<DT><A HREF="https://root.example">Root</A>
<DT><H3>Work</H3>
<DL><p>
    <DT><A HREF="https://a.example">A</A>
    <DT><H3>Deep</H3>
    <DL><p>
        <DT><A HREF="https://b.example">B</A>
    </DL><p>
    <DT><A HREF="https://c.example">C</A>
</DL><p>
</DL>"#;

    #[test]
    fn test_flatten_orders_parents_first() {
        let import = parse(NESTED, false).unwrap();
        let records = flatten(&import);
        assert_eq!(records.len(), 6);

        let labels: Vec<String> = records
            .iter()
            .map(|r| match r {
                ImportRecord::Folder(f) => format!("F:{}", f.path),
                ImportRecord::Bookmark(b) => format!("B:{}", b.title),
            })
            .collect();
        assert_eq!(labels, vec!["B:Root", "F:Work", "B:A", "B:C", "F:Work/Deep", "B:B"]);
    }

    #[test]
    fn test_flatten_links_parents() {
        let import = parse(NESTED, false).unwrap();
        let records = flatten(&import);

        let ImportRecord::Folder(work) = &records[1] else {
            panic!("expected folder");
        };
        let ImportRecord::Folder(deep) = &records[4] else {
            panic!("expected folder");
        };
        let ImportRecord::Bookmark(b) = &records[5] else {
            panic!("expected bookmark");
        };
        assert_eq!(work.parent_id, None);
        assert_eq!(deep.parent_id, Some(work.id));
        assert_eq!(deep.parent_path.as_deref(), Some("Work"));
        assert_eq!(b.folder_id, Some(deep.id));
        assert_eq!(b.folder_path.as_deref(), Some("Work/Deep"));

        let ImportRecord::Bookmark(c) = &records[3] else {
            panic!("expected bookmark");
        };
        assert_eq!(c.position, 1);
    }
}
