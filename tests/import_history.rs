use linkshelf::importer::parse;
use linkshelf::records::ImportRecord;
use linkshelf::storage::{ImportBatch, LocalStorage};
use std::fs;

const EXPORT: &str = r#"<DL><p>
<DT><H3 ADD_DATE="1650000000">Reading</H3>
<DL><p>
    <DT><A HREF="https://blog.example/post" ADD_DATE="1650000001">Post</A>
    <DT><H3>Later</H3>
    <DL><p>
        <DT><A HREF="https://news.example">News</A>
    </DL><p>
</DL><p>
<DT><A HREF="https://loose.example">Loose</A>
</DL>"#;

#[test]
fn test_save_and_reload_import() {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::at(dir.path()).unwrap();
    assert!(storage.load_imports().unwrap().is_empty());

    let import = parse(EXPORT, false).unwrap();
    let batch = ImportBatch::from_import("bookmarks.html", &import);
    let id = storage.save_import(batch.clone()).unwrap();
    assert_eq!(id, batch.id);

    let loaded = storage.load_imports().unwrap();
    assert_eq!(loaded, vec![batch]);

    let stored = &loaded[0];
    assert_eq!(stored.total_folders, 2);
    assert_eq!(stored.total_bookmarks, 3);
    assert_eq!(stored.records.len(), 5);

    let folder_paths: Vec<&str> = stored
        .records
        .iter()
        .filter_map(|r| match r {
            ImportRecord::Folder(f) => Some(f.path.as_str()),
            ImportRecord::Bookmark(_) => None,
        })
        .collect();
    assert_eq!(folder_paths, vec!["Reading", "Reading/Later"]);
}

#[test]
fn test_history_appends_and_clears() {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::at(dir.path()).unwrap();
    let import = parse(EXPORT, true).unwrap();

    storage
        .save_import(ImportBatch::from_import("first.html", &import))
        .unwrap();
    storage
        .save_import(ImportBatch::from_import("second.html", &import))
        .unwrap();

    let sources: Vec<String> = storage
        .load_imports()
        .unwrap()
        .into_iter()
        .map(|b| b.source)
        .collect();
    assert_eq!(sources, vec!["first.html", "second.html"]);
    assert!(!storage.imports_path().with_extension("tmp").exists());

    storage.clear().unwrap();
    assert!(storage.load_imports().unwrap().is_empty());
}

#[test]
fn test_corrupt_history_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::at(dir.path()).unwrap();
    fs::write(storage.imports_path(), "{ not json").unwrap();
    assert!(storage.load_imports().unwrap().is_empty());

    let import = parse(EXPORT, false).unwrap();
    storage
        .save_import(ImportBatch::from_import("fresh.html", &import))
        .unwrap();
    assert_eq!(storage.load_imports().unwrap().len(), 1);
}

#[test]
fn test_corrupt_history_is_kept_aside_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::at(dir.path()).unwrap();
    fs::write(storage.imports_path(), "{ not json").unwrap();

    let import = parse(EXPORT, false).unwrap();
    storage
        .save_import(ImportBatch::from_import("fresh.html", &import))
        .unwrap();

    assert_eq!(
        fs::read_to_string(storage.backup_path()).unwrap(),
        "{ not json"
    );
    let sources: Vec<String> = storage
        .load_imports()
        .unwrap()
        .into_iter()
        .map(|b| b.source)
        .collect();
    assert_eq!(sources, vec!["fresh.html"]);
}
