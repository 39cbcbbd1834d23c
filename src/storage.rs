// File: ./src/storage.rs
// Local history of imports, stored as JSON in the data directory
use crate::model::{Browser, ParsedImport};
use crate::records::{ImportRecord, flatten};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use fs2::FileExt;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DATA_DIR_ENV: &str = "LINKSHELF_DATA_DIR";
const IMPORTS_FILE: &str = "imports.json";

/// One stored import, ready to be replayed into a bookmark store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImportBatch {
    pub id: Uuid,
    pub imported_at: DateTime<Utc>,
    /// Where the markup came from, usually the file name.
    pub source: String,
    pub browser: Browser,
    pub total_folders: usize,
    pub total_bookmarks: usize,
    pub records: Vec<ImportRecord>,
}

impl ImportBatch {
    pub fn from_import(source: &str, import: &ParsedImport) -> Self {
        Self {
            id: Uuid::new_v4(),
            imported_at: import.parse_date,
            source: source.to_string(),
            browser: import.browser,
            total_folders: import.total_folders,
            total_bookmarks: import.total_bookmarks,
            records: flatten(import),
        }
    }
}

pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    /// Storage in `$LINKSHELF_DATA_DIR`, or the platform data directory.
    pub fn open() -> Result<Self> {
        if let Ok(dir) = env::var(DATA_DIR_ENV)
            && !dir.is_empty()
        {
            return Self::at(dir);
        }
        let proj = ProjectDirs::from("org", "linkshelf", "linkshelf")
            .context("Could not determine a data directory for this platform")?;
        Self::at(proj.data_dir())
    }

    pub fn at<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Could not create {}", dir.display()))?;
        }
        Ok(Self { dir })
    }

    pub fn imports_path(&self) -> PathBuf {
        self.dir.join(IMPORTS_FILE)
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Runs `f` while holding an exclusive lock on `<path>.lock`.
    pub fn with_lock<T, F>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Could not open lock file {}", lock_path.display()))?;
        FileExt::lock_exclusive(&lock_file)?;
        let result = f();
        let _ = FileExt::unlock(&lock_file);
        result
    }

    /// Where an unreadable history is moved before it would be overwritten.
    pub fn backup_path(&self) -> PathBuf {
        self.imports_path().with_extension("json.bak")
    }

    fn read_internal(path: &Path) -> Result<Vec<ImportBatch>> {
        if !path.exists() {
            return Ok(vec![]);
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Could not parse {}", path.display()))
    }

    fn load_internal(path: &Path) -> Vec<ImportBatch> {
        Self::read_internal(path).unwrap_or_else(|e| {
            warn!("Ignoring unreadable import history: {:#}", e);
            vec![]
        })
    }

    /// Appends a batch to the history. Returns the stored batch id.
    /// An unreadable history file is kept aside as `imports.json.bak` and a new one is started.
    pub fn save_import(&self, batch: ImportBatch) -> Result<Uuid> {
        let path = self.imports_path();
        let backup = self.backup_path();
        let id = batch.id;
        let records = batch.records.len();
        Self::with_lock(&path, || {
            let mut batches = match Self::read_internal(&path) {
                Ok(batches) => batches,
                Err(e) => {
                    warn!("{:#}; moving it to {}", e, backup.display());
                    fs::rename(&path, &backup).with_context(|| {
                        format!("Could not move {} aside", path.display())
                    })?;
                    vec![]
                }
            };
            batches.push(batch);
            let json = serde_json::to_string_pretty(&batches)?;
            Self::atomic_write(&path, json)?;
            Ok(())
        })?;
        info!("Saved import {} ({} records) to {}", id, records, path.display());
        Ok(id)
    }

    /// A missing or corrupt file loads as an empty history.
    pub fn load_imports(&self) -> Result<Vec<ImportBatch>> {
        let path = self.imports_path();
        if !path.exists() {
            return Ok(vec![]);
        }
        Self::with_lock(&path, || Ok(Self::load_internal(&path)))
    }

    pub fn clear(&self) -> Result<()> {
        let path = self.imports_path();
        if !path.exists() {
            return Ok(());
        }
        Self::with_lock(&path, || {
            fs::remove_file(&path)?;
            Ok(())
        })
    }
}
