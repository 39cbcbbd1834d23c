// File: ./src/cli.rs
//! Command line front end for the importer.
use crate::config::Config;
use crate::importer::HtmlBookmarkParser;
use crate::model::{ImportError, ParsedFolder, ParsedImport};
use crate::storage::{ImportBatch, LocalStorage};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Import browser bookmark exports into a folder tree
#[derive(Debug, Parser)]
#[command(name = "linkshelf", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a bookmark export and report what it contains
    Import(ImportArgs),
    /// List previously saved imports
    History,
    /// Forget all saved imports
    ClearHistory,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Bookmark HTML file exported from a browser
    pub file: PathBuf,

    /// Compute depth and warning statistics
    #[arg(long, conflicts_with = "no_analyze")]
    pub analyze: bool,

    /// Skip the statistics pass
    #[arg(long)]
    pub no_analyze: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the folder tree
    #[arg(long)]
    pub tree: bool,

    /// Store the import in the local history
    #[arg(long)]
    pub save: bool,

    /// Separator used when joining folder paths
    #[arg(long)]
    pub separator: Option<String>,
}

impl Cli {
    pub fn execute(&self) -> Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        match &self.command {
            Commands::Import(args) => run_import(args, &config),
            Commands::History => run_history(),
            Commands::ClearHistory => {
                LocalStorage::open()?.clear()?;
                println!("Import history cleared.");
                Ok(())
            }
        }
    }
}

/// Reads an export as text, tolerating a BOM and stray invalid UTF-8.
pub fn read_markup(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Could not read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

fn run_import(args: &ImportArgs, config: &Config) -> Result<()> {
    let mut options = config.parse_options();
    if let Some(sep) = &args.separator {
        options.path_separator = sep.clone();
    }
    let compute_analysis = if args.analyze {
        true
    } else if args.no_analyze {
        false
    } else {
        config.compute_analysis
    };

    let markup = read_markup(&args.file)?;
    let import = match HtmlBookmarkParser::with_options(options).parse(&markup, compute_analysis) {
        Ok(import) => import,
        Err(e) => {
            if args.json {
                println!("{}", failure_json(&e));
            }
            bail!(render_failure(&e));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&import)?);
    } else {
        print!("{}", render_summary(&import));
        if args.tree {
            print!("{}", render_tree(&import));
        }
    }

    if args.save || config.save_imports {
        let source = args
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.file.display().to_string());
        let id = LocalStorage::open()?.save_import(ImportBatch::from_import(&source, &import))?;
        if !args.json {
            println!("Saved as {}", id);
        }
    }
    Ok(())
}

fn run_history() -> Result<()> {
    let batches = LocalStorage::open()?.load_imports()?;
    if batches.is_empty() {
        println!("No saved imports.");
        return Ok(());
    }
    for b in batches {
        println!(
            "{}  {}  {:<24} {:>5} folders {:>6} bookmarks  ({})",
            b.id,
            b.imported_at.format("%Y-%m-%d %H:%M"),
            b.source,
            b.total_folders,
            b.total_bookmarks,
            b.browser
        );
    }
    Ok(())
}

pub fn render_failure(e: &ImportError) -> String {
    format!("Import failed: {}", e)
}

fn failure_json(e: &ImportError) -> String {
    serde_json::json!({ "success": false, "error": e.to_string() }).to_string()
}

/// "Import succeeded", followed by the caveats when there are any.
pub fn render_summary(import: &ParsedImport) -> String {
    let mut out = String::new();
    let warnings = match &import.analysis {
        Some(a) => &a.warnings,
        None => &import.warnings,
    };

    if !import.has_caveats() {
        let _ = writeln!(out, "Import succeeded");
    } else {
        let _ = writeln!(out, "Import succeeded with {} warning(s)", warnings.len());
    }
    let _ = writeln!(out, "  Browser:   {}", import.browser);
    let _ = writeln!(out, "  Folders:   {}", import.total_folders);
    let _ = writeln!(out, "  Bookmarks: {}", import.total_bookmarks);
    if let Some(a) = &import.analysis {
        let _ = writeln!(out, "  Max depth: {}", a.max_depth);
        let _ = writeln!(out, "  Took:      {:.2} ms", a.processing_time_ms());
    }
    for w in warnings {
        let _ = writeln!(out, "  ! {}", w);
    }
    out
}

/// Indented outline of folders; counts include bookmarks in sub-folders.
pub fn render_tree(import: &ParsedImport) -> String {
    let mut out = String::new();
    for b in &import.bookmarks {
        let _ = writeln!(out, "- {} <{}>", b.title, b.url);
    }
    for folder in import.iter_folders() {
        let _ = writeln!(out, "{}", folder_line(folder));
    }
    out
}

fn folder_line(folder: &ParsedFolder) -> String {
    let toolbar = if folder.is_toolbar_folder { " [toolbar]" } else { "" };
    format!(
        "{}+ {}{} ({})",
        "  ".repeat(folder.depth),
        folder.name,
        toolbar,
        folder.bookmark_count()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::parse;

    const SAMPLE: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<DL><p>
<DT><H3 PERSONAL_TOOLBAR_FOLDER="true">Bar</H3>
<DL><p>
    <DT><A HREF="https://a.example">A</A>
    <DT><H3>Sub</H3>
    <DL><p>
        <DT><A>no link</A>
    </DL><p>
</DL><p>
</DL>"#;

    #[test]
    fn test_render_summary_with_caveats() {
        let import = parse(SAMPLE, true).unwrap();
        let summary = render_summary(&import);
        assert!(summary.starts_with("Import succeeded with 2 warning(s)"));
        assert!(summary.contains("Browser:   chrome"));
        assert!(summary.contains("Max depth: 1"));
        assert!(summary.contains("! Skipped a bookmark without an HREF attribute ('no link')"));
        assert!(summary.contains("! Folder 'Bar/Sub' is empty"));
    }

    #[test]
    fn test_render_tree_indents_by_depth() {
        let import = parse(SAMPLE, false).unwrap();
        assert_eq!(render_tree(&import), "+ Bar [toolbar] (1)\n  + Sub (0)\n");
    }

    #[test]
    fn test_render_failure() {
        let e = parse("", false).unwrap_err();
        assert_eq!(render_failure(&e), "Import failed: The bookmark file is empty");
        assert!(failure_json(&e).contains("\"success\":false"));
    }

    #[test]
    fn test_read_markup_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.html");
        fs::write(&path, "\u{feff}<DT><A HREF=\"x\">x</A>").unwrap();
        assert!(read_markup(&path).unwrap().starts_with("<DT>"));
    }

    #[test]
    fn test_cli_parses_import_flags() {
        let cli = Cli::try_parse_from(["linkshelf", "import", "b.html", "--no-analyze", "--tree"])
            .unwrap();
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert!(args.no_analyze && args.tree && !args.analyze);
        let both = Cli::try_parse_from(["linkshelf", "import", "b.html", "--analyze", "--no-analyze"]);
        assert!(both.is_err());
    }
}
