use crate::model::{ImportWarning, ParsedBookmark, ParsedFolder, ParsedImport};
use ratatui::widgets::ListState;

#[derive(PartialEq, Clone, Copy)]
pub enum Focus {
    Sidebar,
    Main,
}

/// One line of the folder sidebar. `route` indexes into `folders`/`children`;
/// an empty route is the root container.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderRow {
    pub label: String,
    pub depth: usize,
    pub bookmark_count: usize,
    pub route: Vec<usize>,
}

pub struct AppState {
    pub source: String,
    pub import: Option<ParsedImport>,
    pub failure: Option<String>,
    pub folder_rows: Vec<FolderRow>,
    pub folder_state: ListState,
    pub list_state: ListState,
    pub active_focus: Focus,
    pub show_warnings: bool,
    pub message: String,
    pub loading: bool,
    pub saved: bool,
}

impl AppState {
    pub fn new(source: &str) -> Self {
        let mut f_state = ListState::default();
        f_state.select(Some(0));
        let mut l_state = ListState::default();
        l_state.select(Some(0));
        Self {
            source: source.to_string(),
            import: None,
            failure: None,
            folder_rows: vec![],
            folder_state: f_state,
            list_state: l_state,
            active_focus: Focus::Sidebar,
            show_warnings: false,
            message: format!("Parsing {}...", source),
            loading: true,
            saved: false,
        }
    }

    pub fn set_import(&mut self, import: ParsedImport) {
        let warnings = self.warnings_of(&import).len();
        self.message = if warnings == 0 {
            format!(
                "Import succeeded: {} folders, {} bookmarks",
                import.total_folders, import.total_bookmarks
            )
        } else {
            format!(
                "Import succeeded with caveats: {} warning(s). Press w to review.",
                warnings
            )
        };
        self.folder_rows = build_rows(&import);
        self.import = Some(import);
        self.failure = None;
        self.loading = false;
        self.folder_state.select(Some(0));
        self.list_state.select(Some(0));
    }

    pub fn set_failure(&mut self, error: String) {
        self.message = format!("Import failed: {}", error);
        self.failure = Some(error);
        self.import = None;
        self.folder_rows.clear();
        self.loading = false;
    }

    fn warnings_of<'a>(&self, import: &'a ParsedImport) -> &'a [ImportWarning] {
        match &import.analysis {
            Some(a) => &a.warnings,
            None => &import.warnings,
        }
    }

    pub fn warnings(&self) -> &[ImportWarning] {
        match &self.import {
            Some(import) => self.warnings_of(import),
            None => &[],
        }
    }

    pub fn selected_folder(&self) -> Option<&ParsedFolder> {
        let import = self.import.as_ref()?;
        let row = self.folder_rows.get(self.folder_state.selected()?)?;
        let (first, rest) = row.route.split_first()?;
        let mut folder = import.folders.get(*first)?;
        for idx in rest {
            folder = folder.children.get(*idx)?;
        }
        Some(folder)
    }

    /// Bookmarks shown in the main pane for the selected sidebar row.
    pub fn visible_bookmarks(&self) -> &[ParsedBookmark] {
        let Some(import) = &self.import else {
            return &[];
        };
        let Some(row) = self
            .folder_state
            .selected()
            .and_then(|i| self.folder_rows.get(i))
        else {
            return &[];
        };
        if row.route.is_empty() {
            return &import.bookmarks;
        }
        self.selected_folder()
            .map(|f| f.bookmarks.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_bookmark(&self) -> Option<&ParsedBookmark> {
        self.visible_bookmarks().get(self.list_state.selected()?)
    }

    fn active_len(&self) -> usize {
        match self.active_focus {
            Focus::Sidebar => self.folder_rows.len(),
            Focus::Main => self.visible_bookmarks().len(),
        }
    }

    fn active_list(&mut self) -> &mut ListState {
        match self.active_focus {
            Focus::Sidebar => &mut self.folder_state,
            Focus::Main => &mut self.list_state,
        }
    }

    fn after_move(&mut self) {
        if self.active_focus == Focus::Sidebar {
            self.list_state.select(Some(0));
        }
    }

    pub fn next(&mut self) {
        let len = self.active_len();
        if len == 0 {
            return;
        }
        let state = self.active_list();
        let i = match state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        state.select(Some(i));
        self.after_move();
    }

    pub fn previous(&mut self) {
        let len = self.active_len();
        if len == 0 {
            return;
        }
        let state = self.active_list();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
        self.after_move();
    }

    pub fn jump_forward(&mut self, step: usize) {
        let len = self.active_len();
        if len == 0 {
            return;
        }
        let state = self.active_list();
        let current = state.selected().unwrap_or(0);
        state.select(Some((current + step).min(len - 1)));
        self.after_move();
    }

    pub fn jump_backward(&mut self, step: usize) {
        if self.active_len() == 0 {
            return;
        }
        let state = self.active_list();
        let current = state.selected().unwrap_or(0);
        state.select(Some(current.saturating_sub(step)));
        self.after_move();
    }

    pub fn toggle_focus(&mut self) {
        self.active_focus = match self.active_focus {
            Focus::Main => Focus::Sidebar,
            Focus::Sidebar => Focus::Main,
        }
    }

    pub fn toggle_warnings(&mut self) {
        self.show_warnings = !self.show_warnings;
    }
}

/// "(root)" first, then every folder in pre-order.
fn build_rows(import: &ParsedImport) -> Vec<FolderRow> {
    let mut rows = vec![FolderRow {
        label: "(root)".to_string(),
        depth: 0,
        bookmark_count: import.bookmarks.len(),
        route: vec![],
    }];

    let mut stack: Vec<(&ParsedFolder, Vec<usize>)> = import
        .folders
        .iter()
        .enumerate()
        .rev()
        .map(|(i, f)| (f, vec![i]))
        .collect();
    while let Some((folder, route)) = stack.pop() {
        for (i, child) in folder.children.iter().enumerate().rev() {
            let mut child_route = route.clone();
            child_route.push(i);
            stack.push((child, child_route));
        }
        rows.push(FolderRow {
            label: folder.name.clone(),
            depth: folder.depth + 1,
            bookmark_count: folder.bookmarks.len(),
            route,
        });
    }
    rows
}
