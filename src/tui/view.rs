use crate::tui::state::{AppState, Focus};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(v_chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(h_chunks[1]);

    // --- Sidebar ---
    let folder_items: Vec<ListItem> = state
        .folder_rows
        .iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);
            let style = if row.route.is_empty() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}{}", indent, row.label), style),
                Span::styled(
                    format!(" ({})", row.bookmark_count),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let sidebar_style = if state.active_focus == Focus::Sidebar {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let sidebar = List::new(folder_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Folders ")
                .border_style(sidebar_style),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::Blue),
        );
    f.render_stateful_widget(sidebar, h_chunks[0], &mut state.folder_state);

    // --- Bookmark List ---
    let bookmark_items: Vec<ListItem> = state
        .visible_bookmarks()
        .iter()
        .map(|b| {
            let date = match b.add_date {
                Some(d) => format!(" ({})", d.format("%Y-%m-%d")),
                None => "".to_string(),
            };
            ListItem::new(Line::from(vec![
                Span::styled(b.title.clone(), Style::default().fg(Color::White)),
                Span::styled(date, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let main_style = if state.active_focus == Focus::Main {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let title = if state.loading {
        " Bookmarks (Parsing...) ".to_string()
    } else {
        format!(" Bookmarks ({}) ", bookmark_items.len())
    };
    let bookmark_list = List::new(bookmark_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(main_style),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        );
    f.render_stateful_widget(bookmark_list, main_chunks[0], &mut state.list_state);

    // --- Details / Warnings Pane ---
    let (pane_title, pane_text, pane_color) = if let Some(err) = &state.failure {
        (" Import failed ", err.clone(), Color::Red)
    } else if state.show_warnings {
        let text = if state.warnings().is_empty() {
            "No warnings.".to_string()
        } else {
            state
                .warnings()
                .iter()
                .map(|w| format!("! {}", w))
                .collect::<Vec<_>>()
                .join("\n")
        };
        (" Warnings ", text, Color::Yellow)
    } else {
        let text = match state.selected_bookmark() {
            Some(b) => {
                let mut lines = vec![b.url.clone()];
                if let Some(icon) = &b.icon {
                    lines.push(format!("icon: {}", truncate(icon, 80)));
                }
                if let Some(folder) = state.selected_folder() {
                    lines.push(format!("in: {}", folder.path));
                }
                lines.join("\n")
            }
            None => "".to_string(),
        };
        (" Details ", text, Color::White)
    };

    let details = Paragraph::new(pane_text)
        .style(Style::default().fg(pane_color))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(pane_title));
    f.render_widget(details, main_chunks[1]);

    // --- Footer ---
    let f_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(v_chunks[1]);
    let status = Paragraph::new(state.message.clone())
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                .title(format!(" {} ", state.source)),
        );
    let help_text = if state.saved {
        "Tab:Focus | w:Warnings | q:Quit"
    } else {
        "Tab:Focus | w:Warnings | s:Save | q:Quit"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                .title(" Actions "),
        );
    f.render_widget(status, f_chunks[0]);
    f.render_widget(help, f_chunks[1]);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head)
    }
}
