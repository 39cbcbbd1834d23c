// File: ./src/tui/mod.rs
//! Terminal preview of a bookmark import.
pub mod action;
pub mod state;
pub mod view;

use crate::cli::read_markup;
use crate::config::Config;
use crate::importer::HtmlBookmarkParser;
use crate::storage::{ImportBatch, LocalStorage};
use crate::tui::action::{Action, AppEvent};
use crate::tui::state::AppState;
use crate::tui::view::draw;
use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

/// Preview a browser bookmark export before saving it
#[derive(Debug, Parser)]
#[command(name = "linkshelf-tui", version, about, long_about = None)]
struct TuiArgs {
    /// Bookmark HTML file exported from a browser
    file: PathBuf,

    /// Skip the statistics pass
    #[arg(long)]
    no_analyze: bool,
}

pub async fn run() -> Result<()> {
    let args = TuiArgs::parse();
    let config = Config::load()?;
    let source = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());

    // Panic Hook
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(&source);
    let (action_tx, mut action_rx) = mpsc::channel(10);
    let (event_tx, mut event_rx) = mpsc::channel(10);

    // SPAWN ACTOR
    let compute_analysis = config.compute_analysis && !args.no_analyze;
    let options = config.parse_options();
    let file = args.file.clone();
    let actor_source = source.clone();
    tokio::spawn(async move {
        let parsed = tokio::task::spawn_blocking(move || -> Result<_> {
            let markup = read_markup(&file)?;
            Ok(HtmlBookmarkParser::with_options(options).parse(&markup, compute_analysis))
        })
        .await;

        let result = match parsed {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                let _ = event_tx.send(AppEvent::Error(format!("{:#}", e))).await;
                return;
            }
            Err(e) => {
                let _ = event_tx.send(AppEvent::Error(e.to_string())).await;
                return;
            }
        };
        let import = result.as_ref().ok().cloned();
        let _ = event_tx.send(AppEvent::Parsed(Box::new(result))).await;

        while let Some(action) = action_rx.recv().await {
            match action {
                Action::Quit => break,
                Action::SaveImport => {
                    let Some(import) = &import else {
                        let _ = event_tx
                            .send(AppEvent::Error("Nothing to save.".to_string()))
                            .await;
                        continue;
                    };
                    let _ = event_tx
                        .send(AppEvent::Status("Saving...".to_string()))
                        .await;
                    let batch = ImportBatch::from_import(&actor_source, import);
                    let saved = tokio::task::spawn_blocking(move || {
                        LocalStorage::open()?.save_import(batch)
                    })
                    .await;
                    match saved {
                        Ok(Ok(id)) => {
                            let _ = event_tx.send(AppEvent::Saved(id)).await;
                        }
                        Ok(Err(e)) => {
                            let _ = event_tx
                                .send(AppEvent::Error(format!("Save failed: {:#}", e)))
                                .await;
                        }
                        Err(e) => {
                            let _ = event_tx
                                .send(AppEvent::Error(format!("Save failed: {}", e)))
                                .await;
                        }
                    }
                }
            }
        }
    });

    // UI Loop
    loop {
        terminal.draw(|f| draw(f, &mut app_state))?;

        while let Ok(event) = event_rx.try_recv() {
            match event {
                AppEvent::Parsed(result) => match *result {
                    Ok(import) => app_state.set_import(import),
                    Err(e) => app_state.set_failure(e.to_string()),
                },
                AppEvent::Saved(id) => {
                    app_state.saved = true;
                    app_state.message = format!("Saved as {}", id);
                }
                AppEvent::Error(msg) => {
                    if app_state.loading {
                        app_state.set_failure(msg);
                    } else {
                        app_state.message = format!("Error: {}", msg);
                    }
                }
                AppEvent::Status(msg) => {
                    app_state.message = msg;
                }
            }
        }

        if crossterm::event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Mouse(mouse_event) => match mouse_event.kind {
                    MouseEventKind::ScrollDown => app_state.next(),
                    MouseEventKind::ScrollUp => app_state.previous(),
                    _ => {}
                },
                Event::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        let _ = action_tx.send(Action::Quit).await;
                        break;
                    }
                    KeyCode::Down | KeyCode::Char('j') => app_state.next(),
                    KeyCode::Up | KeyCode::Char('k') => app_state.previous(),
                    KeyCode::PageDown => app_state.jump_forward(10),
                    KeyCode::PageUp => app_state.jump_backward(10),
                    KeyCode::Tab => app_state.toggle_focus(),
                    KeyCode::Char('w') => app_state.toggle_warnings(),
                    KeyCode::Char('s') => {
                        if app_state.import.is_some() && !app_state.saved {
                            let _ = action_tx.send(Action::SaveImport).await;
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
