//! Taskpad TUI
//!
//! Terminal user interface for the task list.
//!
//! ## Layout
//!
//! - Header with the sync indicator
//! - Error banner (only while an error is showing)
//! - New task input
//! - Task list (newest first)
//! - Stats: total, completed, pending
//!
//! ## Keys
//!
//! - j/k or ↑/↓: Move selection
//! - a: Add task (Enter submits, Esc leaves the input)
//! - space/x/Enter: Toggle done on the selected task
//! - r: Reload from server
//! - ?: Help
//! - q: Quit
//!
//! Every server call runs as its own task on the runtime, so a slow request
//! never blocks input. The screen redraws whenever the synchronizer state
//! changes.

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use taskpad_core::{Config, Outcome};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::commands::Synchronizer;
use app::{Action, App};

/// Poll interval for terminal events
const TICK: Duration = Duration::from_millis(50);

/// Run the TUI application
pub async fn run(sync: Synchronizer, config: &Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if TASKPAD_LOG is set)
    init_tui_logging(config);

    let sync = Arc::new(sync);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(sync.snapshot());

    // Initial fetch
    spawn_action(&sync, Action::Reload);

    let result = run_app(&mut terminal, &mut app, &sync).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    sync: &Arc<Synchronizer>,
) -> Result<()> {
    let mut state_rx = sync.subscribe();

    loop {
        app.check_status_timeout();

        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            biased;

            // Synchronizer state changed (a request finished or started)
            changed = state_rx.changed() => {
                if changed.is_ok() {
                    let state = state_rx.borrow_and_update().clone();
                    app.update_state(state);
                }
            }

            _ = tokio::time::sleep(TICK) => {
                // Check for terminal events (non-blocking)
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Only handle key press events (not release)
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }

                        if let Some(action) = app.handle_key(key) {
                            if action == Action::Quit {
                                break;
                            }
                            spawn_action(sync, action);
                            // Pick up synchronous changes (draft edits) right away
                            app.update_state(sync.snapshot());
                        }
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Run an action against the synchronizer without blocking the UI
fn spawn_action(sync: &Arc<Synchronizer>, action: Action) {
    match action {
        Action::Quit => {}
        Action::SetDraft(text) => {
            sync.set_draft(text);
        }
        Action::Reload => {
            let sync = Arc::clone(sync);
            tokio::spawn(async move {
                sync.load().await;
            });
        }
        Action::Submit => {
            let sync = Arc::clone(sync);
            tokio::spawn(async move {
                if sync.submit_draft().await == Outcome::Applied {
                    debug!("Task added from input");
                }
            });
        }
        Action::Toggle(id, is_done) => {
            let sync = Arc::clone(sync);
            tokio::spawn(async move {
                sync.toggle(&id, is_done).await;
            });
        }
    }
}

/// Initialize file-based logging for TUI
///
/// Only logs if TASKPAD_LOG is set. The terminal belongs to the UI, so
/// nothing is written to stderr.
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var("TASKPAD_LOG") else {
        return;
    };

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "taskpad_core={},taskpad_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
