//! Application state and key handling

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskpad_core::{Task, TaskId, TaskState};

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// List navigation
    Normal,
    /// Typing a new task title
    Editing,
}

/// Something the event loop has to do on the synchronizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Reload,
    Submit,
    Toggle(TaskId, bool),
    SetDraft(String),
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Latest synchronizer state
    pub state: TaskState,
    /// Index of the selected task
    pub selected: usize,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Task id under the cursor, kept so reloads don't move the selection
    selected_id: Option<TaskId>,
}

impl App {
    pub fn new(state: TaskState) -> Self {
        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            state: TaskState::new(),
            selected: 0,
            show_help: false,
            status_message: None,
            status_message_time: None,
            selected_id: None,
        };
        app.update_state(state);
        app
    }

    /// Take a new snapshot, keeping the cursor on the same task if it survived
    pub fn update_state(&mut self, state: TaskState) {
        self.state = state;

        let tasks = self.state.tasks();
        if let Some(pos) = self
            .selected_id
            .as_ref()
            .and_then(|id| tasks.iter().position(|t| &t.id == id))
        {
            self.selected = pos;
        } else if tasks.is_empty() {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(tasks.len() - 1);
        }

        self.selected_id = self.selected_task().map(|t| t.id.clone());
    }

    /// Get the currently selected task
    pub fn selected_task(&self) -> Option<&Task> {
        self.state.tasks().as_slice().get(self.selected)
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn move_up(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    pub fn move_down(&mut self) {
        let last = self.state.tasks().len().saturating_sub(1);
        self.select((self.selected + 1).min(last));
    }

    pub fn move_to_first(&mut self) {
        self.select(0);
    }

    pub fn move_to_last(&mut self) {
        self.select(self.state.tasks().len().saturating_sub(1));
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
        self.selected_id = self.selected_task().map(|t| t.id.clone());
    }

    /// Translate a key press into local changes and, if needed, an action
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Some(Action::Quit);
        }

        // If help is showing, any key dismisses it
        if self.show_help {
            self.show_help = false;
            return None;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Editing => self.handle_editing_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Some(Action::Quit)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_up();
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_down();
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.move_to_first();
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.move_to_last();
                None
            }
            KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => self
                .selected_task()
                .map(|task| Action::Toggle(task.id.clone(), task.is_done)),
            KeyCode::Char('a') | KeyCode::Char('i') => {
                self.input_mode = InputMode::Editing;
                None
            }
            KeyCode::Char('r') => {
                self.set_status("Reloading tasks...");
                Some(Action::Reload)
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                None
            }
            _ => None,
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                None
            }
            // Input is disabled while a create is in flight
            KeyCode::Enter if self.state.can_submit() => Some(Action::Submit),
            _ if self.state.is_submitting() => None,
            KeyCode::Backspace => {
                let mut draft = self.state.draft().to_string();
                draft.pop()?;
                Some(Action::SetDraft(draft))
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::SetDraft(String::new()))
            }
            KeyCode::Char(c) => {
                let mut draft = self.state.draft().to_string();
                draft.push(c);
                Some(Action::SetDraft(draft))
            }
            _ => None,
        }
    }
}
