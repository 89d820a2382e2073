//! Synchronization state
//!
//! [`TaskState`] is the single value owned by the synchronizer: the task
//! collection, the phase of the last load/failure, the orthogonal
//! `submitting` flag, and the draft input buffer. Transitions are plain
//! methods so they can be exercised without any I/O.

use crate::collection::TaskCollection;
use crate::error::Operation;
use crate::models::{Task, TaskStats};

/// Phase of the collection as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing in flight that blocks the view
    Idle,
    /// A full fetch is in flight
    Loading,
    /// The most recent failure, by operation
    Error(Operation),
}

/// Status as shown to the user
///
/// Derived from [`Phase`] and the submitting flag. An error wins over
/// loading, loading wins over submitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Loading,
    Submitting,
    Error(&'static str),
}

/// Everything the presentation layer can read
#[derive(Debug, Clone, PartialEq)]
pub struct TaskState {
    tasks: TaskCollection,
    phase: Phase,
    submitting: bool,
    draft: String,
}

impl Default for TaskState {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskState {
    /// Initial state: no tasks, initial fetch pending
    pub fn new() -> Self {
        Self {
            tasks: TaskCollection::new(),
            phase: Phase::Loading,
            submitting: false,
            draft: String::new(),
        }
    }

    pub fn tasks(&self) -> &TaskCollection {
        &self.tasks
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Current contents of the new-task input buffer
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn status(&self) -> SyncStatus {
        match self.phase {
            Phase::Error(op) => SyncStatus::Error(op.failure_message()),
            Phase::Loading => SyncStatus::Loading,
            Phase::Idle if self.submitting => SyncStatus::Submitting,
            Phase::Idle => SyncStatus::Idle,
        }
    }

    /// User-facing message of the last failure, if one is showing
    pub fn error_message(&self) -> Option<&'static str> {
        match self.phase {
            Phase::Error(op) => Some(op.failure_message()),
            _ => None,
        }
    }

    pub fn stats(&self) -> TaskStats {
        self.tasks.stats()
    }

    /// Whether a create may be started from the draft
    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.draft.trim().is_empty()
    }

    /// Replace the draft; ignored while a create is in flight
    pub(crate) fn set_draft(&mut self, text: String) -> bool {
        if self.submitting {
            return false;
        }
        self.draft = text;
        true
    }

    pub(crate) fn begin_load(&mut self) {
        self.phase = Phase::Loading;
    }

    pub(crate) fn load_succeeded(&mut self, tasks: Vec<Task>) {
        self.tasks.replace_all(tasks);
        self.phase = Phase::Idle;
    }

    pub(crate) fn begin_create(&mut self) {
        self.submitting = true;
    }

    pub(crate) fn create_succeeded(&mut self, task: Task, clear_draft: bool) {
        self.tasks.prepend(task);
        self.clear_error();
        self.submitting = false;
        if clear_draft {
            self.draft.clear();
        }
    }

    pub(crate) fn create_failed(&mut self) {
        self.fail(Operation::Create);
        self.submitting = false;
    }

    /// Apply a confirmed toggle; false if the task is no longer present
    pub(crate) fn toggle_succeeded(&mut self, task: Task) -> bool {
        self.clear_error();
        self.tasks.replace(task)
    }

    /// Record a failure; the last one wins
    pub(crate) fn fail(&mut self, op: Operation) {
        self.phase = Phase::Error(op);
    }

    fn clear_error(&mut self) {
        if let Phase::Error(_) = self.phase {
            self.phase = Phase::Idle;
        }
    }
}
