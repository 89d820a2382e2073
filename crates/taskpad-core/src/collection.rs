//! Ordered, id-keyed task collection
//!
//! Every mutation replaces either the whole sequence or a single entry;
//! fields of a stored task are never edited in place.

use std::collections::HashSet;

use tracing::warn;

use crate::models::{Task, TaskId, TaskStats};

/// Ordered tasks, unique per id, newest creations first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection, preserving the given order
    ///
    /// If the same id appears more than once, the first occurrence wins.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        let mut seen = HashSet::with_capacity(tasks.len());
        let mut unique = Vec::with_capacity(tasks.len());

        for task in tasks {
            if seen.insert(task.id.clone()) {
                unique.push(task);
            } else {
                warn!("Server returned duplicate task id {}, keeping first", task.id);
            }
        }

        self.tasks = unique;
    }

    /// Insert a task at the front
    ///
    /// An existing entry with the same id is removed first.
    pub fn prepend(&mut self, task: Task) {
        if let Some(pos) = self.position(&task.id) {
            self.tasks.remove(pos);
        }
        self.tasks.insert(0, task);
    }

    /// Replace the entry with the same id, keeping its position
    ///
    /// Returns false and leaves the collection untouched if the id is absent.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.position(&task.id) {
            Some(pos) => {
                self.tasks[pos] = task;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }
}

impl<'a> IntoIterator for &'a TaskCollection {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
