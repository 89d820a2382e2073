//! Command handlers

pub mod config;
pub mod task;

use taskpad_core::{HttpTaskApi, TaskSynchronizer};

/// Synchronizer wired to the real task server
pub type Synchronizer = TaskSynchronizer<HttpTaskApi>;
