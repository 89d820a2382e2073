//! Task command handlers
//!
//! One-shot commands drive the same synchronizer as the TUI and report the
//! fixed per-operation message when the server call fails.

use anyhow::{anyhow, bail, Result};

use taskpad_core::{Operation, Outcome, TaskId};

use super::Synchronizer;
use crate::output::Output;

/// List all tasks in server order
pub async fn list(sync: &Synchronizer, output: &Output) -> Result<()> {
    load(sync).await?;
    output.print_tasks(sync.snapshot().tasks().as_slice());
    Ok(())
}

/// Create a new task
pub async fn add(sync: &Synchronizer, title: String, output: &Output) -> Result<()> {
    match sync.create(&title).await {
        Outcome::Applied => {
            let state = sync.snapshot();
            let task = state
                .tasks()
                .iter()
                .next()
                .ok_or_else(|| anyhow!("Created task missing from collection"))?;
            output.success(&format!("Created task {}", task.id));
            output.print_task(task);
            Ok(())
        }
        Outcome::Skipped => bail!("Task title cannot be empty"),
        Outcome::Failed => bail!(Operation::Create.failure_message()),
        Outcome::Dropped => Ok(()),
    }
}

/// Flip the completion flag of a task
///
/// Loads first so the request is based on the flag the server last reported.
pub async fn toggle(sync: &Synchronizer, id: String, output: &Output) -> Result<()> {
    load(sync).await?;

    let task_id: TaskId = id.parse()?;
    let current = sync
        .snapshot()
        .tasks()
        .get(&task_id)
        .map(|t| t.is_done)
        .ok_or_else(|| anyhow!("Task not found: {}", id))?;

    match sync.toggle(&task_id, current).await {
        Outcome::Applied => {
            let state = sync.snapshot();
            if let Some(task) = state.tasks().get(&task_id) {
                let label = if task.is_done { "done" } else { "pending" };
                output.success(&format!("Marked task {} as {}", task.id, label));
                output.print_task(task);
            }
            Ok(())
        }
        Outcome::Skipped | Outcome::Dropped => bail!("Task not found: {}", id),
        Outcome::Failed => bail!(Operation::Toggle.failure_message()),
    }
}

/// Show total, completed and pending counts
pub async fn stats(sync: &Synchronizer, output: &Output) -> Result<()> {
    load(sync).await?;
    output.print_stats(&sync.snapshot().stats());
    Ok(())
}

async fn load(sync: &Synchronizer) -> Result<()> {
    if sync.load().await.is_failed() {
        bail!(Operation::Load.failure_message());
    }
    Ok(())
}
