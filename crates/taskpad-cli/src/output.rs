//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use taskpad_core::{Task, TaskStats};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single task
    pub fn print_task(&self, task: &Task) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", task.id);
                println!("Title:    {}", task.title);
                println!("Status:   {}", status_label(task));
                println!("Created:  {}", task.created_at.format("%Y-%m-%d %H:%M"));
                if task.was_modified() {
                    println!("Updated:  {}", task.updated_at.format("%Y-%m-%d %H:%M"));
                }
            }
            OutputFormat::Json => print_json(task),
            OutputFormat::Quiet => {
                println!("{}", task.id);
            }
        }
    }

    /// Print a list of tasks, in collection order
    pub fn print_tasks(&self, tasks: &[Task]) {
        match self.format {
            OutputFormat::Human => {
                if tasks.is_empty() {
                    println!("No tasks yet. Add one with: taskpad add <title>");
                    return;
                }
                for task in tasks {
                    println!("{}", task_line(task));
                }
                println!("\n{} task(s)", tasks.len());
            }
            OutputFormat::Json => print_json(&tasks),
            OutputFormat::Quiet => {
                for task in tasks {
                    println!("{}", task.id);
                }
            }
        }
    }

    /// Print task counts
    pub fn print_stats(&self, stats: &TaskStats) {
        match self.format {
            OutputFormat::Human => {
                println!("Total:     {}", stats.total);
                println!("Completed: {}", stats.completed);
                println!("Pending:   {}", stats.pending);
            }
            OutputFormat::Json => print_json(stats),
            OutputFormat::Quiet => {
                println!("{} {} {}", stats.total, stats.completed, stats.pending);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn status_label(task: &Task) -> &'static str {
    if task.is_done {
        "Done"
    } else {
        "Pending"
    }
}

/// One-line summary: `[x] 12 | Title | Done | 2024-05-01`
fn task_line(task: &Task) -> String {
    let check = if task.is_done { "[x]" } else { "[ ]" };
    format!(
        "{} {:>5} | {} | {} | {}",
        check,
        task.id.to_string(),
        truncate(&task.title, 50),
        status_label(task),
        task.created_at.format("%Y-%m-%d")
    )
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
