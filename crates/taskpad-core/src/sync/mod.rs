//! Task state synchronization
//!
//! Keeps an in-memory task collection consistent with the remote task
//! server. Only server-confirmed results are applied.
//!
//! ## Usage
//!
//! ```ignore
//! let sync = TaskSynchronizer::new(HttpTaskApi::new(&config.api_url)?);
//! sync.load().await;
//! sync.create("Buy milk").await;
//! let state = sync.snapshot();
//! ```

mod state;
mod synchronizer;

pub use state::{Phase, SyncStatus, TaskState};
pub use synchronizer::{Outcome, TaskSynchronizer};
