//! Taskpad Core Library
//!
//! This crate provides the core functionality for Taskpad, a client for a
//! remote to-do list service.
//!
//! # Architecture
//!
//! - **TaskSynchronizer**: single owner of the task collection and status;
//!   every change goes through load, create or toggle
//! - **TaskApi**: the remote task server, reached over HTTP in production
//!
//! The presentation layer reads snapshots and subscribes to changes; it
//! never mutates the collection directly.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let sync = TaskSynchronizer::new(HttpTaskApi::new(&config.api_url)?);
//!
//! sync.load().await;
//! sync.create("Write report").await;
//!
//! for task in sync.snapshot().tasks() {
//!     println!("{} {}", task.id, task.title);
//! }
//! ```
//!
//! # Modules
//!
//! - `sync`: Task synchronizer and its state machine (main entry point)
//! - `api`: Remote task API trait and HTTP client
//! - `models`: Task data structures
//! - `collection`: Ordered, id-keyed task collection
//! - `error`: API errors and per-operation failure messages
//! - `config`: Application configuration

pub mod api;
pub mod collection;
pub mod config;
pub mod error;
pub mod models;
pub mod sync;

pub use api::{HttpTaskApi, TaskApi};
pub use collection::TaskCollection;
pub use config::Config;
pub use error::{ApiError, FailureKind, Operation};
pub use models::{Task, TaskId, TaskStats};
pub use sync::{Outcome, Phase, SyncStatus, TaskState, TaskSynchronizer};
