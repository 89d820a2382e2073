//! Task synchronizer
//!
//! Owns the [`TaskState`] and routes every mutation through three
//! operations: load, create and toggle. Each one issues a single remote call
//! and reconciles the state with the result once it arrives. Nothing is
//! applied before the server confirms it.
//!
//! Operations take `&self` and never hold the state across the network
//! call, so several can be in flight on one executor. Results apply in
//! completion order: a load replaces the whole collection, a toggle
//! replaces one entry.

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::state::TaskState;
use crate::api::TaskApi;
use crate::error::{ApiError, Operation};
use crate::models::TaskId;

/// What an operation did to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server confirmed and the result was applied
    Applied,
    /// Nothing was sent (blank title, unknown task)
    Skipped,
    /// The server confirmed but the task was gone by then
    Dropped,
    /// The call failed; the error is in the state
    Failed,
}

impl Outcome {
    pub fn is_failed(self) -> bool {
        self == Outcome::Failed
    }
}

/// Keeps the local task collection consistent with the task server
pub struct TaskSynchronizer<A> {
    api: A,
    state: watch::Sender<TaskState>,
}

impl<A: TaskApi> TaskSynchronizer<A> {
    /// Create a synchronizer with an empty collection in the loading phase
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(TaskState::new());
        Self { api, state }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> TaskState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after every state change
    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.state.subscribe()
    }

    /// Edit the new-task input buffer
    ///
    /// Returns false (and keeps the old text) while a create is in flight.
    pub fn set_draft(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.state.send_if_modified(|s| s.set_draft(text))
    }

    /// Fetch all tasks and replace the collection
    ///
    /// On failure the collection is left exactly as it was.
    pub async fn load(&self) -> Outcome {
        self.state.send_modify(TaskState::begin_load);

        match self.api.list_tasks().await {
            Ok(tasks) => {
                info!("Loaded {} tasks", tasks.len());
                self.state.send_modify(|s| s.load_succeeded(tasks));
                Outcome::Applied
            }
            Err(e) => {
                log_failure(Operation::Load, &e);
                self.state.send_modify(|s| s.fail(Operation::Load));
                Outcome::Failed
            }
        }
    }

    /// Create a task and put it at the front of the collection
    ///
    /// Blank titles are ignored without contacting the server. Overlapping
    /// calls are not serialized here; callers gate on `is_submitting`.
    pub async fn create(&self, title: &str) -> Outcome {
        self.create_inner(title, false).await
    }

    /// Create a task from the draft buffer, clearing it on success
    pub async fn submit_draft(&self) -> Outcome {
        let draft = self.state.borrow().draft().to_string();
        self.create_inner(&draft, true).await
    }

    async fn create_inner(&self, title: &str, from_draft: bool) -> Outcome {
        let title = title.trim();
        if title.is_empty() {
            debug!("Ignoring create with blank title");
            return Outcome::Skipped;
        }

        self.state.send_modify(TaskState::begin_create);

        match self.api.create_task(title).await {
            Ok(task) => {
                info!("Created task {}", task.id);
                self.state
                    .send_modify(|s| s.create_succeeded(task, from_draft));
                Outcome::Applied
            }
            Err(e) => {
                log_failure(Operation::Create, &e);
                self.state.send_modify(TaskState::create_failed);
                Outcome::Failed
            }
        }
    }

    /// Ask the server to flip a task's completion flag
    ///
    /// `current_is_done` is the flag the caller saw; the request asks for its
    /// negation and the entry is replaced with whatever the server returns.
    pub async fn toggle(&self, id: &TaskId, current_is_done: bool) -> Outcome {
        let known = self.state.borrow().tasks().contains(id);
        if !known {
            debug!("Ignoring toggle of unknown task {}", id);
            return Outcome::Skipped;
        }

        match self.api.update_task(id, !current_is_done).await {
            Ok(task) => {
                let mut replaced = false;
                self.state.send_modify(|s| replaced = s.toggle_succeeded(task));

                if replaced {
                    info!("Updated task {}", id);
                    Outcome::Applied
                } else {
                    debug!("Task {} is gone, dropping toggle result", id);
                    Outcome::Dropped
                }
            }
            Err(e) => {
                log_failure(Operation::Toggle, &e);
                self.state.send_modify(|s| s.fail(Operation::Toggle));
                Outcome::Failed
            }
        }
    }
}

fn log_failure(op: Operation, error: &ApiError) {
    warn!(
        operation = op.name(),
        kind = ?error.kind(),
        status = ?error.status(),
        "Task {} failed: {}",
        op.name(),
        error
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;
    use crate::sync::state::{Phase, SyncStatus};

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};
    use tokio::sync::oneshot;

    fn task(id: i64, title: &str, is_done: bool) -> Task {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        Task {
            id: TaskId::Int(id),
            title: title.to_string(),
            is_done,
            created_at: at,
            updated_at: if is_done {
                at + chrono::Duration::minutes(5)
            } else {
                at
            },
        }
    }

    fn server_error(status: u16) -> ApiError {
        ApiError::Server {
            status,
            body: "error".to_string(),
        }
    }

    /// A scripted reply: either ready now or released later by the test
    enum Reply<T> {
        Ready(Result<T, ApiError>),
        Gated(oneshot::Receiver<Result<T, ApiError>>),
    }

    impl<T> Reply<T> {
        async fn resolve(self) -> Result<T, ApiError> {
            match self {
                Reply::Ready(result) => result,
                Reply::Gated(rx) => rx.await.unwrap_or_else(|_| Err(server_error(503))),
            }
        }
    }

    /// In-memory task API answering from per-endpoint queues
    #[derive(Default)]
    struct ScriptedApi {
        lists: Mutex<VecDeque<Reply<Vec<Task>>>>,
        creates: Mutex<VecDeque<Reply<Task>>>,
        updates: Mutex<VecDeque<Reply<Task>>>,
        create_titles: Mutex<Vec<String>>,
        update_requests: Mutex<Vec<(TaskId, bool)>>,
        calls: AtomicUsize,
    }

    impl ScriptedApi {
        fn list(self, result: Result<Vec<Task>, ApiError>) -> Self {
            self.lists.lock().unwrap().push_back(Reply::Ready(result));
            self
        }

        fn create(self, result: Result<Task, ApiError>) -> Self {
            self.creates.lock().unwrap().push_back(Reply::Ready(result));
            self
        }

        fn update(self, result: Result<Task, ApiError>) -> Self {
            self.updates.lock().unwrap().push_back(Reply::Ready(result));
            self
        }

        fn gated_list(&self) -> oneshot::Sender<Result<Vec<Task>, ApiError>> {
            let (tx, rx) = oneshot::channel();
            self.lists.lock().unwrap().push_back(Reply::Gated(rx));
            tx
        }

        fn gated_create(&self) -> oneshot::Sender<Result<Task, ApiError>> {
            let (tx, rx) = oneshot::channel();
            self.creates.lock().unwrap().push_back(Reply::Gated(rx));
            tx
        }

        fn gated_update(&self) -> oneshot::Sender<Result<Task, ApiError>> {
            let (tx, rx) = oneshot::channel();
            self.updates.lock().unwrap().push_back(Reply::Gated(rx));
            tx
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TaskApi for ScriptedApi {
        async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.lists.lock().unwrap().pop_front().expect("unexpected list");
            reply.resolve().await
        }

        async fn create_task(&self, title: &str) -> Result<Task, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.create_titles.lock().unwrap().push(title.to_string());
            let reply = self.creates.lock().unwrap().pop_front().expect("unexpected create");
            reply.resolve().await
        }

        async fn update_task(&self, id: &TaskId, is_done: bool) -> Result<Task, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.update_requests.lock().unwrap().push((id.clone(), is_done));
            let reply = self.updates.lock().unwrap().pop_front().expect("unexpected update");
            reply.resolve().await
        }
    }

    /// Synchronizer already loaded with `tasks`
    async fn loaded(tasks: Vec<Task>, api: ScriptedApi) -> TaskSynchronizer<ScriptedApi> {
        let sync = TaskSynchronizer::new(api.list(Ok(tasks)));
        assert_eq!(sync.load().await, Outcome::Applied);
        sync
    }

    fn titles(state: &TaskState) -> Vec<String> {
        state.tasks().iter().map(|t| t.title.clone()).collect()
    }

    #[tokio::test]
    async fn test_load_replaces_collection() {
        let sync = TaskSynchronizer::new(ScriptedApi::default().list(Ok(vec![task(1, "A", false)])));
        assert_eq!(sync.snapshot().status(), SyncStatus::Loading);

        let outcome = sync.load().await;

        let state = sync.snapshot();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(state.tasks().as_slice(), &[task(1, "A", false)]);
        assert_eq!(state.status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn test_load_keeps_server_order() {
        let server = vec![task(3, "C", false), task(1, "A", true), task(2, "B", false)];
        let sync = loaded(server.clone(), ScriptedApi::default()).await;

        assert_eq!(sync.snapshot().tasks().as_slice(), server.as_slice());
    }

    #[tokio::test]
    async fn test_first_load_failure_leaves_empty() {
        let sync = TaskSynchronizer::new(ScriptedApi::default().list(Err(server_error(502))));

        assert_eq!(sync.load().await, Outcome::Failed);

        let state = sync.snapshot();
        assert!(state.tasks().is_empty());
        assert_eq!(
            state.status(),
            SyncStatus::Error(Operation::Load.failure_message())
        );
    }

    #[tokio::test]
    async fn test_later_load_failure_keeps_collection() {
        let sync = loaded(
            vec![task(1, "A", false)],
            ScriptedApi::default().list(Err(server_error(500))),
        )
        .await;

        assert_eq!(sync.load().await, Outcome::Failed);

        let state = sync.snapshot();
        assert_eq!(state.tasks().as_slice(), &[task(1, "A", false)]);
        assert_eq!(state.error_message(), Some(Operation::Load.failure_message()));
    }

    #[tokio::test]
    async fn test_blank_create_is_noop() {
        let sync = loaded(vec![task(1, "A", false)], ScriptedApi::default()).await;
        let before = sync.snapshot();
        let calls = sync.api().call_count();

        assert_eq!(sync.create("").await, Outcome::Skipped);
        assert_eq!(sync.create("   ").await, Outcome::Skipped);
        assert_eq!(sync.create("\t\n").await, Outcome::Skipped);

        assert_eq!(sync.api().call_count(), calls);
        assert_eq!(sync.snapshot(), before);
    }

    #[tokio::test]
    async fn test_create_prepends_server_task() {
        let sync = loaded(
            vec![task(1, "A", false)],
            ScriptedApi::default().create(Ok(task(2, "B", false))),
        )
        .await;

        assert_eq!(sync.create("  B  ").await, Outcome::Applied);

        let state = sync.snapshot();
        assert_eq!(
            state.tasks().as_slice(),
            &[task(2, "B", false), task(1, "A", false)]
        );
        assert!(!state.is_submitting());
        assert_eq!(*sync.api().create_titles.lock().unwrap(), vec!["B".to_string()]);
    }

    #[tokio::test]
    async fn test_create_clears_prior_error() {
        let api = ScriptedApi::default()
            .list(Err(server_error(500)))
            .create(Ok(task(1, "A", false)));
        let sync = TaskSynchronizer::new(api);
        sync.load().await;
        assert!(sync.snapshot().error_message().is_some());

        // A failed load does not block submitting
        assert_eq!(sync.create("A").await, Outcome::Applied);

        let state = sync.snapshot();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(titles(&state), vec!["A"]);
    }

    #[tokio::test]
    async fn test_create_failure() {
        let sync = loaded(
            vec![task(1, "A", false)],
            ScriptedApi::default().create(Err(server_error(400))),
        )
        .await;

        assert_eq!(sync.create("B").await, Outcome::Failed);

        let state = sync.snapshot();
        assert_eq!(titles(&state), vec!["A"]);
        assert!(!state.is_submitting());
        assert_eq!(
            state.error_message(),
            Some(Operation::Create.failure_message())
        );
    }

    #[tokio::test]
    async fn test_submitting_while_create_in_flight() {
        let api = ScriptedApi::default();
        let gate = api.gated_create();
        let sync = loaded(vec![], api).await;

        let create = sync.create("B");
        let driver = async {
            let mut rx = sync.subscribe();
            rx.wait_for(|s| s.is_submitting()).await.unwrap();
            assert_eq!(sync.snapshot().status(), SyncStatus::Submitting);
            gate.send(Ok(task(2, "B", false))).unwrap();
        };

        let (outcome, _) = tokio::join!(create, driver);

        assert_eq!(outcome, Outcome::Applied);
        assert!(!sync.snapshot().is_submitting());
    }

    #[tokio::test]
    async fn test_submit_draft_clears_buffer_on_success() {
        let sync = loaded(
            vec![],
            ScriptedApi::default()
                .create(Err(server_error(500)))
                .create(Ok(task(1, "Buy milk", false))),
        )
        .await;
        assert!(sync.set_draft(" Buy milk "));

        assert_eq!(sync.submit_draft().await, Outcome::Failed);
        assert_eq!(sync.snapshot().draft(), " Buy milk ");

        assert_eq!(sync.submit_draft().await, Outcome::Applied);
        let state = sync.snapshot();
        assert_eq!(state.draft(), "");
        assert_eq!(titles(&state), vec!["Buy milk"]);
    }

    #[tokio::test]
    async fn test_overlapping_creates_prepend_in_completion_order() {
        let api = ScriptedApi::default();
        let first = api.gated_create();
        let second = api.gated_create();
        let sync = loaded(vec![task(1, "A", false)], api).await;

        let create_b = sync.create("B");
        let create_c = sync.create("C");
        let driver = async {
            let mut rx = sync.subscribe();
            // Second request completes first
            second.send(Ok(task(3, "C", false))).unwrap();
            rx.wait_for(|s| s.tasks().len() == 2).await.unwrap();
            first.send(Ok(task(2, "B", false))).unwrap();
        };

        let (b, c, _) = tokio::join!(create_b, create_c, driver);

        assert_eq!((b, c), (Outcome::Applied, Outcome::Applied));
        assert_eq!(titles(&sync.snapshot()), vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn test_toggle_replaces_with_server_task() {
        let sync = loaded(
            vec![task(1, "A", false)],
            ScriptedApi::default().update(Ok(task(1, "A", true))),
        )
        .await;

        assert_eq!(sync.toggle(&TaskId::Int(1), false).await, Outcome::Applied);

        assert_eq!(sync.snapshot().tasks().as_slice(), &[task(1, "A", true)]);
        assert_eq!(
            *sync.api().update_requests.lock().unwrap(),
            vec![(TaskId::Int(1), true)]
        );
    }

    #[tokio::test]
    async fn test_toggle_trusts_server_flag() {
        // Server refuses the flip and returns the task unchanged
        let sync = loaded(
            vec![task(1, "A", false), task(2, "B", false)],
            ScriptedApi::default().update(Ok(task(1, "A", false))),
        )
        .await;

        assert_eq!(sync.toggle(&TaskId::Int(1), false).await, Outcome::Applied);

        let state = sync.snapshot();
        assert!(!state.tasks().get(&TaskId::Int(1)).unwrap().is_done);
        assert_eq!(state.tasks().get(&TaskId::Int(2)), Some(&task(2, "B", false)));
    }

    #[tokio::test]
    async fn test_toggle_leaves_other_entries() {
        let sync = loaded(
            vec![task(1, "A", false), task(2, "B", true), task(3, "C", false)],
            ScriptedApi::default().update(Ok(task(2, "B", false))),
        )
        .await;

        sync.toggle(&TaskId::Int(2), true).await;

        assert_eq!(
            sync.snapshot().tasks().as_slice(),
            &[task(1, "A", false), task(2, "B", false), task(3, "C", false)]
        );
    }

    #[tokio::test]
    async fn test_toggle_server_error() {
        let sync = loaded(
            vec![task(1, "A", false)],
            ScriptedApi::default().update(Err(server_error(500))),
        )
        .await;

        assert_eq!(sync.toggle(&TaskId::Int(1), false).await, Outcome::Failed);

        let state = sync.snapshot();
        assert_eq!(state.tasks().as_slice(), &[task(1, "A", false)]);
        assert_eq!(
            state.status(),
            SyncStatus::Error(Operation::Toggle.failure_message())
        );
    }

    #[tokio::test]
    async fn test_toggle_success_clears_error() {
        let sync = loaded(
            vec![task(1, "A", false)],
            ScriptedApi::default()
                .update(Err(server_error(500)))
                .update(Ok(task(1, "A", true))),
        )
        .await;

        sync.toggle(&TaskId::Int(1), false).await;
        assert!(sync.snapshot().error_message().is_some());

        sync.toggle(&TaskId::Int(1), false).await;
        assert_eq!(sync.snapshot().status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn test_toggle_unknown_task_is_skipped() {
        let sync = loaded(vec![task(1, "A", false)], ScriptedApi::default()).await;
        let calls = sync.api().call_count();

        assert_eq!(sync.toggle(&TaskId::Int(9), false).await, Outcome::Skipped);
        assert_eq!(sync.api().call_count(), calls);
    }

    #[tokio::test]
    async fn test_toggle_does_not_touch_submitting() {
        let api = ScriptedApi::default().update(Ok(task(1, "A", true)));
        let gate = api.gated_create();
        let sync = loaded(vec![task(1, "A", false)], api).await;

        let create = sync.create("B");
        let driver = async {
            let mut rx = sync.subscribe();
            rx.wait_for(|s| s.is_submitting()).await.unwrap();
            sync.toggle(&TaskId::Int(1), false).await;
            assert!(sync.snapshot().is_submitting());
            gate.send(Ok(task(2, "B", false))).unwrap();
        };

        tokio::join!(create, driver);
        assert_eq!(titles(&sync.snapshot()), vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_toggle_after_reload_removed_task_is_dropped() {
        let api = ScriptedApi::default();
        let toggle_gate = api.gated_update();
        let reload_gate = api.gated_list();
        let sync = loaded(vec![task(1, "A", false)], api).await;
        let id = TaskId::Int(1);

        let toggle = sync.toggle(&id, false);
        let reload = sync.load();
        let driver = async {
            let mut rx = sync.subscribe();
            // Reload lands first and no longer contains task 1
            reload_gate.send(Ok(vec![task(2, "B", false)])).unwrap();
            rx.wait_for(|s| !s.tasks().contains(&TaskId::Int(1)))
                .await
                .unwrap();
            toggle_gate.send(Ok(task(1, "A", true))).unwrap();
        };

        let (toggled, reloaded, _) = tokio::join!(toggle, reload, driver);

        assert_eq!(reloaded, Outcome::Applied);
        assert_eq!(toggled, Outcome::Dropped);
        let state = sync.snapshot();
        assert_eq!(state.tasks().as_slice(), &[task(2, "B", false)]);
        assert_eq!(state.status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn test_stale_load_after_toggle_wins() {
        let api = ScriptedApi::default();
        let toggle_gate = api.gated_update();
        let reload_gate = api.gated_list();
        let sync = loaded(vec![task(1, "A", false)], api).await;
        let id = TaskId::Int(1);

        let toggle = sync.toggle(&id, false);
        let reload = sync.load();
        let driver = async {
            let mut rx = sync.subscribe();
            toggle_gate.send(Ok(task(1, "A", true))).unwrap();
            rx.wait_for(|s| s.tasks().as_slice()[0].is_done).await.unwrap();
            // Snapshot taken before the toggle reached the server
            reload_gate.send(Ok(vec![task(1, "A", false)])).unwrap();
        };

        let (toggled, reloaded, _) = tokio::join!(toggle, reload, driver);

        assert_eq!((toggled, reloaded), (Outcome::Applied, Outcome::Applied));
        assert_eq!(sync.snapshot().tasks().as_slice(), &[task(1, "A", false)]);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let sync = TaskSynchronizer::new(ScriptedApi::default().list(Ok(vec![task(1, "A", false)])));
        let mut rx = sync.subscribe();

        sync.load().await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().tasks().len(), 1);
    }

    #[test]
    fn test_set_draft_notifies_subscribers() {
        let sync = TaskSynchronizer::new(ScriptedApi::default());
        let rx = sync.subscribe();

        assert!(sync.set_draft("x"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(sync.snapshot().draft(), "x");
    }
}
