//! Remote task API
//!
//! The synchronizer talks to the task server through the [`TaskApi`] trait.
//! [`HttpTaskApi`] is the production implementation over the server's REST
//! endpoints:
//!
//! - `GET    {base}/tasks/`       list all tasks
//! - `POST   {base}/tasks/`       create a task from `{"title": ...}`
//! - `PATCH  {base}/tasks/{id}/`  set `{"is_done": ...}`
//!
//! Any non-2xx status is a failure. No local timeout is applied; the call
//! waits for the transport's own failure signal.

use std::future::Future;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{NewTask, Task, TaskId, TaskPatch};

/// Longest error body kept for diagnostics
const MAX_ERROR_BODY: usize = 512;

/// Persistence backend for tasks
pub trait TaskApi: Send + Sync {
    /// Fetch every task, in server order
    fn list_tasks(&self) -> impl Future<Output = Result<Vec<Task>, ApiError>> + Send;

    /// Create a task with the given (already trimmed) title
    fn create_task(&self, title: &str) -> impl Future<Output = Result<Task, ApiError>> + Send;

    /// Set the completion flag of a task
    fn update_task(
        &self,
        id: &TaskId,
        is_done: bool,
    ) -> impl Future<Output = Result<Task, ApiError>> + Send;
}

/// HTTP client for the task server
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: Client,
    base_url: Url,
}

impl HttpTaskApi {
    /// Create a client for the API rooted at `base_url` (e.g. `http://127.0.0.1:8000/api`)
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let parsed =
            Url::parse(base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("not an http(s) base URL".to_string()));
        }

        let client = Client::builder()
            .user_agent(concat!("taskpad/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn tasks_url(&self) -> Url {
        self.endpoint(&["tasks"])
    }

    /// Ids are percent-encoded as a single path segment
    fn task_url(&self, id: &TaskId) -> Url {
        self.endpoint(&["tasks", &id.to_string()])
    }

    /// Base URL plus `segments`, always with a trailing slash
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // new() rejects URLs without a path
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }
}

impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let url = self.tasks_url();
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::Network)?;

        decode(response).await
    }

    async fn create_task(&self, title: &str) -> Result<Task, ApiError> {
        let url = self.tasks_url();
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(&NewTask { title })
            .send()
            .await
            .map_err(ApiError::Network)?;

        decode(response).await
    }

    async fn update_task(&self, id: &TaskId, is_done: bool) -> Result<Task, ApiError> {
        let url = self.task_url(id);
        debug!("PATCH {} is_done={}", url, is_done);

        let response = self
            .client
            .patch(url)
            .json(&TaskPatch { is_done })
            .send()
            .await
            .map_err(ApiError::Network)?;

        decode(response).await
    }
}

/// Check the status and decode a JSON body
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Server {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY).collect(),
        });
    }

    response.json::<T>().await.map_err(ApiError::Decode)
}
