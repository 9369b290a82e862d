//! Authenticated task endpoints.

use tracing::debug;

use super::client::{rejection_or, ApiClient, CREATE_TASK_PATH, LIST_TASKS_PATH};
use super::in_flight::Operation;
use super::{ApiError, ApiResult};
use crate::models::{NewTask, Task};
use crate::store::CredentialStore;

#[derive(Debug, Clone)]
pub struct TaskClient {
    api: ApiClient,
    store: CredentialStore,
}

impl TaskClient {
    pub fn new(api: ApiClient, store: CredentialStore) -> Self {
        Self { api, store }
    }

    /// Fetch every task visible to `token`, in server order
    pub async fn fetch_tasks(&self, token: &str) -> ApiResult<Vec<Task>> {
        let _guard = self.api.begin(Operation::FetchTasks)?;
        let url = self.api.url(LIST_TASKS_PATH);

        let response = self
            .api
            .http()
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?;

        let response =
            ApiClient::check_response(response, rejection_or(ApiError::Unauthorized)).await?;
        let tasks: Vec<Task> = ApiClient::read_json(response).await?;
        debug!(count = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }

    /// Create a task using the stored token.
    ///
    /// Fails with `MissingToken` without touching the network when no token
    /// is stored. The session's user id, when known, is sent as `userId`.
    pub async fn create_task(&self, title: &str, description: &str) -> ApiResult<Task> {
        let token = self.store.get()?.ok_or(ApiError::MissingToken)?;
        let _guard = self.api.begin(Operation::CreateTask)?;
        let user_id = self.store.session()?.and_then(|s| s.user_id());
        let url = self.api.url(CREATE_TASK_PATH);

        let response = self
            .api
            .http()
            .post(&url)
            .bearer_auth(&token)
            .json(&NewTask {
                title,
                description,
                user_id,
            })
            .send()
            .await?;

        let response =
            ApiClient::check_response(response, rejection_or(ApiError::Unauthorized)).await?;
        let task: Task = ApiClient::read_json(response).await?;
        debug!(task_id = task.id, "Created task");
        Ok(task)
    }
}
