//! Client for the task endpoints. All operations address a task by its
//! composite `owner/name` id; listing is per owner and unpaginated.

use serde_json::Value;

use crate::config::ApiClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{CreateTaskParams, Task};

const GET_TASKS: &str = "/get-tasks";
const GET_TASK: &str = "/get-task";
const ADD_TASK: &str = "/add-task";
const UPDATE_TASK: &str = "/update-task";
const DELETE_TASK: &str = "/delete-task";

#[derive(Debug, Clone)]
pub struct TasksClient {
    api: ApiClient,
}

impl TasksClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn build_get_tasks(&self, owner: &str) -> HttpRequest {
        self.api.build_get(GET_TASKS, &[("owner", owner)])
    }

    pub fn build_get_task(&self, owner: &str, name: &str) -> HttpRequest {
        let id = format!("{owner}/{name}");
        self.api.build_get(GET_TASK, &[("id", id.as_str())])
    }

    pub fn build_add_task(&self, params: &CreateTaskParams) -> Result<HttpRequest, ApiError> {
        self.api.build_post(ADD_TASK, &[], Some(params))
    }

    pub fn build_update_task(
        &self,
        owner: &str,
        name: &str,
        params: &CreateTaskParams,
    ) -> Result<HttpRequest, ApiError> {
        let id = format!("{owner}/{name}");
        self.api.build_post(UPDATE_TASK, &[("id", id.as_str())], Some(params))
    }

    pub fn build_delete_task(&self, owner: &str, name: &str) -> Result<HttpRequest, ApiError> {
        let id = format!("{owner}/{name}");
        self.api
            .build_post(DELETE_TASK, &[("id", id.as_str())], Some(&serde_json::json!({})))
    }

    pub async fn get_tasks(&self, owner: &str) -> Result<Vec<Task>, ApiError> {
        self.api.send(self.build_get_tasks(owner)).await
    }

    pub async fn get_task(&self, owner: &str, name: &str) -> Result<Option<Task>, ApiError> {
        self.api.send(self.build_get_task(owner, name)).await
    }

    /// Resolves to whatever the backend reports for the write, usually
    /// `true`; fetch the task again to see its stored form.
    pub async fn add_task(&self, params: &CreateTaskParams) -> Result<Value, ApiError> {
        self.api.send_built(self.build_add_task(params)).await
    }

    pub async fn update_task(
        &self,
        owner: &str,
        name: &str,
        params: &CreateTaskParams,
    ) -> Result<Value, ApiError> {
        self.api
            .send_built(self.build_update_task(owner, name, params))
            .await
    }

    pub async fn delete_task(&self, owner: &str, name: &str) -> Result<Value, ApiError> {
        self.api.send_built(self.build_delete_task(owner, name)).await
    }
}
