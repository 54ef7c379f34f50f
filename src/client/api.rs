use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use crate::task::{Task, TaskDraft, TaskId};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response carrying the service's `{message}` body.
    #[error("{0}")]
    Server(String),
    /// Non-2xx response without a readable message.
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// What to show the user: the server's message, or `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Server(message) => message.clone(),
            ApiError::Status(_) | ApiError::Transport(_) => fallback.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// Thin client over the task routes, rooted at e.g. `http://localhost:5000/api`.
#[derive(Debug, Clone)]
pub struct TaskApi {
    http: reqwest::Client,
    base_url: String,
}

impl TaskApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let response = self.http.get(self.url("/tasks")).send().await?;
        decode(response).await
    }

    pub async fn create(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        let response = self.http.post(self.url("/tasks")).json(draft).send().await?;
        decode(response).await
    }

    /// Client side of the Update route. The terminal client only creates and
    /// deletes; this is here for callers that edit tasks in place.
    pub async fn update(&self, id: TaskId, draft: &TaskDraft) -> Result<Task, ApiError> {
        let response = self
            .http
            .put(self.url(&format!("/tasks/{id}")))
            .json(draft)
            .send()
            .await?;
        decode(response).await
    }

    /// Returns the service's confirmation message.
    pub async fn delete(&self, id: TaskId) -> Result<String, ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("/tasks/{id}")))
            .send()
            .await?;
        let body: MessageBody = decode(response).await?;
        Ok(body.message)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    match response.json::<MessageBody>().await {
        Ok(body) => Err(ApiError::Server(body.message)),
        Err(_) => Err(ApiError::Status(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = TaskApi::new("http://localhost:5000/api/");
        assert_eq!(api.base_url(), "http://localhost:5000/api");
        assert_eq!(api.url("/tasks"), "http://localhost:5000/api/tasks");
    }

    #[test]
    fn user_message_prefers_server_text() {
        let server = ApiError::Server("Task not found.".to_string());
        assert_eq!(server.user_message("Error deleting task"), "Task not found.");
        let status = ApiError::Status(StatusCode::BAD_GATEWAY);
        assert_eq!(status.user_message("Error deleting task"), "Error deleting task");
    }
}
