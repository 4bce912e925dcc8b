//! Google Tasks v1 client

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::{debug, error, info};

use crate::auth::TokenProvider;
use crate::error::{GoogleError, Result};
use crate::models::{Task, TaskList, TaskPatch, Tasklist, TasklistIndex};

const TASKS_BASE_URL: &str = "https://tasks.googleapis.com/tasks/v1";

/// Tasks gateway for one configured task list
pub struct TasksClient {
    client: Client,
    auth: Arc<TokenProvider>,
    tasklist_id: String,
    base_url: String,
}

impl TasksClient {
    /// Create a new tasks client for the given task list
    pub fn new(auth: Arc<TokenProvider>, tasklist_id: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        let tasklist_id = tasklist_id.into();
        info!("Tasks client initialized for list: {}", tasklist_id);

        Ok(Self {
            client,
            auth,
            tasklist_id,
            base_url: TASKS_BASE_URL.to_string(),
        })
    }

    /// Override the API base URL (for testing or a proxy)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn tasks_url(&self) -> String {
        format!("{}/lists/{}/tasks", self.base_url, self.tasklist_id)
    }

    /// List all tasks in the configured list
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let bearer = self.auth.bearer().await?;

        let response = self
            .client
            .get(self.tasks_url())
            .bearer_auth(&bearer)
            .send()
            .await
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        let listing: TaskList = Self::read_json(response, "list tasks").await?;

        info!("Fetched {} tasks", listing.items.len());
        Ok(listing.items)
    }

    /// List the account's task list containers (id and title per list).
    ///
    /// Useful for discovering the tasklist id to configure; capped at 10
    /// lists, which covers a personal account.
    pub async fn list_task_lists(&self) -> Result<Vec<Tasklist>> {
        let bearer = self.auth.bearer().await?;

        let response = self
            .client
            .get(format!("{}/users/@me/lists", self.base_url))
            .bearer_auth(&bearer)
            .query(&[("maxResults", "10")])
            .send()
            .await
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        let listing: TasklistIndex = Self::read_json(response, "list task lists").await?;

        info!("Fetched {} task lists", listing.items.len());
        Ok(listing.items)
    }

    /// Create a task with a title and optional notes and due timestamp.
    ///
    /// `due` is passed through verbatim; the service expects RFC 3339.
    pub async fn create_task(
        &self,
        title: &str,
        notes: Option<&str>,
        due: Option<&str>,
    ) -> Result<Task> {
        let bearer = self.auth.bearer().await?;

        let mut body = json!({ "title": title });
        if let Some(notes) = notes {
            body["notes"] = json!(notes);
        }
        if let Some(due) = due {
            body["due"] = json!(due);
        }

        debug!("Creating task: {}", title);

        let response = self
            .client
            .post(self.tasks_url())
            .bearer_auth(&bearer)
            .json(&body)
            .send()
            .await
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        let created: Task = Self::read_json(response, "create task").await?;

        info!("Created task: {}", created.id.as_deref().unwrap_or("?"));
        Ok(created)
    }

    /// Fetch a single task by id
    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        let bearer = self.auth.bearer().await?;

        let response = self
            .client
            .get(format!("{}/{}", self.tasks_url(), task_id))
            .bearer_auth(&bearer)
            .send()
            .await
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GoogleError::NotFound(format!("task {}", task_id)));
        }

        Self::read_json(response, "get task").await
    }

    /// Update a task by id: fetch, merge the typed patch, write back
    pub async fn update_task(&self, task_id: &str, patch: &TaskPatch) -> Result<Task> {
        let mut task = self.get_task(task_id).await?;
        patch.apply_to(&mut task);

        let bearer = self.auth.bearer().await?;

        debug!("Updating task: {}", task_id);

        let response = self
            .client
            .put(format!("{}/{}", self.tasks_url(), task_id))
            .bearer_auth(&bearer)
            .json(&task)
            .send()
            .await
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        let updated: Task = Self::read_json(response, "update task").await?;

        info!("Updated task: {}", task_id);
        Ok(updated)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        if !status.is_success() {
            error!("Tasks API {} failed: {} - {}", context, status, body);
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(GoogleError::Auth(format!("{}: {}", status, body)));
            }
            return Err(GoogleError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(GoogleError::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_auth() -> (Arc<TokenProvider>, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
  "token": "ya29.test",
  "refresh_token": "1//refresh",
  "client_id": "c",
  "client_secret": "s",
  "expiry": "2099-01-01T00:00:00Z"
}"#,
        )
        .unwrap();
        let provider = TokenProvider::from_file(file.path()).unwrap();
        (Arc::new(provider), file)
    }

    #[tokio::test]
    async fn test_update_nonexistent_task_fails_without_a_write() {
        let server = MockServer::start().await;
        let (auth, _token_file) = test_auth();

        Mock::given(method("GET"))
            .and(path("/lists/list-1/tasks/t-missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .expect(1)
            .mount(&server)
            .await;
        // The fetch must fail before any write is attempted
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = TasksClient::new(auth, "list-1")
            .unwrap()
            .with_base_url(server.uri());

        let patch = TaskPatch {
            status: Some("completed".to_string()),
            ..Default::default()
        };
        let err = client.update_task("t-missing", &patch).await.unwrap_err();
        assert!(matches!(err, GoogleError::NotFound(_)));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_list_task_lists_returns_containers() {
        let server = MockServer::start().await;
        let (auth, _token_file) = test_auth();

        Mock::given(method("GET"))
            .and(path("/users/@me/lists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "tasks#taskLists",
                "items": [
                    {"id": "list-1", "title": "My Tasks"},
                    {"id": "list-2", "title": "Groceries"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TasksClient::new(auth, "list-1")
            .unwrap()
            .with_base_url(server.uri());

        let lists = client.list_task_lists().await.unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[1].title, "Groceries");
        assert_eq!(lists[0].id.as_deref(), Some("list-1"));
    }

    #[test]
    fn test_task_list_parses_google_response() {
        let body = serde_json::json!({
            "kind": "tasks#tasks",
            "items": [
                {"id": "t1", "title": "Buy milk", "status": "needsAction"},
                {"id": "t2", "title": "File taxes", "status": "completed"}
            ]
        });

        let listing: TaskList = serde_json::from_value(body).unwrap();
        assert_eq!(listing.items.len(), 2);
        assert_eq!(listing.items[1].status.as_deref(), Some("completed"));
    }

    #[test]
    fn test_task_list_tolerates_empty_listing() {
        let listing: TaskList =
            serde_json::from_value(serde_json::json!({"kind": "tasks#tasks"})).unwrap();
        assert!(listing.items.is_empty());
    }

    #[test]
    fn test_create_body_omits_absent_fields() {
        let mut body = json!({ "title": "Only title" });
        let notes: Option<&str> = None;
        if let Some(notes) = notes {
            body["notes"] = json!(notes);
        }
        assert_eq!(body, json!({"title": "Only title"}));
    }
}
