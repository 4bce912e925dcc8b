//! Tool for listing tasks

use std::sync::Arc;

use async_trait::async_trait;
use cal_core::{Result, Tool, ToolResult};
use cal_google::TasksClient;
use serde_json::{json, Value};

/// List all tasks in the configured task list
pub struct GetTasksTool {
    tasks: Arc<TasksClient>,
}

impl GetTasksTool {
    pub fn new(tasks: Arc<TasksClient>) -> Self {
        Self { tasks }
    }
}

#[async_trait]
impl Tool for GetTasksTool {
    fn name(&self) -> &str {
        "get_tasks"
    }

    fn description(&self) -> &str {
        "Retrieves all tasks from the task list, including their ids, titles, notes, due dates, and completion status."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _input: Value) -> Result<ToolResult> {
        tracing::info!("Listing tasks");

        match self.tasks.list_tasks().await {
            Ok(tasks) => Ok(ToolResult::success(serde_json::to_string_pretty(&tasks)?)),
            Err(e) => Ok(ToolResult::error(format!("Failed to list tasks: {}", e))),
        }
    }
}
