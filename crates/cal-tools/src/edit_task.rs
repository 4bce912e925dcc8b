//! Tool for updating an existing task by id

use std::sync::Arc;

use async_trait::async_trait;
use cal_core::{Result, Tool, ToolResult};
use cal_google::{GoogleError, TaskPatch, TasksClient};
use serde::Deserialize;
use serde_json::{json, Value};

/// Apply a partial update to one task
pub struct EditTaskTool {
    tasks: Arc<TasksClient>,
}

impl EditTaskTool {
    pub fn new(tasks: Arc<TasksClient>) -> Self {
        Self { tasks }
    }
}

#[derive(Debug, Deserialize)]
struct EditTaskInput {
    task_id: String,
    update_payload: TaskPatch,
}

#[async_trait]
impl Tool for EditTaskTool {
    fn name(&self) -> &str {
        "edit_task_by_id"
    }

    fn description(&self) -> &str {
        "Updates an existing task by its id. Only the fields present in update_payload change. Set status to 'completed' to mark a task done or 'needsAction' to reopen it. Returns the updated task resource."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": {
                    "type": "string",
                    "description": "Id of the task to update"
                },
                "update_payload": {
                    "type": "object",
                    "description": "Fields to change",
                    "properties": {
                        "title": { "type": "string" },
                        "notes": { "type": "string" },
                        "due": {
                            "type": "string",
                            "description": "Due instant in RFC 3339, e.g. 2025-08-15T00:00:00Z"
                        },
                        "status": {
                            "type": "string",
                            "enum": ["needsAction", "completed"]
                        }
                    }
                }
            },
            "required": ["task_id", "update_payload"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let edit: EditTaskInput = serde_json::from_value(input).map_err(|e| {
            cal_core::Error::ToolExecution(format!("Invalid input parameters: {}", e))
        })?;

        if edit.update_payload.is_empty() {
            return Ok(ToolResult::error("No fields to update"));
        }

        tracing::info!(task_id = %edit.task_id, "Updating task");

        match self.tasks.update_task(&edit.task_id, &edit.update_payload).await {
            Ok(task) => Ok(ToolResult::success(serde_json::to_string_pretty(&task)?)),
            Err(GoogleError::NotFound(what)) => {
                Ok(ToolResult::error(format!("Not found: {}", what)))
            }
            Err(e) => Ok(ToolResult::error(format!("Failed to update task: {}", e))),
        }
    }
}
