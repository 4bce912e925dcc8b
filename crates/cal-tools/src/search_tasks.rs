//! Tool for fuzzy-searching tasks by title

use std::sync::Arc;

use async_trait::async_trait;
use cal_core::{Result, Tool, ToolResult};
use cal_google::SearchService;
use serde::Deserialize;
use serde_json::{json, Value};

/// Find tasks whose title fuzzily matches a query
pub struct SearchTasksTool {
    search: Arc<SearchService>,
}

impl SearchTasksTool {
    pub fn new(search: Arc<SearchService>) -> Self {
        Self { search }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchTasksInput {
    #[serde(default)]
    name: String,
    #[serde(default)]
    top_n: Option<usize>,
    #[serde(default)]
    score_cutoff: Option<u8>,
}

#[async_trait]
impl Tool for SearchTasksTool {
    fn name(&self) -> &str {
        "get_tasks_by_name"
    }

    fn description(&self) -> &str {
        "Performs fuzzy search for tasks by title. Use this to find a task's id before editing it. Returns matched tasks with their match scores, best match first."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Search query for the task title"
                },
                "top_n": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 5)",
                    "minimum": 1
                },
                "score_cutoff": {
                    "type": "integer",
                    "description": "Minimum fuzzy match score, 0-100 (default: 50)",
                    "minimum": 0,
                    "maximum": 100
                }
            },
            "required": []
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let query: SearchTasksInput = serde_json::from_value(input).map_err(|e| {
            cal_core::Error::ToolExecution(format!("Invalid input parameters: {}", e))
        })?;

        tracing::info!(name = %query.name, "Searching tasks");

        match self
            .search
            .search_tasks(&query.name, query.top_n, query.score_cutoff)
            .await
        {
            Ok(hits) => Ok(ToolResult::success(serde_json::to_string_pretty(&hits)?)),
            Err(e) => Ok(ToolResult::error(format!("Failed to search tasks: {}", e))),
        }
    }
}
