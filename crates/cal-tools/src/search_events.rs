//! Tool for fuzzy-searching events by name within a time window

use std::sync::Arc;

use async_trait::async_trait;
use cal_core::{Result, Tool, ToolResult};
use cal_google::SearchService;
use serde::Deserialize;
use serde_json::{json, Value};

/// Find events whose title fuzzily matches a query
pub struct SearchEventsTool {
    search: Arc<SearchService>,
}

impl SearchEventsTool {
    pub fn new(search: Arc<SearchService>) -> Self {
        Self { search }
    }
}

#[derive(Debug, Deserialize)]
struct SearchEventsInput {
    name: String,
    start_datetime_str: String,
    end_datetime_str: String,
    #[serde(default)]
    threshold: Option<u8>,
    #[serde(default)]
    top_k: Option<usize>,
}

#[async_trait]
impl Tool for SearchEventsTool {
    // Name kept as the model-facing contract, typo included
    fn name(&self) -> &str {
        "get_event_by_name_and_timefarame"
    }

    fn description(&self) -> &str {
        "Performs fuzzy search for events by name within a time window. Use this to find an event's id before editing it. Returns matched events with their match scores, best match first."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Search query for the event title"
                },
                "start_datetime_str": {
                    "type": "string",
                    "description": "Window start in 'YYYY-MM-DD HH:MM:SS' (IST)"
                },
                "end_datetime_str": {
                    "type": "string",
                    "description": "Window end in 'YYYY-MM-DD HH:MM:SS' (IST)"
                },
                "threshold": {
                    "type": "integer",
                    "description": "Minimum fuzzy match score, 0-100 (default: 65)",
                    "minimum": 0,
                    "maximum": 100
                },
                "top_k": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 5)",
                    "minimum": 1
                }
            },
            "required": ["name", "start_datetime_str", "end_datetime_str"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let query: SearchEventsInput = serde_json::from_value(input).map_err(|e| {
            cal_core::Error::ToolExecution(format!("Invalid input parameters: {}", e))
        })?;

        if query.name.trim().is_empty() {
            return Ok(ToolResult::error("Search name cannot be empty"));
        }

        tracing::info!(name = %query.name, "Searching events");

        match self
            .search
            .search_events(
                &query.name,
                Some(&query.start_datetime_str),
                Some(&query.end_datetime_str),
                query.threshold,
                query.top_k,
            )
            .await
        {
            Ok(hits) => Ok(ToolResult::success(serde_json::to_string_pretty(&hits)?)),
            Err(e) => Ok(ToolResult::error(format!("Failed to search events: {}", e))),
        }
    }
}
