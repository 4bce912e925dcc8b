//! Tool for listing calendar events in a time window

use std::sync::Arc;

use async_trait::async_trait;
use cal_core::{Result, Tool, ToolResult};
use cal_google::CalendarClient;
use serde::Deserialize;
use serde_json::{json, Value};

/// List events between two datetimes
pub struct GetEventsTool {
    calendar: Arc<CalendarClient>,
}

impl GetEventsTool {
    pub fn new(calendar: Arc<CalendarClient>) -> Self {
        Self { calendar }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GetEventsInput {
    #[serde(default)]
    start_datetime_str: Option<String>,
    #[serde(default)]
    end_datetime_str: Option<String>,
}

#[async_trait]
impl Tool for GetEventsTool {
    fn name(&self) -> &str {
        "get_events"
    }

    fn description(&self) -> &str {
        "Retrieves all calendar events between the specified start and end datetimes, ordered by start time. Start defaults to today at midnight; end defaults to 7 days after start. Datetimes are IST strings in 'YYYY-MM-DD HH:MM:SS' format."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "start_datetime_str": {
                    "type": "string",
                    "description": "Start datetime in 'YYYY-MM-DD HH:MM:SS' (IST). Defaults to today at midnight."
                },
                "end_datetime_str": {
                    "type": "string",
                    "description": "End datetime in 'YYYY-MM-DD HH:MM:SS' (IST). Defaults to 7 days from start."
                }
            },
            "required": []
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let window: GetEventsInput = serde_json::from_value(input).map_err(|e| {
            cal_core::Error::ToolExecution(format!("Invalid input parameters: {}", e))
        })?;

        tracing::info!(
            start = window.start_datetime_str.as_deref().unwrap_or("<default>"),
            end = window.end_datetime_str.as_deref().unwrap_or("<default>"),
            "Listing events"
        );

        match self
            .calendar
            .list_events(
                window.start_datetime_str.as_deref(),
                window.end_datetime_str.as_deref(),
            )
            .await
        {
            Ok(events) => Ok(ToolResult::success(serde_json::to_string_pretty(&events)?)),
            Err(e) => Ok(ToolResult::error(format!("Failed to list events: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_means_default_window() {
        let parsed: GetEventsInput = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.start_datetime_str.is_none());
        assert!(parsed.end_datetime_str.is_none());
    }

    #[test]
    fn test_explicit_window_parses() {
        let parsed: GetEventsInput = serde_json::from_value(json!({
            "start_datetime_str": "2025-08-10 00:00:00",
            "end_datetime_str": "2025-08-12 00:00:00"
        }))
        .unwrap();
        assert_eq!(parsed.start_datetime_str.as_deref(), Some("2025-08-10 00:00:00"));
    }
}
