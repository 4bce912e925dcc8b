//! Tool for updating an existing calendar event by id

use std::sync::Arc;

use async_trait::async_trait;
use cal_core::{Result, Tool, ToolResult};
use cal_google::{CalendarClient, EventPatch, GoogleError};
use serde::Deserialize;
use serde_json::{json, Value};

/// Apply a partial update to one event
pub struct EditEventTool {
    calendar: Arc<CalendarClient>,
}

impl EditEventTool {
    pub fn new(calendar: Arc<CalendarClient>) -> Self {
        Self { calendar }
    }
}

#[derive(Debug, Deserialize)]
struct EditEventInput {
    event_id: String,
    updated_fields: EventPatch,
}

#[async_trait]
impl Tool for EditEventTool {
    fn name(&self) -> &str {
        "edit_event_by_id"
    }

    fn description(&self) -> &str {
        "Updates an existing calendar event by its id. Only the fields present in updated_fields change; start/end datetimes are IST strings in 'YYYY-MM-DD HH:MM:SS' format. Returns the updated event resource."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "event_id": {
                    "type": "string",
                    "description": "Id of the event to update"
                },
                "updated_fields": {
                    "type": "object",
                    "description": "Fields to change",
                    "properties": {
                        "summary": { "type": "string" },
                        "description": { "type": "string" },
                        "location": { "type": "string" },
                        "start_datetime_str": {
                            "type": "string",
                            "description": "New start datetime in 'YYYY-MM-DD HH:MM:SS' (IST)"
                        },
                        "end_datetime_str": {
                            "type": "string",
                            "description": "New end datetime in 'YYYY-MM-DD HH:MM:SS' (IST)"
                        },
                        "attendees": {
                            "type": "array",
                            "items": { "type": "string" }
                        },
                        "reminders": { "type": "object" }
                    }
                }
            },
            "required": ["event_id", "updated_fields"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let edit: EditEventInput = serde_json::from_value(input).map_err(|e| {
            cal_core::Error::ToolExecution(format!("Invalid input parameters: {}", e))
        })?;

        if edit.updated_fields.is_empty() {
            return Ok(ToolResult::error("No fields to update"));
        }

        tracing::info!(event_id = %edit.event_id, "Updating event");

        match self
            .calendar
            .update_event(&edit.event_id, &edit.updated_fields)
            .await
        {
            Ok(event) => Ok(ToolResult::success(serde_json::to_string_pretty(&event)?)),
            Err(GoogleError::NotFound(what)) => {
                Ok(ToolResult::error(format!("Not found: {}", what)))
            }
            Err(e) => Ok(ToolResult::error(format!("Failed to update event: {}", e))),
        }
    }
}
