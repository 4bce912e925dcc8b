//! Tool for creating several calendar events in one call

use std::sync::Arc;

use async_trait::async_trait;
use cal_core::{Result, Tool, ToolResult};
use cal_google::{CalendarClient, EventInput};
use serde::Deserialize;
use serde_json::{json, Value};

/// Create a batch of events, isolating per-entry failures
pub struct CreateMultipleEventsTool {
    calendar: Arc<CalendarClient>,
}

impl CreateMultipleEventsTool {
    pub fn new(calendar: Arc<CalendarClient>) -> Self {
        Self { calendar }
    }
}

#[derive(Debug, Deserialize)]
struct BatchInput {
    events: Vec<EventInput>,
}

#[async_trait]
impl Tool for CreateMultipleEventsTool {
    fn name(&self) -> &str {
        "create_multiple_events"
    }

    fn description(&self) -> &str {
        "Creates multiple calendar events in one call. Each entry has the same shape as create_event. Entries are created independently: a malformed or failed entry is reported at its position without failing the rest of the batch."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "events": {
                    "type": "array",
                    "description": "Events to create, each with the create_event shape",
                    "items": {
                        "type": "object",
                        "properties": {
                            "summary": { "type": "string" },
                            "start_datetime_str": {
                                "type": "string",
                                "description": "Start datetime in 'YYYY-MM-DD HH:MM:SS' (IST)"
                            },
                            "end_datetime_str": {
                                "type": "string",
                                "description": "End datetime in 'YYYY-MM-DD HH:MM:SS' (IST)"
                            },
                            "description": { "type": "string" },
                            "location": { "type": "string" },
                            "attendees": {
                                "type": "array",
                                "items": { "type": "string" }
                            },
                            "reminders": { "type": "object" }
                        },
                        "required": ["summary", "start_datetime_str", "end_datetime_str"]
                    }
                }
            },
            "required": ["events"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let batch: BatchInput = serde_json::from_value(input).map_err(|e| {
            cal_core::Error::ToolExecution(format!("Invalid input parameters: {}", e))
        })?;

        if batch.events.is_empty() {
            return Ok(ToolResult::error("No events provided"));
        }

        tracing::info!(count = batch.events.len(), "Creating event batch");

        let outcomes = self.calendar.create_events(&batch.events).await;
        let failed = outcomes.iter().filter(|o| o.is_failed()).count();
        if failed > 0 {
            tracing::warn!(failed, total = outcomes.len(), "Batch completed with failures");
        }

        Ok(ToolResult::success(serde_json::to_string_pretty(&outcomes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_input_parsing() {
        let input = json!({
            "events": [
                {
                    "summary": "A",
                    "start_datetime_str": "2025-08-10 09:00:00",
                    "end_datetime_str": "2025-08-10 10:00:00"
                },
                {
                    "summary": "B",
                    "start_datetime_str": "2025-08-10 11:00:00",
                    "end_datetime_str": "2025-08-10 12:00:00",
                    "location": "Office"
                }
            ]
        });

        let parsed: BatchInput = serde_json::from_value(input).unwrap();
        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.events[1].location, "Office");
    }

    #[test]
    fn test_batch_input_rejects_missing_events_key() {
        let input = json!({ "items": [] });
        assert!(serde_json::from_value::<BatchInput>(input).is_err());
    }
}
