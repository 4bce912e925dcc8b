//! Tool for creating a single calendar event

use std::sync::Arc;

use async_trait::async_trait;
use cal_core::{Result, Tool, ToolResult};
use cal_google::{CalendarClient, EventInput};
use serde_json::{json, Value};

/// Create one event in the configured calendar
pub struct CreateEventTool {
    calendar: Arc<CalendarClient>,
}

impl CreateEventTool {
    pub fn new(calendar: Arc<CalendarClient>) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl Tool for CreateEventTool {
    fn name(&self) -> &str {
        "create_event"
    }

    fn description(&self) -> &str {
        "Creates a new event in the calendar. Start and end datetimes are IST strings in 'YYYY-MM-DD HH:MM:SS' format. Returns the created event resource."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "Event title"
                },
                "start_datetime_str": {
                    "type": "string",
                    "description": "Start datetime in 'YYYY-MM-DD HH:MM:SS' (IST)"
                },
                "end_datetime_str": {
                    "type": "string",
                    "description": "End datetime in 'YYYY-MM-DD HH:MM:SS' (IST)"
                },
                "description": {
                    "type": "string",
                    "description": "Event description"
                },
                "location": {
                    "type": "string",
                    "description": "Event location"
                },
                "attendees": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "List of attendee email addresses"
                },
                "reminders": {
                    "type": "object",
                    "description": "Reminder configuration, e.g. {\"useDefault\": true} or {\"useDefault\": false, \"overrides\": [{\"method\": \"popup\", \"minutes\": 10}]}"
                }
            },
            "required": ["summary", "start_datetime_str", "end_datetime_str"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let event_input: EventInput = serde_json::from_value(input).map_err(|e| {
            cal_core::Error::ToolExecution(format!("Invalid input parameters: {}", e))
        })?;

        tracing::info!(summary = %event_input.summary, "Creating event");

        match self.calendar.create_event(&event_input).await {
            Ok(event) => Ok(ToolResult::success(serde_json::to_string_pretty(&event)?)),
            Err(e) => Ok(ToolResult::error(format!("Failed to create event: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_parsing_with_optional_fields_absent() {
        let input = json!({
            "summary": "Standup",
            "start_datetime_str": "2025-08-10 09:00:00",
            "end_datetime_str": "2025-08-10 09:30:00"
        });

        let parsed: EventInput = serde_json::from_value(input).unwrap();
        assert_eq!(parsed.summary, "Standup");
        assert!(parsed.description.is_empty());
        assert!(parsed.attendees.is_none());
        assert!(parsed.reminders.is_none());
    }

    #[test]
    fn test_missing_datetime_fails_at_conversion() {
        // The schema marks the datetimes required, but a model that omits
        // one still gets a per-call error rather than a deserialization
        // failure of the whole input.
        let input = json!({ "summary": "Standup" });
        let parsed: EventInput = serde_json::from_value(input).unwrap();
        assert!(parsed.to_event().is_err());
    }

    #[test]
    fn test_input_parsing_accepts_reminder_overrides() {
        let input = json!({
            "summary": "Dentist",
            "start_datetime_str": "2025-08-11 15:00:00",
            "end_datetime_str": "2025-08-11 16:00:00",
            "reminders": {
                "useDefault": false,
                "overrides": [{"method": "popup", "minutes": 30}]
            }
        });

        let parsed: EventInput = serde_json::from_value(input).unwrap();
        let reminders = parsed.reminders.unwrap();
        assert!(!reminders.use_default);
        assert_eq!(reminders.overrides.unwrap()[0].minutes, 30);
    }
}
