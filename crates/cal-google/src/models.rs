//! Wire models for the Google Calendar v3 and Tasks v1 APIs
//!
//! Unknown fields are preserved through a flattened map so that a
//! fetch-merge-write update round-trips everything the remote document
//! carries, not just the fields this gateway understands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::time;

/// Event start/end: either a timed instant or an all-day date
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// All-day events carry a date instead of a dateTime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl EventDateTime {
    /// Build a timed instant tagged with the assistant's timezone
    pub fn timed(instant: DateTime<Utc>) -> Self {
        Self {
            date_time: Some(instant.to_rfc3339()),
            time_zone: Some(time::TIMEZONE_NAME.to_string()),
            date: None,
        }
    }
}

/// Event attendee
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attendee {
    pub email: String,
}

/// Reminder configuration: remote default or explicit overrides
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    #[serde(default)]
    pub use_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<ReminderOverride>>,
}

impl Default for Reminders {
    fn default() -> Self {
        Self {
            use_default: true,
            overrides: None,
        }
    }
}

/// One explicit reminder: method and lead time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

/// Remote calendar event
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Remote-assigned identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub start: EventDateTime,
    #[serde(default)]
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
    /// Everything else the remote document carries
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Listing response for events
#[derive(Debug, Clone, Deserialize)]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<Event>,
}

/// Input for creating one event
///
/// Start and end are IST wall-clock strings (`YYYY-MM-DD HH:MM:SS`);
/// conversion happens when the payload is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInput {
    pub summary: String,
    /// Defaulted so a malformed batch entry fails at conversion, not at
    /// deserialization of the whole batch
    #[serde(default)]
    pub start_datetime_str: String,
    #[serde(default)]
    pub end_datetime_str: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
}

impl EventInput {
    /// Build the full event payload, converting wall-clock bounds to
    /// timezone-tagged instants. Fails on a malformed datetime string.
    pub fn to_event(&self) -> Result<Event> {
        let start = time::parse_ist(&self.start_datetime_str)?;
        let end = time::parse_ist(&self.end_datetime_str)?;

        Ok(Event {
            id: None,
            summary: self.summary.clone(),
            description: if self.description.is_empty() {
                None
            } else {
                Some(self.description.clone())
            },
            location: if self.location.is_empty() {
                None
            } else {
                Some(self.location.clone())
            },
            start: EventDateTime::timed(start),
            end: EventDateTime::timed(end),
            attendees: self.attendees.as_ref().map(|emails| {
                emails
                    .iter()
                    .map(|email| Attendee {
                        email: email.clone(),
                    })
                    .collect()
            }),
            reminders: Some(self.reminders.clone().unwrap_or_default()),
            extra: serde_json::Map::new(),
        })
    }
}

/// Typed partial update for an event
///
/// Only provided fields change; start/end arrive as IST strings and are
/// converted before merging, so a bare string can never replace the
/// structured `{dateTime, timeZone}` object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// New start, IST wall-clock string
    #[serde(default)]
    pub start_datetime_str: Option<String>,
    /// New end, IST wall-clock string
    #[serde(default)]
    pub end_datetime_str: Option<String>,
    #[serde(default)]
    pub attendees: Option<Vec<String>>,
    #[serde(default)]
    pub reminders: Option<Reminders>,
}

impl EventPatch {
    /// Merge this patch over a fetched event
    pub fn apply_to(&self, event: &mut Event) -> Result<()> {
        if let Some(summary) = &self.summary {
            event.summary = summary.clone();
        }
        if let Some(description) = &self.description {
            event.description = Some(description.clone());
        }
        if let Some(location) = &self.location {
            event.location = Some(location.clone());
        }
        if let Some(start) = &self.start_datetime_str {
            event.start = EventDateTime::timed(time::parse_ist(start)?);
        }
        if let Some(end) = &self.end_datetime_str {
            event.end = EventDateTime::timed(time::parse_ist(end)?);
        }
        if let Some(attendees) = &self.attendees {
            event.attendees = Some(
                attendees
                    .iter()
                    .map(|email| Attendee {
                        email: email.clone(),
                    })
                    .collect(),
            );
        }
        if let Some(reminders) = &self.reminders {
            event.reminders = Some(reminders.clone());
        }
        Ok(())
    }

    /// True when the patch sets nothing
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.start_datetime_str.is_none()
            && self.end_datetime_str.is_none()
            && self.attendees.is_none()
            && self.reminders.is_none()
    }
}

/// Outcome of one entry in a batch create
///
/// A failed entry keeps its position and carries the original input back so
/// the model can see which entry was rejected and why.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Created { event: Event },
    Failed { error: String, input: EventInput },
}

impl BatchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, BatchOutcome::Failed { .. })
    }
}

/// Remote task
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Due instant, RFC 3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Listing response for tasks
#[derive(Debug, Clone, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub items: Vec<Task>,
}

/// A task list container, from `users/@me/lists`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tasklist {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
}

/// Listing response for task list containers
#[derive(Debug, Clone, Deserialize)]
pub struct TasklistIndex {
    #[serde(default)]
    pub items: Vec<Tasklist>,
}

/// Typed partial update for a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// New due instant, RFC 3339, passed through without conversion
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl TaskPatch {
    /// Merge this patch over a fetched task
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(notes) = &self.notes {
            task.notes = Some(notes.clone());
        }
        if let Some(due) = &self.due {
            task.due = Some(due.clone());
        }
        if let Some(status) = &self.status {
            task.status = Some(status.clone());
        }
    }

    /// True when the patch sets nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.notes.is_none() && self.due.is_none() && self.status.is_none()
    }
}
