//! Google Calendar v3 client

use std::sync::Arc;

use chrono::Utc;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};

use crate::auth::TokenProvider;
use crate::error::{GoogleError, Result};
use crate::models::{BatchOutcome, Event, EventInput, EventList, EventPatch};
use crate::time;

const CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Calendar gateway: list, create, and update events in one configured
/// calendar. Stateless besides the shared credential; the remote calendar is
/// the source of truth.
pub struct CalendarClient {
    client: Client,
    auth: Arc<TokenProvider>,
    calendar_id: String,
    base_url: String,
}

impl CalendarClient {
    /// Create a new calendar client for the given calendar container
    pub fn new(auth: Arc<TokenProvider>, calendar_id: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        let calendar_id = calendar_id.into();
        info!("Calendar client initialized for: {}", calendar_id);

        Ok(Self {
            client,
            auth,
            calendar_id,
            base_url: CALENDAR_BASE_URL.to_string(),
        })
    }

    /// Override the API base URL (for testing or a proxy)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, self.calendar_id)
    }

    /// List events in a window, ascending by start time, recurring events
    /// expanded to single occurrences.
    ///
    /// An omitted start defaults to IST midnight today; an omitted end to
    /// start + 7 days.
    pub async fn list_events(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Event>> {
        let (time_min, time_max) = time::resolve_window(start, end, Utc::now())?;

        let bearer = self.auth.bearer().await?;

        debug!(
            "Listing events in [{}, {}]",
            time_min.to_rfc3339(),
            time_max.to_rfc3339()
        );

        let response = self
            .client
            .get(self.events_url())
            .bearer_auth(&bearer)
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        let listing: EventList = Self::read_json(response, "list events").await?;

        info!("Fetched {} events", listing.items.len());
        Ok(listing.items)
    }

    /// Create a new event and return its remote representation.
    ///
    /// No idempotency check: duplicate creation is possible and left to the
    /// caller to detect via search.
    pub async fn create_event(&self, input: &EventInput) -> Result<Event> {
        let event = input.to_event()?;
        let bearer = self.auth.bearer().await?;

        debug!("Creating event: {}", event.summary);

        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(&bearer)
            .json(&event)
            .send()
            .await
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        let created: Event = Self::read_json(response, "create event").await?;

        info!("Created event: {}", created.id.as_deref().unwrap_or("?"));
        Ok(created)
    }

    /// Create several events, isolating per-entry failures.
    ///
    /// Each entry is attempted independently; a failure is recorded as a
    /// [`BatchOutcome::Failed`] at that position and the batch continues.
    pub async fn create_events(&self, inputs: &[EventInput]) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(inputs.len());

        for input in inputs {
            match self.create_event(input).await {
                Ok(event) => outcomes.push(BatchOutcome::Created { event }),
                Err(e) => {
                    error!("Batch entry failed ({}): {}", input.summary, e);
                    outcomes.push(BatchOutcome::Failed {
                        error: e.to_string(),
                        input: input.clone(),
                    });
                }
            }
        }

        outcomes
    }

    /// Fetch a single event by id
    pub async fn get_event(&self, event_id: &str) -> Result<Event> {
        let bearer = self.auth.bearer().await?;

        let response = self
            .client
            .get(format!("{}/{}", self.events_url(), event_id))
            .bearer_auth(&bearer)
            .send()
            .await
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GoogleError::NotFound(format!("event {}", event_id)));
        }

        Self::read_json(response, "get event").await
    }

    /// Update an event by id: fetch, merge the typed patch, write back.
    ///
    /// Fails with [`GoogleError::NotFound`] before any write when the id does
    /// not exist remotely.
    pub async fn update_event(&self, event_id: &str, patch: &EventPatch) -> Result<Event> {
        let mut event = self.get_event(event_id).await?;
        patch.apply_to(&mut event)?;

        let bearer = self.auth.bearer().await?;

        debug!("Updating event: {}", event_id);

        let response = self
            .client
            .put(format!("{}/{}", self.events_url(), event_id))
            .bearer_auth(&bearer)
            .json(&event)
            .send()
            .await
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        let updated: Event = Self::read_json(response, "update event").await?;

        info!("Updated event: {}", event_id);
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
            error!("Calendar API {} failed: {} - {}", context, status, body);
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
    use serde_json::json;
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
    async fn test_update_nonexistent_event_fails_without_a_write() {
        let server = MockServer::start().await;
        let (auth, _token_file) = test_auth();

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events/ev-missing"))
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

        let client = CalendarClient::new(auth, "primary")
            .unwrap()
            .with_base_url(server.uri());

        let patch = EventPatch {
            summary: Some("renamed".to_string()),
            ..Default::default()
        };
        let err = client.update_event("ev-missing", &patch).await.unwrap_err();
        assert!(matches!(err, GoogleError::NotFound(_)));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_list_events_maps_unauthorized_to_auth_error() {
        let server = MockServer::start().await;
        let (auth, _token_file) = test_auth();

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Credentials"))
            .mount(&server)
            .await;

        let client = CalendarClient::new(auth, "primary")
            .unwrap()
            .with_base_url(server.uri());

        let err = client
            .list_events(Some("2025-08-10 00:00:00"), Some("2025-08-11 00:00:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, GoogleError::Auth(_)));
    }

    #[test]
    fn test_event_list_parses_google_response() {
        let body = json!({
            "kind": "calendar#events",
            "items": [
                {
                    "id": "e1",
                    "summary": "Standup",
                    "start": {"dateTime": "2025-08-10T03:30:00Z"},
                    "end": {"dateTime": "2025-08-10T04:00:00Z"}
                },
                {
                    "id": "e2",
                    "summary": "Review",
                    "start": {"dateTime": "2025-08-10T09:30:00Z"},
                    "end": {"dateTime": "2025-08-10T10:00:00Z"}
                }
            ]
        });

        let listing: EventList = serde_json::from_value(body).unwrap();
        assert_eq!(listing.items.len(), 2);
        assert_eq!(listing.items[0].summary, "Standup");
    }

    #[test]
    fn test_event_list_tolerates_empty_listing() {
        // Google omits `items` entirely when the window is empty
        let listing: EventList = serde_json::from_value(json!({"kind": "calendar#events"})).unwrap();
        assert!(listing.items.is_empty());
    }

    #[test]
    fn test_batch_payload_failure_is_positional() {
        // The per-entry conversion is the pure half of create_events: a
        // malformed entry fails at this step while its neighbors build fine.
        let inputs = vec![
            EventInput {
                summary: "ok-1".to_string(),
                start_datetime_str: "2025-08-10 09:00:00".to_string(),
                end_datetime_str: "2025-08-10 10:00:00".to_string(),
                description: String::new(),
                location: String::new(),
                attendees: None,
                reminders: None,
            },
            EventInput {
                summary: "broken".to_string(),
                start_datetime_str: String::new(), // missing required field
                end_datetime_str: "2025-08-10 12:00:00".to_string(),
                description: String::new(),
                location: String::new(),
                attendees: None,
                reminders: None,
            },
            EventInput {
                summary: "ok-3".to_string(),
                start_datetime_str: "2025-08-10 13:00:00".to_string(),
                end_datetime_str: "2025-08-10 14:00:00".to_string(),
                description: String::new(),
                location: String::new(),
                attendees: None,
                reminders: None,
            },
        ];

        let results: Vec<_> = inputs.iter().map(|i| i.to_event()).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
