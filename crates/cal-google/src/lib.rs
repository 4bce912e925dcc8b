//! cal-google: Google Calendar and Tasks gateways for cal-gateway
//!
//! Thin wrappers over the Google Calendar v3 and Tasks v1 REST APIs behind
//! stable function signatures. The remote service is the sole source of
//! truth: nothing is cached locally, every read re-fetches.
//!
//! ## Components
//!
//! - [`auth::TokenProvider`]: stored OAuth token with refresh-on-demand
//! - [`time`]: fixed-offset IST wall-clock parsing to UTC instants
//! - [`fuzzy`]: substring-biased similarity scoring for search
//! - [`calendar::CalendarClient`] / [`tasks::TasksClient`]: REST gateways
//! - [`search::SearchService`]: fuzzy "find by approximate name" queries

pub mod auth;
pub mod calendar;
pub mod error;
pub mod fuzzy;
pub mod models;
pub mod search;
pub mod tasks;
pub mod time;

pub use auth::TokenProvider;
pub use calendar::CalendarClient;
pub use error::{GoogleError, Result};
pub use models::{
    Attendee, BatchOutcome, Event, EventDateTime, EventInput, EventPatch, Reminders, Task,
    TaskPatch, Tasklist,
};
pub use search::{SearchHit, SearchService};
pub use tasks::TasksClient;
