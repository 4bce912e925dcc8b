//! Fuzzy name search over events and tasks

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::calendar::CalendarClient;
use crate::error::Result;
use crate::fuzzy::partial_ratio;
use crate::models::{Event, Task};
use crate::tasks::TasksClient;

/// Default minimum score for an event to count as a match
pub const EVENT_SCORE_THRESHOLD: u8 = 65;
/// Default number of event matches returned
pub const EVENT_TOP_K: usize = 5;
/// Default minimum score for a task to count as a match
pub const TASK_SCORE_CUTOFF: u8 = 50;
/// Default number of task matches returned
pub const TASK_TOP_N: usize = 5;

/// A scored match. Higher scores are better; 100 means the query appears
/// verbatim (case-insensitively) inside the title.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<T> {
    pub score: u8,
    #[serde(flatten)]
    pub item: T,
}

/// Name-based lookup over the calendar and task list.
///
/// Listing happens through the underlying clients; scoring and ranking are
/// local. An empty listing is an empty result, not an error.
pub struct SearchService {
    calendar: Arc<CalendarClient>,
    tasks: Arc<TasksClient>,
}

impl SearchService {
    pub fn new(calendar: Arc<CalendarClient>, tasks: Arc<TasksClient>) -> Self {
        Self { calendar, tasks }
    }

    /// Find events whose summary fuzzily matches `name` inside a time window.
    ///
    /// Window defaults follow [`CalendarClient::list_events`]. Results are
    /// sorted by descending score; ties keep the listing's chronological
    /// order.
    pub async fn search_events(
        &self,
        name: &str,
        start: Option<&str>,
        end: Option<&str>,
        threshold: Option<u8>,
        top_k: Option<usize>,
    ) -> Result<Vec<SearchHit<Event>>> {
        let threshold = threshold.unwrap_or(EVENT_SCORE_THRESHOLD);
        let top_k = top_k.unwrap_or(EVENT_TOP_K);

        let events = self.calendar.list_events(start, end).await?;
        if events.is_empty() {
            debug!("No events in window; nothing to match against");
            return Ok(Vec::new());
        }

        let hits = rank(events, |e| &e.summary, name, threshold, top_k);
        info!("Event search for {:?} matched {} events", name, hits.len());
        Ok(hits)
    }

    /// Find tasks whose title fuzzily matches `query`.
    ///
    /// A listing failure propagates; search never papers over a gateway
    /// error with an empty result.
    pub async fn search_tasks(
        &self,
        query: &str,
        top_n: Option<usize>,
        score_cutoff: Option<u8>,
    ) -> Result<Vec<SearchHit<Task>>> {
        let top_n = top_n.unwrap_or(TASK_TOP_N);
        let score_cutoff = score_cutoff.unwrap_or(TASK_SCORE_CUTOFF);

        let tasks = self.tasks.list_tasks().await?;

        let hits = rank(tasks, |t| &t.title, query, score_cutoff, top_n);
        info!("Task search for {:?} matched {} tasks", query, hits.len());
        Ok(hits)
    }
}

/// Score each item's title against the query, drop those below the cutoff,
/// and keep the top `limit` by descending score.
///
/// The sort is stable, so equally-scored items stay in listing order.
fn rank<T, F>(items: Vec<T>, title: F, query: &str, cutoff: u8, limit: usize) -> Vec<SearchHit<T>>
where
    F: Fn(&T) -> &str,
{
    let mut hits: Vec<SearchHit<T>> = items
        .into_iter()
        .filter_map(|item| {
            let score = partial_ratio(query, title(&item));
            (score >= cutoff).then_some(SearchHit { score, item })
        })
        .collect();

    hits.sort_by_key(|h| std::cmp::Reverse(h.score));
    hits.truncate(limit);
    hits
}
