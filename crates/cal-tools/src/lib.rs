//! cal-tools: Built-in tools for cal-gateway
//!
//! This crate provides the calendar and task tools the model can invoke.

use cal_core::ToolManager;
use cal_google::{CalendarClient, SearchService, TasksClient};

pub mod create_event;
pub mod create_multiple_events;
pub mod edit_event;
pub mod edit_task;
pub mod get_events;
pub mod get_tasks;
pub mod search_events;
pub mod search_tasks;

pub use create_event::CreateEventTool;
pub use create_multiple_events::CreateMultipleEventsTool;
pub use edit_event::EditEventTool;
pub use edit_task::EditTaskTool;
pub use get_events::GetEventsTool;
pub use get_tasks::GetTasksTool;
pub use search_events::SearchEventsTool;
pub use search_tasks::SearchTasksTool;

use std::sync::Arc;

/// Register all default built-in tools with the tool manager.
///
/// The registry is static for process lifetime: these eight tools are
/// registered once at startup and never changed.
pub fn register_default_tools(
    manager: &mut ToolManager,
    calendar: Arc<CalendarClient>,
    tasks: Arc<TasksClient>,
    search: Arc<SearchService>,
) {
    manager.register(Arc::new(CreateEventTool::new(calendar.clone())));
    manager.register(Arc::new(CreateMultipleEventsTool::new(calendar.clone())));
    manager.register(Arc::new(EditEventTool::new(calendar.clone())));
    manager.register(Arc::new(GetEventsTool::new(calendar)));
    manager.register(Arc::new(GetTasksTool::new(tasks.clone())));
    manager.register(Arc::new(EditTaskTool::new(tasks)));
    manager.register(Arc::new(SearchEventsTool::new(search.clone())));
    manager.register(Arc::new(SearchTasksTool::new(search)));
}
