//! Tool system
//!
//! The registry of operations the model may invoke instead of replying
//! directly. Tools are registered once at startup and fixed for the
//! process lifetime.

pub mod manager;
pub mod traits;

pub use manager::ToolManager;
pub use traits::{Tool, ToolResult};
