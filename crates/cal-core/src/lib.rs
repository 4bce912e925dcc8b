//! cal-core: Calendar Assistant Gateway Core Library
//!
//! Provides the LLM client with its tool-calling agent loop, the tool
//! registry, session management, configuration, and the system policy.

pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod session;
pub mod tool;

pub use config::{AgentConfig, ApiConfig, Config, GoogleConfig, LlmConfig, LlmProvider, MemoryConfig};
pub use error::{Error, Result};
pub use llm::{AgentLoopResult, LlmClient, Message, MessageContent, ToolDefinition};
pub use prompt::system_prompt;
pub use session::{Session, SessionManager, SessionStore};
pub use tool::{Tool, ToolManager, ToolResult};
