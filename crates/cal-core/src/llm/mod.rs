//! LLM client and message types

pub mod client;
pub mod types;

pub use client::{AgentLoopResult, LlmClient, TokenUsage, ToolCall};
pub use types::{
    extract_text, split_system, Message, MessageContent, MessagesRequest,
    MessagesRequestBuilder, MessagesResponse, ToolDefinition, Usage,
};
