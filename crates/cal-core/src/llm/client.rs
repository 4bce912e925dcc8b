//! LLM API HTTP client
//!
//! Supports both the Claude Messages API and OpenAI-compatible APIs
//! (Gemini compat endpoint, GLM, etc.), and runs the tool-calling agent
//! loop on top of either.

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::{Config, LlmProvider};
use crate::error::{Error, Result};
use crate::tool::ToolManager;

use super::types::*;

/// Reply sent when the loop hits its iteration bound without a final answer.
const GIVE_UP_REPLY: &str =
    "I wasn't able to finish that request within the allowed number of tool calls. \
     Please try again with a more specific request.";

/// LLM API client
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    provider: LlmProvider,
}

impl LlmClient {
    /// Create a new LLM client
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(Error::Http)?;

        let llm_config = config.llm_config();

        let base_url = match &llm_config.base_url {
            Some(url) => url.clone(),
            None => match llm_config.provider {
                LlmProvider::Claude => "https://api.anthropic.com/v1".to_string(),
                LlmProvider::OpenAi => "https://api.openai.com/v1".to_string(),
            },
        };

        Ok(Self {
            client,
            api_key: llm_config.api_key.clone(),
            model: llm_config.model.clone(),
            base_url,
            provider: llm_config.provider.clone(),
        })
    }

    /// Create with custom base URL (for testing or custom endpoints)
    pub fn with_base_url(config: &Config, base_url: String) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url;
        Ok(client)
    }

    /// Send a single conversation to the model
    pub async fn messages(&self, request: MessagesRequest) -> Result<MessagesResponse> {
        match self.provider {
            LlmProvider::Claude => self.send_claude_request(request).await,
            LlmProvider::OpenAi => self.send_openai_request(request).await,
        }
    }

    async fn send_claude_request(&self, request: MessagesRequest) -> Result<MessagesResponse> {
        let url = format!("{}/messages", self.base_url);

        debug!("Sending request to Claude API: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Claude API error: {} - {}", status, body);
            return Err(Error::LlmApi(format!("{}: {}", status, body)));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| Error::LlmApi(format!("Failed to parse response: {} - {}", e, body)))?;

        info!(
            "Claude API response: stop_reason={:?}, tokens={}",
            parsed.stop_reason,
            parsed.usage.as_ref().map(|u| u.output_tokens).unwrap_or(0)
        );

        Ok(parsed)
    }

    async fn send_openai_request(&self, request: MessagesRequest) -> Result<MessagesResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!("Sending request to OpenAI-compatible API: {}", url);

        let openai_request = ChatCompletionRequest::from_messages_request(&request);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("OpenAI API error: {} - {}", status, body);
            return Err(Error::LlmApi(format!("{}: {}", status, body)));
        }

        let openai_response: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::LlmApi(format!("Failed to parse response: {} - {}", e, body)))?;

        let parsed = openai_response.to_messages_response();

        info!(
            "OpenAI API response: stop_reason={:?}, tokens={}",
            parsed.stop_reason,
            parsed.usage.as_ref().map(|u| u.output_tokens).unwrap_or(0)
        );

        Ok(parsed)
    }

    /// Create a messages request builder
    pub fn request_builder(&self) -> MessagesRequestBuilder {
        MessagesRequestBuilder::new(self.model.clone())
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the provider type
    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    /// Run the tool-calling agent loop.
    ///
    /// Submits the conversation to the model. While the model requests tools,
    /// executes exactly the requested tools through the registry, appends the
    /// tool-result turn, and resubmits. Terminates when the model produces a
    /// final text reply, or at `max_iterations` with a fixed give-up reply.
    ///
    /// Tool failures never abort the loop: they are returned to the model as
    /// error-flagged tool results so it can correct its arguments or report.
    pub async fn run_agent_loop(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: &ToolManager,
        max_iterations: usize,
        max_tokens: u64,
    ) -> Result<AgentLoopResult> {
        let mut current_messages = messages;
        let mut iterations = 0;
        let mut total_tokens = TokenUsage::default();
        let mut tool_calls = Vec::new();

        loop {
            iterations += 1;
            if iterations > max_iterations {
                warn!("Agent loop hit iteration bound ({})", max_iterations);
                current_messages.push(Message::assistant(GIVE_UP_REPLY));
                return Ok(AgentLoopResult {
                    final_response: GIVE_UP_REPLY.to_string(),
                    messages: current_messages,
                    iterations,
                    total_tokens,
                    tool_calls,
                });
            }

            let request = MessagesRequest {
                model: self.model.clone(),
                max_tokens,
                system: system.clone(),
                messages: current_messages.clone(),
                tools: Some(tools.definitions()),
            };

            let response = self.messages(request).await?;

            if let Some(usage) = &response.usage {
                total_tokens.input_tokens += usage.input_tokens;
                total_tokens.output_tokens += usage.output_tokens;
            }

            match response.stop_reason.as_str() {
                "end_turn" | "stop_sequence" | "stop" => {
                    let text = extract_text(&response.content);
                    current_messages.push(Message {
                        role: "assistant".to_string(),
                        content: response.content,
                    });

                    return Ok(AgentLoopResult {
                        final_response: text,
                        messages: current_messages,
                        iterations,
                        total_tokens,
                        tool_calls,
                    });
                }
                "tool_use" | "tool_calls" => {
                    let tool_uses: Vec<_> = response
                        .content
                        .iter()
                        .filter_map(|c| {
                            if let MessageContent::ToolUse { id, name, input } = c {
                                Some((id.clone(), name.clone(), input.clone()))
                            } else {
                                None
                            }
                        })
                        .collect();

                    if tool_uses.is_empty() {
                        warn!("tool_use stop_reason but no tool_uses found");
                        continue;
                    }

                    let mut tool_results = Vec::new();
                    for (id, name, input) in &tool_uses {
                        debug!("Executing tool: {} with input: {:?}", name, input);
                        let result = match tools.execute(name, input.clone()).await {
                            Ok(result) => result,
                            Err(e) => {
                                warn!("Tool {} failed: {}", name, e);
                                crate::tool::ToolResult::error(e.to_string())
                            }
                        };
                        tool_calls.push(ToolCall {
                            id: id.clone(),
                            name: name.clone(),
                            input: input.clone(),
                        });
                        tool_results.push(MessageContent::ToolResult {
                            tool_use_id: id.clone(),
                            content: result.output,
                            is_error: result.is_error,
                        });
                    }

                    // Assistant turn carrying the tool_use blocks
                    current_messages.push(Message {
                        role: "assistant".to_string(),
                        content: response.content.clone(),
                    });

                    // User turn carrying the tool results
                    current_messages.push(Message {
                        role: "user".to_string(),
                        content: tool_results,
                    });
                }
                other => {
                    warn!("Unknown stop_reason: {}", other);
                    return Err(Error::LlmApi(format!("Unknown stop_reason: {}", other)));
                }
            }
        }
    }
}

/// Result of agent loop execution
#[derive(Debug)]
pub struct AgentLoopResult {
    /// Final natural-language reply
    pub final_response: String,
    /// Full transcript: input turns plus everything appended during the loop
    pub messages: Vec<Message>,
    pub iterations: usize,
    pub total_tokens: TokenUsage,
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Record of a tool invocation made during the loop
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{Tool, ToolResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes its input back"
        }

        fn input_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }

        async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
            Ok(ToolResult::success(
                input["text"].as_str().unwrap_or("").to_string(),
            ))
        }
    }

    fn end_turn_body(text: &str) -> serde_json::Value {
        json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 4}
        })
    }

    fn tool_use_body() -> serde_json::Value {
        json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{
                "type": "tool_use",
                "id": "tu_1",
                "name": "echo",
                "input": {"text": "ping"}
            }],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 6}
        })
    }

    #[tokio::test]
    async fn test_agent_loop_returns_on_end_turn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(end_turn_body("All done.")))
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::with_base_url(&Config::default(), server.uri()).unwrap();
        let tools = ToolManager::new();

        let result = client
            .run_agent_loop(vec![Message::user("hi")], None, &tools, 5, 1024)
            .await
            .unwrap();

        assert_eq!(result.final_response, "All done.");
        assert_eq!(result.iterations, 1);
        assert!(result.tool_calls.is_empty());
        assert_eq!(result.total_tokens.output_tokens, 4);
    }

    #[tokio::test]
    async fn test_agent_loop_executes_requested_tool_then_finishes() {
        let server = MockServer::start().await;
        // First round asks for the tool, second round ends the turn
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_use_body()))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(end_turn_body("pong")))
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::with_base_url(&Config::default(), server.uri()).unwrap();
        let mut tools = ToolManager::new();
        tools.register(Arc::new(EchoTool));

        let result = client
            .run_agent_loop(vec![Message::user("ping?")], None, &tools, 5, 1024)
            .await
            .unwrap();

        assert_eq!(result.final_response, "pong");
        assert_eq!(result.iterations, 2);
        assert_eq!(result.tool_calls.len(), 1);
        assert_eq!(result.tool_calls[0].name, "echo");

        // Transcript carries the tool_use turn and the tool-result turn
        let roles: Vec<&str> = result.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "assistant", "user", "assistant"]);
    }

    #[tokio::test]
    async fn test_agent_loop_gives_up_at_iteration_bound() {
        let server = MockServer::start().await;
        // The model never stops asking for tools
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_use_body()))
            .mount(&server)
            .await;

        let client = LlmClient::with_base_url(&Config::default(), server.uri()).unwrap();
        let mut tools = ToolManager::new();
        tools.register(Arc::new(EchoTool));

        let result = client
            .run_agent_loop(vec![Message::user("loop")], None, &tools, 2, 1024)
            .await
            .unwrap();

        assert_eq!(result.final_response, GIVE_UP_REPLY);
        assert_eq!(result.messages.last().unwrap().role, "assistant");
    }
}
