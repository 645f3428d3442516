use tracing::Instrument;

use crate::agent::chat::{ChatCompletion, ChatMessage, ToolCall, ToolExecutor, ToolSpec};
use crate::error::{ChatError, ToolCallError};

pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful weather assistant with access to weather tools.\n\
When users ask about weather, use the available tools to get real-time data.\n\
Provide clear, friendly responses with the weather information.";

/// Upper bound on model -> tools -> model rounds within one user turn
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

enum RelayState {
    AwaitingModel,
    AwaitingToolResults(Vec<ToolCall>),
}

pub struct RelayLoop<C, T> {
    chat: C,
    tools: T,
    tool_specs: Vec<ToolSpec>,
    history: Vec<ChatMessage>,
    max_tool_rounds: usize,
}

impl<C, T> RelayLoop<C, T>
where
    C: ChatCompletion,
    T: ToolExecutor,
{
    /// Fetches the tool list once and starts a history with the default instructions
    #[tracing::instrument(name = "initialize_agent", skip_all)]
    pub async fn start(chat: C, tools: T) -> Result<Self, ToolCallError> {
        let tool_specs = tools.list_tools().await?;
        tracing::info!(
            tools = ?tool_specs.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "Relay loop ready"
        );

        Ok(Self {
            chat,
            tools,
            tool_specs,
            history: vec![ChatMessage::system(DEFAULT_INSTRUCTIONS)],
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        })
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.history[0] = ChatMessage::system(instructions);
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn tool_specs(&self) -> &[ToolSpec] {
        &self.tool_specs
    }

    /// Ends the session, handing back the executor so it can be shut down
    pub fn into_tools(self) -> T {
        self.tools
    }

    /// Runs one user turn and returns the model's final text
    pub async fn run_turn(&mut self, user_text: &str) -> Result<String, ChatError> {
        let span = tracing::info_span!(
            "process_query",
            query = %user_text.chars().take(100).collect::<String>(),
            result_length = tracing::field::Empty,
            status = tracing::field::Empty,
        );

        let result = self.relay(user_text).instrument(span.clone()).await;
        match &result {
            Ok(text) => {
                span.record("result_length", text.len());
                span.record("status", "success");
            }
            Err(e) => {
                span.record("status", "error");
                tracing::warn!(parent: &span, error = %e, "Query failed");
            }
        }
        result
    }

    async fn relay(&mut self, user_text: &str) -> Result<String, ChatError> {
        self.history.push(ChatMessage::user(user_text));

        let mut state = RelayState::AwaitingModel;
        let mut rounds = 0;

        loop {
            state = match state {
                RelayState::AwaitingModel => {
                    let completion = self.chat.complete(&self.history, &self.tool_specs).await?;

                    if completion.tool_calls.is_empty() {
                        let text = completion.text.unwrap_or_default();
                        self.history.push(ChatMessage::assistant(text.clone()));
                        return Ok(text);
                    }

                    rounds += 1;
                    if rounds > self.max_tool_rounds {
                        return Err(ChatError::TooManyToolRounds(self.max_tool_rounds));
                    }

                    self.history.push(ChatMessage::assistant_tool_calls(
                        completion.text,
                        completion.tool_calls.clone(),
                    ));
                    RelayState::AwaitingToolResults(completion.tool_calls)
                }
                RelayState::AwaitingToolResults(calls) => {
                    for call in calls {
                        tracing::debug!(tool = %call.name, "Forwarding tool call");
                        let output = match self.tools.call_tool(&call.name, &call.arguments).await {
                            Ok(output) => output,
                            Err(e) => {
                                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                                format!("Error: {e}")
                            }
                        };
                        self.history.push(ChatMessage::tool_result(call.id, output));
                    }
                    RelayState::AwaitingModel
                }
            };
        }
    }
}
