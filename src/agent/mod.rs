pub mod azure;
pub mod chat;
pub mod mcp;
pub mod relay;

pub use azure::AzureOpenAiClient;
pub use chat::{ChatCompletion, ChatMessage, Completion, Role, ToolCall, ToolExecutor, ToolSpec};
pub use mcp::{McpToolExecutor, ServerTarget};
pub use relay::RelayLoop;
