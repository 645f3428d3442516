use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::chat::{ChatCompletion, ChatMessage, Completion, Role, ToolCall, ToolSpec};
use crate::config::AgentConfig;
use crate::error::ChatError;

/// Chat client for an Azure OpenAI deployment
pub struct AzureOpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
}

impl AzureOpenAiClient {
    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            deployment: deployment.into(),
            api_version: api_version.into(),
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            &config.azure_openai_endpoint,
            config.azure_openai_api_key.clone(),
            config.azure_openai_deployment_name.clone(),
            config.azure_openai_api_version.clone(),
        )
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint, self.deployment
        )
    }
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: WireFunction<'a>,
}

#[derive(Debug, Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded argument object
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    message: String,
}

fn to_wire(message: &ChatMessage) -> WireMessage {
    let tool_calls = (!message.tool_calls.is_empty()).then(|| {
        message
            .tool_calls
            .iter()
            .map(|call| WireToolCall {
                id: call.id.clone(),
                call_type: function_type(),
                function: WireFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect()
    });

    WireMessage {
        role: message.role,
        content: message.content.clone(),
        tool_call_id: message.tool_call_id.clone(),
        tool_calls,
    }
}

/// Decodes model-supplied arguments; anything but a JSON object becomes `{}`
fn parse_arguments(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::Object(Map::new()),
    }
}

#[async_trait]
impl ChatCompletion for AzureOpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<Completion, ChatError> {
        let request = WireRequest {
            messages: messages.iter().map(to_wire).collect(),
            tools: tools
                .iter()
                .map(|tool| WireTool {
                    tool_type: "function",
                    function: WireFunction {
                        name: &tool.name,
                        description: &tool.description,
                        parameters: &tool.parameters,
                    },
                })
                .collect(),
            tool_choice: (!tools.is_empty()).then_some("auto"),
        };

        let response = self
            .client
            .post(self.completions_url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<WireError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ChatError::Api { status, message });
        }

        let body: WireResponse = response.json().await?;
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or(ChatError::EmptyResponse)?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: parse_arguments(&call.function.arguments),
            })
            .collect();

        Ok(Completion {
            text: choice.message.content,
            tool_calls,
        })
    }
}
