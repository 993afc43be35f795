// SPDX-License-Identifier: MIT

//! Mistral Model - chat-completions API implementation

use super::{Content, GenerationConfig, Model, Part};
use crate::adk::error::{AssistantError, ModelError, Result};
use crate::adk::tool::Tool;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

const PROVIDER: &str = "Mistral";

/// Mistral chat model
pub struct MistralModel {
    client: Client,
    api_key: String,
    model_name: String,
    endpoint: Url,
}

impl MistralModel {
    /// Create a new MistralModel against `base_url` (e.g. `https://api.mistral.ai/v1/`)
    pub fn new(api_key: String, model_name: String, base_url: &Url) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ModelError::ApiKeyMissing(PROVIDER.to_string()).into());
        }
        let endpoint = base_url
            .join("chat/completions")
            .map_err(|e| AssistantError::config(format!("invalid Mistral base URL: {}", e)))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
            endpoint,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Convert internal Content to a chat-completions message
    fn to_message(content: &Content) -> Value {
        let role = match content.role.as_str() {
            "model" => "assistant",
            other => other,
        };

        for part in &content.parts {
            if let Part::FunctionResponse { id, name, response } = part {
                return json!({
                    "role": "tool",
                    "name": name,
                    "tool_call_id": id.as_deref().unwrap_or(name),
                    "content": serde_json::to_string(response).unwrap_or_default()
                });
            }
        }

        let mut tool_calls = Vec::new();
        let mut text_content = String::new();

        for part in &content.parts {
            match part {
                Part::Text(t) => text_content.push_str(t),
                Part::FunctionCall { id, name, args } => {
                    tool_calls.push(json!({
                        "id": id.as_deref().unwrap_or(name),
                        "type": "function",
                        "function": {
                            "name": name,
                            "arguments": serde_json::to_string(args).unwrap_or_default()
                        }
                    }));
                }
                Part::FunctionResponse { .. } => {}
            }
        }

        if tool_calls.is_empty() {
            json!({ "role": role, "content": text_content })
        } else {
            json!({
                "role": role,
                "content": text_content,
                "tool_calls": tool_calls
            })
        }
    }

    fn tool_definitions(tools: &[Arc<dyn Tool>]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.schema()
                    }
                })
            })
            .collect()
    }

    fn parse_response(response: &Value) -> Result<Content> {
        let message = response["choices"]
            .as_array()
            .and_then(|c| c.first())
            .map(|choice| &choice["message"])
            .ok_or_else(|| ModelError::InvalidResponse("no choices in response".to_string()))?;

        let mut parts = Vec::new();

        if let Some(content) = message["content"].as_str() {
            if !content.is_empty() {
                parts.push(Part::Text(content.to_string()));
            }
        }

        if let Some(tool_calls) = message["tool_calls"].as_array() {
            for tc in tool_calls {
                let name = tc["function"]["name"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                // Mistral sends arguments either as a JSON string or an object
                let args = match &tc["function"]["arguments"] {
                    Value::String(s) => serde_json::from_str(s).unwrap_or(json!({})),
                    Value::Null => json!({}),
                    other => other.clone(),
                };
                parts.push(Part::FunctionCall {
                    id: tc["id"].as_str().map(str::to_string),
                    name,
                    args,
                });
            }
        }

        Ok(Content {
            role: "model".to_string(),
            parts,
        })
    }

    fn request_body(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Value {
        let messages: Vec<Value> = history.iter().map(Self::to_message).collect();

        let mut body = json!({
            "model": self.model_name,
            "messages": messages
        });

        if let Some(cfg) = config {
            if let Some(temp) = cfg.temperature {
                body["temperature"] = json!(temp);
            }
            if let Some(max_tokens) = cfg.max_output_tokens {
                body["max_tokens"] = json!(max_tokens);
            }
            if let Some(top_p) = cfg.top_p {
                body["top_p"] = json!(top_p);
            }
        }

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            body["tools"] = json!(Self::tool_definitions(tools));
            body["tool_choice"] = json!("auto");
        }

        body
    }
}

#[async_trait]
impl Model for MistralModel {
    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content> {
        let body = self.request_body(history, config, tools);

        log::debug!(
            "Mistral request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await?;
            return Err(AssistantError::api(PROVIDER, format!("{}: {}", status, text)));
        }

        let resp_json: Value = resp.json().await?;
        log::debug!("Mistral response: {}", resp_json);

        Self::parse_response(&resp_json)
    }
}
