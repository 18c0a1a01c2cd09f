//! Hosted Gemini-style `generateContent` endpoint.
//!
//! Request assembly and reply parsing are free functions over plain JSON so
//! they are testable without a network; `generate` only does transport and
//! error mapping. The endpoint rejects `responseSchema` combined with
//! function declarations, so tool-carrying requests rely on the system
//! instruction plus output validation instead.

use super::{Message, ModelProvider, ModelReply, ModelRequest, ToolCall};
use crate::config::ProviderSettings;
use crate::error::FlowError;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, FlowError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| FlowError::ProviderUnavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> Result<url::Url, FlowError> {
        let raw = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        url::Url::parse(&raw)
            .map_err(|e| FlowError::ProviderUnavailable(format!("bad endpoint URL '{raw}': {e}")))
    }
}

#[async_trait::async_trait]
impl ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn supports_constrained_output(&self) -> bool {
        true
    }

    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, FlowError> {
        let Some(api_key) = &self.api_key else {
            return Err(FlowError::ProviderUnavailable("model API key not configured".into()));
        };
        let url = self.endpoint(&request.model)?;
        let body = build_request_body(request);
        debug!(model = %request.model, tools = request.tools.len(), "dispatching model request");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = detail.chars().take(200).collect::<String>();
            return Err(FlowError::ProviderUnavailable(format!(
                "model endpoint returned {status}: {detail}"
            )));
        }

        let payload: Value = response.json().await?;
        parse_reply(&payload)
    }
}

pub(crate) fn build_request_body(request: &ModelRequest) -> Value {
    let contents: Vec<Value> = request.messages.iter().map(message_to_content).collect();
    let mut body = json!({
        "contents": contents,
        "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
        "generationConfig": { "temperature": request.temperature },
    });
    if request.tools.is_empty() {
        if let Some(schema) = &request.output_schema {
            body["generationConfig"]["responseMimeType"] = json!("application/json");
            body["generationConfig"]["responseSchema"] = schema.clone();
        }
    } else {
        let declarations: Vec<Value> = request
            .tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                })
            })
            .collect();
        body["tools"] = json!([{ "functionDeclarations": declarations }]);
    }
    body
}

fn message_to_content(message: &Message) -> Value {
    match message {
        Message::User { text } => json!({ "role": "user", "parts": [{ "text": text }] }),
        Message::Model { text } => json!({ "role": "model", "parts": [{ "text": text }] }),
        Message::ToolCalls { calls } => {
            let parts: Vec<Value> = calls
                .iter()
                .map(|c| json!({ "functionCall": { "name": c.name, "args": c.arguments } }))
                .collect();
            json!({ "role": "model", "parts": parts })
        }
        Message::ToolResults { results } => {
            let parts: Vec<Value> = results
                .iter()
                .map(|r| {
                    json!({
                        "functionResponse": {
                            "name": r.call.name,
                            "response": { "result": r.value },
                        }
                    })
                })
                .collect();
            json!({ "role": "user", "parts": parts })
        }
    }
}

pub(crate) fn parse_reply(payload: &Value) -> Result<ModelReply, FlowError> {
    let parts = payload
        .pointer("/candidates/0/content/parts")
        .and_then(|v| v.as_array())
        .ok_or_else(|| FlowError::ProviderUnavailable("model returned no candidates".into()))?;

    let mut calls = Vec::new();
    let mut text = String::new();
    for part in parts {
        if let Some(fc) = part.get("functionCall") {
            let name = fc.get("name").and_then(|v| v.as_str()).unwrap_or_default().to_string();
            let arguments = fc.get("args").cloned().unwrap_or_else(|| json!({}));
            calls.push(ToolCall { id: Uuid::new_v4().to_string(), name, arguments });
        } else if let Some(t) = part.get("text").and_then(|v| v.as_str()) {
            text.push_str(t);
        }
    }

    if !calls.is_empty() {
        Ok(ModelReply::ToolCalls(calls))
    } else if !text.is_empty() {
        Ok(ModelReply::Text(text))
    } else {
        Err(FlowError::ProviderUnavailable("model returned an empty candidate".into()))
    }
}
