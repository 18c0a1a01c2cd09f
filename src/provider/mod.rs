//! Model provider seam.
//!
//! The orchestrator talks to a `ModelProvider` trait object so flows run
//! against the hosted endpoint in production and a scripted provider in
//! tests. A request is ephemeral: built for one orchestration call, extended
//! in place across tool rounds, dropped afterwards.

pub mod gemini;

use crate::error::FlowError;
use serde_json::Value;

/// One conversation turn. Tool calls and their results are turns of their
/// own so the provider can render them in its native wire shape.
#[derive(Debug, Clone)]
pub enum Message {
    User { text: String },
    Model { text: String },
    ToolCalls { calls: Vec<ToolCall> },
    ToolResults { results: Vec<ToolResult> },
}

#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Synthesized when the provider does not assign call ids.
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone)]
pub struct ToolResult {
    pub call: ToolCall,
    pub value: Value,
}

/// Declaration of a callable tool, sent alongside the prompt.
#[derive(Debug, Clone)]
pub struct ToolDecl {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub system_instruction: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    /// Rendered output schema; enforced by the endpoint when it supports
    /// constrained decoding and no tools are attached, advisory otherwise.
    pub output_schema: Option<Value>,
    pub tools: Vec<ToolDecl>,
}

/// A model turn: either final text or a batch of tool calls to satisfy.
#[derive(Debug, Clone)]
pub enum ModelReply {
    Text(String),
    ToolCalls(Vec<ToolCall>),
}

#[async_trait::async_trait]
pub trait ModelProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the endpoint enforces the output schema during decoding.
    fn supports_constrained_output(&self) -> bool {
        false
    }

    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, FlowError>;
}

/// Parse model text that should contain a single JSON document. Tolerates
/// code fences and prose around the object; returns None when no JSON can
/// be recovered.
pub fn parse_json_reply(raw: &str) -> Option<Value> {
    let cleaned = strip_code_fences(raw);
    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Some(value);
    }
    extract_json_from_text(&cleaned)
}

fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let mut lines: Vec<&str> = trimmed.lines().collect();
    if let Some(first) = lines.first() {
        if first.trim_start().starts_with("```") {
            lines.remove(0);
        }
    }
    if let Some(last) = lines.last() {
        if last.trim_start().starts_with("```") {
            lines.pop();
        }
    }
    lines.join("\n").trim().to_string()
}

fn extract_json_from_text(raw: &str) -> Option<Value> {
    use serde::Deserialize;
    for (idx, ch) in raw.char_indices() {
        if ch != '{' && ch != '[' {
            continue;
        }
        let mut deserializer = serde_json::Deserializer::from_str(&raw[idx..]);
        if let Ok(value) = Value::deserialize(&mut deserializer) {
            return Some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json_parses() {
        let value = parse_json_reply(r#"{"answer": "yes"}"#).unwrap();
        assert_eq!(value, json!({ "answer": "yes" }));
    }

    #[test]
    fn test_fenced_json_parses() {
        let raw = "```json\n{\"answer\": \"yes\"}\n```";
        let value = parse_json_reply(raw).unwrap();
        assert_eq!(value["answer"], "yes");
    }

    #[test]
    fn test_json_embedded_in_prose_parses() {
        let raw = "Here is the result you asked for: {\"score\": 88} Hope that helps!";
        let value = parse_json_reply(raw).unwrap();
        assert_eq!(value["score"], 88);
    }

    #[test]
    fn test_prose_without_json_is_none() {
        assert!(parse_json_reply("I could not produce an analysis.").is_none());
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n{\"ok\": true}\n```";
        assert_eq!(parse_json_reply(raw).unwrap()["ok"], true);
    }
}
