//! Prompt assembly for flows.
//!
//! A template is a preamble, a list of sections each gated by one input
//! field, and an epilogue carrying the output guidance. A gated section is
//! dropped entirely when its field is absent or empty; a prompt never
//! contains a header with nothing under it. `{{field}}` placeholders resolve
//! against the validated input in every part.

use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    preamble: String,
    sections: Vec<Section>,
    epilogue: String,
}

#[derive(Debug, Clone)]
struct Section {
    field: String,
    template: String,
}

impl PromptTemplate {
    pub fn new(preamble: &str) -> Self {
        Self { preamble: preamble.to_string(), sections: Vec::new(), epilogue: String::new() }
    }

    /// Add a section rendered only when `field` is present and non-empty.
    pub fn section(mut self, field: &str, template: &str) -> Self {
        self.sections.push(Section { field: field.to_string(), template: template.to_string() });
        self
    }

    pub fn epilogue(mut self, text: &str) -> Self {
        self.epilogue = text.to_string();
        self
    }

    pub fn render(&self, input: &Value) -> String {
        let mut parts = vec![resolve_placeholders(&self.preamble, input)];
        for section in &self.sections {
            let gate = input.get(&section.field);
            if gate.map(value_is_empty).unwrap_or(true) {
                continue;
            }
            parts.push(resolve_placeholders(&section.template, input));
        }
        if !self.epilogue.is_empty() {
            parts.push(resolve_placeholders(&self.epilogue, input));
        }
        parts.join("\n\n")
    }
}

/// Replace `{{field}}` placeholders with input values. Unresolved
/// placeholders are left in place so a bad template is visible in the
/// prompt rather than silently blanked.
pub(crate) fn resolve_placeholders(template: &str, input: &Value) -> String {
    let re = regex::Regex::new(r"\{\{([^}]+)\}\}").unwrap();
    re.replace_all(template, |caps: &regex::Captures| {
        let key = caps[1].trim();
        match input.get(key) {
            Some(value) => value_to_text(value),
            None => {
                warn!(placeholder = key, "unresolved prompt placeholder");
                caps[0].to_string()
            }
        }
    })
    .to_string()
}

/// Empty means "omit the section": null, false, blank string, empty array
/// or object. Numbers are never empty, a zero budget is still a budget.
pub(crate) fn value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(|v| v.is_string()) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
