//! Capabilities the model may invoke mid-generation.
//!
//! A failing or unknown tool never aborts a flow: `dispatch` substitutes the
//! tool's fallback value and logs the failure, so the model keeps a degraded
//! but usable context.

pub mod builtin;

use crate::config::Settings;
use crate::error::FlowError;
use crate::provider::{ToolCall, ToolDecl};
use crate::schema::Schema;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> Schema;

    async fn invoke(&self, arguments: &Value) -> Result<Value, FlowError>;

    /// Safe value fed back to the model when the tool fails.
    fn fallback(&self) -> Value;
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    pub fn with_builtins(settings: &Settings) -> Result<Self, FlowError> {
        let mut registry = Self::new();
        registry.register(Arc::new(builtin::SearchWebTool::new(settings)?));
        registry.register(Arc::new(builtin::NavigateTool));
        registry.register(Arc::new(builtin::StockPriceTool::new(settings)?));
        Ok(registry)
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Declarations for the named tools, in the order given. Unknown names
    /// are skipped with a warning so one bad flow spec cannot poison a run.
    pub fn declarations(&self, names: &[&str]) -> Vec<ToolDecl> {
        names
            .iter()
            .filter_map(|name| match self.tools.get(*name) {
                Some(tool) => Some(ToolDecl {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: tool.parameters().to_json_schema(),
                }),
                None => {
                    warn!(tool = name, "flow declares unregistered tool");
                    None
                }
            })
            .collect()
    }

    /// Execute one model-requested call. Failures degrade to the tool's
    /// fallback; an unknown tool degrades to an error note the model can see.
    pub async fn dispatch(&self, call: &ToolCall) -> Value {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, "model requested unknown tool");
            return Value::String(format!("unknown tool '{}'", call.name));
        };
        match tool.invoke(&call.arguments).await {
            Ok(value) => value,
            Err(err) => {
                warn!(tool = %call.name, error = %err, "tool failed, substituting fallback");
                tool.fallback()
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
