//! Flow descriptors and the run result envelope.

pub mod runner;

use crate::error::{FlowError, ValidationError};
use crate::prompt::PromptTemplate;
use crate::schema::Schema;
use serde_json::Value;

/// Post-processing hook applied after output validation: id generation,
/// sentinel fields, pruning. Receives the validated input for context.
pub type PostFn = fn(&Value, &mut Value) -> Result<(), FlowError>;

/// Static descriptor for one orchestration unit. Stateless: the same spec
/// serves every call of its flow.
pub struct FlowSpec {
    pub name: &'static str,
    pub input_schema: Schema,
    pub output_schema: Schema,
    pub template: PromptTemplate,
    /// Overrides the configured default model when set.
    pub model: Option<&'static str>,
    pub temperature: f64,
    /// Registered tool names this flow exposes to the model.
    pub tools: &'static [&'static str],
    pub post: Option<PostFn>,
}

/// Schema-conformant result of one flow run.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowOutput {
    pub flow: String,
    pub value: Value,
}

/// Decode a validated output into its typed form. A failure here means the
/// flow's output schema and its Rust type disagree.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(output: FlowOutput) -> Result<T, FlowError> {
    serde_json::from_value(output.value).map_err(|e| {
        FlowError::SchemaMismatch(ValidationError::single(
            "/",
            format!("validated output failed to decode: {e}"),
        ))
    })
}
