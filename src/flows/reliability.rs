//! Reliability scoring from platform activity and transaction records.
//! Empty records are a legitimate input (new members) and still produce a
//! score; the flags array is always present in the output, defaulted to
//! empty when the model omits it.

use crate::error::FlowError;
use crate::flow::runner::Orchestrator;
use crate::flow::{decode, FlowSpec};
use crate::prompt::PromptTemplate;
use crate::schema::{Field, Schema};
use serde_json::{json, Value};

pub const NAME: &str = "reliability-scoring";

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: Schema::object([
            Field::required("userActivity", Schema::array(Schema::string())),
            Field::required("transactionHistory", Schema::array(Schema::string())),
        ]),
        output_schema: Schema::object([
            Field::required("reliabilityScore", Schema::number().range(0.0, 100.0)),
            Field::optional("flags", Schema::array(Schema::string())),
            Field::optional("summary", Schema::string()),
        ]),
        template: PromptTemplate::new(
            "You assess member reliability for WorkHive hiring decisions. Score 0-100 from \
             the records below. Missing records are neutral, never negative.",
        )
        .section("userActivity", "Recent platform activity:\n{{userActivity}}")
        .section("transactionHistory", "Transaction history:\n{{transactionHistory}}")
        .epilogue(
            "Respond with JSON: reliabilityScore (number 0-100), flags (array of short \
             strings, empty when nothing stands out), summary (one sentence).",
        ),
        model: None,
        temperature: 0.2,
        tools: &[],
        post: Some(ensure_flags),
    }
}

/// `flags` is part of the contract even when the model leaves it out.
fn ensure_flags(_input: &Value, output: &mut Value) -> Result<(), FlowError> {
    if let Some(obj) = output.as_object_mut() {
        obj.entry("flags").or_insert_with(|| json!([]));
    }
    Ok(())
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityReport {
    pub reliability_score: f64,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

pub async fn score_reliability(
    orchestrator: &Orchestrator,
    user_activity: &[String],
    transaction_history: &[String],
) -> Result<ReliabilityReport, FlowError> {
    let input = json!({
        "userActivity": user_activity,
        "transactionHistory": transaction_history,
    });
    let output = orchestrator.run_named(NAME, &input).await?;
    decode(output)
}
