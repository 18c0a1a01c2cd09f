//! Post generation: drafts a post in the requested tone. Hashtags are part
//! of the contract only when asked for; unrequested hashtags are stripped
//! and the array is always present in the output.

use crate::error::FlowError;
use crate::flow::runner::Orchestrator;
use crate::flow::{decode, FlowSpec};
use crate::prompt::PromptTemplate;
use crate::schema::{Field, Schema};
use serde_json::{json, Value};

pub const NAME: &str = "post-generation";

pub const TONES: &[&str] = &["professional", "casual", "celebratory", "informative"];

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: Schema::object([
            Field::required("topic", Schema::string().min_length(1)),
            Field::required("tone", Schema::string_enum(TONES.iter().copied())),
            Field::optional("includeHashtags", Schema::boolean()),
        ]),
        output_schema: Schema::object([
            Field::required("content", Schema::string().min_length(1)),
            Field::optional("hashtags", Schema::array(Schema::string())),
        ]),
        template: PromptTemplate::new(
            "You write posts for WorkHive members. Draft a {{tone}} post about: {{topic}}. \
             Keep it under 150 words and written in the member's own voice, no preamble.",
        )
        .section("includeHashtags", "End with three to five relevant hashtags.")
        .epilogue(
            "Respond with JSON: content (the post text), hashtags (array of strings \
             starting with '#'; empty when hashtags were not requested).",
        ),
        model: None,
        temperature: 0.8,
        tools: &[],
        post: Some(settle_hashtags),
    }
}

/// Hashtags the member did not ask for are dropped; either way the array is
/// present so callers never branch on a missing field.
fn settle_hashtags(input: &Value, output: &mut Value) -> Result<(), FlowError> {
    let requested = input
        .get("includeHashtags")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if let Some(obj) = output.as_object_mut() {
        if requested {
            obj.entry("hashtags").or_insert_with(|| json!([]));
        } else {
            obj.insert("hashtags".into(), json!([]));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPost {
    pub content: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

pub async fn generate_post(
    orchestrator: &Orchestrator,
    topic: &str,
    tone: &str,
    include_hashtags: bool,
) -> Result<GeneratedPost, FlowError> {
    let input = json!({
        "topic": topic,
        "tone": tone,
        "includeHashtags": include_hashtags,
    });
    let output = orchestrator.run_named(NAME, &input).await?;
    decode(output)
}
