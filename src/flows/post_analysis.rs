//! Post analysis: feedback on a draft post before the member publishes it.
//! The optional goal steers the critique; without it the analysis stays
//! general.

use crate::error::FlowError;
use crate::flow::runner::Orchestrator;
use crate::flow::{decode, FlowSpec};
use crate::prompt::PromptTemplate;
use crate::schema::{Field, Schema};
use serde_json::{json, Map, Value};

pub const NAME: &str = "post-analysis";

pub const GOALS: &[&str] = &["reach", "engagement", "leads"];

pub const ENGAGEMENT_LEVELS: &[&str] = &["low", "medium", "high"];

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: Schema::object([
            Field::required("postContent", Schema::string().min_length(10)),
            Field::optional("goal", Schema::string_enum(GOALS.iter().copied())),
        ]),
        output_schema: Schema::object([
            Field::required("strengths", Schema::array(Schema::string())),
            Field::required("improvements", Schema::array(Schema::string())),
            Field::required(
                "predictedEngagement",
                Schema::string_enum(ENGAGEMENT_LEVELS.iter().copied()),
            ),
        ]),
        template: PromptTemplate::new(
            "You review draft posts for WorkHive members before they publish. \
             Critique the draft below honestly; name what works and what to change.",
        )
        .section("postContent", "Draft post:\n{{postContent}}")
        .section("goal", "The member's goal for this post is {{goal}}; weight your advice toward it.")
        .epilogue(
            "Respond with JSON: strengths (array of strings), improvements (array of \
             strings), predictedEngagement (one of: low, medium, high).",
        ),
        model: None,
        temperature: 0.4,
        tools: &[],
        post: None,
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAnalysis {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub predicted_engagement: String,
}

pub async fn analyze_post(
    orchestrator: &Orchestrator,
    post_content: &str,
    goal: Option<&str>,
) -> Result<PostAnalysis, FlowError> {
    let mut input = Map::new();
    input.insert("postContent".into(), json!(post_content));
    if let Some(goal) = goal {
        input.insert("goal".into(), json!(goal));
    }
    let output = orchestrator.run_named(NAME, &Value::Object(input)).await?;
    decode(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_section_omitted_without_goal() {
        let prompt = spec()
            .template
            .render(&json!({ "postContent": "Shipping our beta next week!" }));
        assert!(prompt.contains("Shipping our beta"));
        assert!(!prompt.contains("goal for this post"));
    }

    #[test]
    fn test_goal_section_present_with_goal() {
        let prompt = spec().template.render(&json!({
            "postContent": "Shipping our beta next week!",
            "goal": "leads",
        }));
        assert!(prompt.contains("goal for this post is leads"));
    }

    #[test]
    fn test_input_rejects_short_post_and_unknown_goal() {
        let schema = spec().input_schema;
        let err = schema.validate(&json!({ "postContent": "hi" })).unwrap_err();
        assert!(err.mentions("postContent"));
        let err = schema
            .validate(&json!({ "postContent": "A long enough draft post.", "goal": "virality" }))
            .unwrap_err();
        assert!(err.mentions("goal"));
    }

    #[test]
    fn test_output_engagement_is_an_enum() {
        let schema = spec().output_schema;
        let good = json!({
            "strengths": ["clear hook"],
            "improvements": ["add a question"],
            "predictedEngagement": "medium",
        });
        assert!(schema.validate(&good).is_ok());
        let mut bad = good.clone();
        bad["predictedEngagement"] = json!("viral");
        assert!(schema.validate(&bad).unwrap_err().mentions("predictedEngagement"));
    }
}
