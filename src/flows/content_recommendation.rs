//! Feed content recommendations from a member's declared interests and,
//! when available, their recent activity.

use crate::error::FlowError;
use crate::flow::runner::Orchestrator;
use crate::flow::{decode, FlowSpec};
use crate::prompt::PromptTemplate;
use crate::schema::{Field, Schema};
use serde_json::{json, Map, Value};

pub const NAME: &str = "content-recommendation";

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: Schema::object([
            Field::required("interests", Schema::array(Schema::string()).min_items(1)),
            Field::optional("recentActivity", Schema::array(Schema::string())),
        ]),
        output_schema: Schema::object([Field::required(
            "recommendations",
            Schema::array(recommendation_schema()).min_items(1),
        )]),
        template: PromptTemplate::new(
            "You curate the WorkHive feed. Recommend professional content a member \
             with these interests would actually engage with: {{interests}}.",
        )
        .section(
            "recentActivity",
            "Their recent activity, most recent first:\n{{recentActivity}}\n\n\
             Weight recommendations toward what they have engaged with lately.",
        )
        .epilogue(
            "Respond with JSON: recommendations, an array of objects with keys \
             title (string), reason (one sentence, string), category (string).",
        ),
        model: None,
        temperature: 0.6,
        tools: &[],
        post: None,
    }
}

fn recommendation_schema() -> Schema {
    Schema::object([
        Field::required("title", Schema::string()),
        Field::required("reason", Schema::string()),
        Field::required("category", Schema::string()),
    ])
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecommendations {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub reason: String,
    pub category: String,
}

pub async fn recommend_content(
    orchestrator: &Orchestrator,
    interests: &[String],
    recent_activity: &[String],
) -> Result<ContentRecommendations, FlowError> {
    let mut input = Map::new();
    input.insert("interests".into(), json!(interests));
    if !recent_activity.is_empty() {
        input.insert("recentActivity".into(), json!(recent_activity));
    }
    let output = orchestrator.run_named(NAME, &Value::Object(input)).await?;
    decode(output)
}
