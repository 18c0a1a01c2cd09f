//! Dream-team suggestion: archetype collaborators for a project, sized to
//! the member's request. Profile ids are generated here, never taken from
//! the model, and the image field is always a null placeholder the UI fills
//! with its own avatars.

use crate::error::{FlowError, ValidationError};
use crate::flow::runner::Orchestrator;
use crate::flow::{decode, FlowSpec};
use crate::prompt::PromptTemplate;
use crate::schema::{Field, Schema};
use serde_json::{json, Value};
use uuid::Uuid;

pub const NAME: &str = "dream-team-suggestion";

pub const CATEGORIES: &[&str] = &["development", "design", "marketing", "content", "business"];

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: Schema::object([
            Field::required("teamSize", Schema::integer().range(1.0, 15.0))
                .describe("how many members to suggest"),
            Field::required("categorization", Schema::string_enum(CATEGORIES.iter().copied())),
            Field::required("userProfile", Schema::string().min_length(50)),
        ]),
        output_schema: Schema::object([Field::required(
            "suggestedMembers",
            Schema::array(member_schema()).min_items(1).max_items(15),
        )]),
        template: PromptTemplate::new(
            "You assemble project teams on WorkHive. Suggest exactly {{teamSize}} \
             collaborators for a {{categorization}} project, with skills complementary \
             to the requesting member.",
        )
        .section("userProfile", "Requesting member's profile:\n{{userProfile}}")
        .epilogue(
            "Respond with JSON: suggestedMembers, an array of exactly {{teamSize}} objects \
             with keys name (string), headline (string), matchScore (number 0-100), \
             reason (string).",
        ),
        model: None,
        temperature: 0.7,
        tools: &[],
        post: Some(finalize_members),
    }
}

fn member_schema() -> Schema {
    Schema::object([
        Field::required("name", Schema::string()),
        Field::required("headline", Schema::string()),
        Field::required("matchScore", Schema::number().range(0.0, 100.0)),
        Field::required("reason", Schema::string()),
    ])
}

/// Enforce the requested member count, then stamp fresh profile ids and the
/// null image placeholder. Extra members are dropped; too few is a failure,
/// never a smaller team passed off as success.
fn finalize_members(input: &Value, output: &mut Value) -> Result<(), FlowError> {
    let requested = input.get("teamSize").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
    let Some(members) = output.get_mut("suggestedMembers").and_then(|v| v.as_array_mut()) else {
        return Err(FlowError::SchemaMismatch(ValidationError::single(
            "/suggestedMembers",
            "suggestedMembers missing after validation",
        )));
    };
    if members.len() > requested {
        members.truncate(requested);
    }
    if members.len() < requested {
        return Err(FlowError::SchemaMismatch(ValidationError::single(
            "/suggestedMembers",
            format!("expected {requested} members, model returned {}", members.len()),
        )));
    }
    for member in members.iter_mut() {
        if let Some(obj) = member.as_object_mut() {
            obj.insert("profileId".into(), json!(Uuid::new_v4().to_string()));
            obj.insert("image".into(), Value::Null);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamTeamSuggestion {
    pub suggested_members: Vec<SuggestedMember>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedMember {
    pub profile_id: String,
    pub name: String,
    pub headline: String,
    pub match_score: f64,
    pub reason: String,
    pub image: Option<String>,
}

pub async fn suggest_dream_team(
    orchestrator: &Orchestrator,
    team_size: u32,
    categorization: &str,
    user_profile: &str,
) -> Result<DreamTeamSuggestion, FlowError> {
    let input = json!({
        "teamSize": team_size,
        "categorization": categorization,
        "userProfile": user_profile,
    });
    let output = orchestrator.run_named(NAME, &input).await?;
    decode(output)
}
