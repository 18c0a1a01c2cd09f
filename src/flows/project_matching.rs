//! Freelancer-project matching: archetype candidates for a posted project.
//! Freelancer ids are generated here, never taken from the model, for the
//! same reason as dream-team profile ids.

use crate::error::FlowError;
use crate::flow::runner::Orchestrator;
use crate::flow::{decode, FlowSpec};
use crate::prompt::PromptTemplate;
use crate::schema::{Field, Schema};
use serde_json::{json, Map, Value};
use uuid::Uuid;

pub const NAME: &str = "project-matching";

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: Schema::object([
            Field::required("projectDescription", Schema::string().min_length(30)),
            Field::required("requiredSkills", Schema::array(Schema::string()).min_items(1)),
            Field::optional("budgetUsd", Schema::number().minimum(0.0))
                .describe("total project budget in USD"),
        ]),
        output_schema: Schema::object([Field::required(
            "matches",
            Schema::array(match_schema()).min_items(1).max_items(10),
        )]),
        template: PromptTemplate::new(
            "You match freelancers to projects on WorkHive. Propose the best candidate \
             profiles for the project below, strongest match first.",
        )
        .section("projectDescription", "Project description:\n{{projectDescription}}")
        .section("requiredSkills", "Required skills: {{requiredSkills}}.")
        .section(
            "budgetUsd",
            "Total budget: ${{budgetUsd}}. Keep rate estimates consistent with it.",
        )
        .epilogue(
            "Respond with JSON: matches, an array of objects with keys name (string), \
             matchScore (number 0-100), reason (string), rateEstimateUsd (number, \
             optional).",
        ),
        model: None,
        temperature: 0.5,
        tools: &[],
        post: Some(stamp_freelancer_ids),
    }
}

fn match_schema() -> Schema {
    Schema::object([
        Field::required("name", Schema::string()),
        Field::required("matchScore", Schema::number().range(0.0, 100.0)),
        Field::required("reason", Schema::string()),
        Field::optional("rateEstimateUsd", Schema::number().minimum(0.0)),
    ])
}

fn stamp_freelancer_ids(_input: &Value, output: &mut Value) -> Result<(), FlowError> {
    if let Some(matches) = output.get_mut("matches").and_then(|v| v.as_array_mut()) {
        for entry in matches.iter_mut() {
            if let Some(obj) = entry.as_object_mut() {
                obj.insert("freelancerId".into(), json!(Uuid::new_v4().to_string()));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMatches {
    pub matches: Vec<FreelancerMatch>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerMatch {
    pub freelancer_id: String,
    pub name: String,
    pub match_score: f64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_estimate_usd: Option<f64>,
}

pub async fn match_project(
    orchestrator: &Orchestrator,
    project_description: &str,
    required_skills: &[String],
    budget_usd: Option<f64>,
) -> Result<ProjectMatches, FlowError> {
    let mut input = Map::new();
    input.insert("projectDescription".into(), json!(project_description));
    input.insert("requiredSkills".into(), json!(required_skills));
    if let Some(budget) = budget_usd {
        input.insert("budgetUsd".into(), json!(budget));
    }
    let output = orchestrator.run_named(NAME, &Value::Object(input)).await?;
    decode(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str) -> Value {
        json!({ "name": name, "matchScore": 80, "reason": "skill overlap" })
    }

    #[test]
    fn test_budget_section_omitted_without_budget() {
        let prompt = spec().template.render(&json!({
            "projectDescription": "Build a realtime dashboard for our logistics operation.",
            "requiredSkills": ["rust", "websockets"],
        }));
        assert!(prompt.contains("rust, websockets"));
        assert!(!prompt.contains("Total budget"));
    }

    #[test]
    fn test_budget_section_rendered_with_budget() {
        let prompt = spec().template.render(&json!({
            "projectDescription": "Build a realtime dashboard for our logistics operation.",
            "requiredSkills": ["rust"],
            "budgetUsd": 12000,
        }));
        assert!(prompt.contains("Total budget: $12000"));
    }

    #[test]
    fn test_input_bounds() {
        let schema = spec().input_schema;
        let err = schema
            .validate(&json!({ "projectDescription": "too short", "requiredSkills": ["rust"] }))
            .unwrap_err();
        assert!(err.mentions("projectDescription"));
        let err = schema
            .validate(&json!({
                "projectDescription": "A long enough project description for the matcher.",
                "requiredSkills": [],
            }))
            .unwrap_err();
        assert!(err.mentions("requiredSkills"));
        let err = schema
            .validate(&json!({
                "projectDescription": "A long enough project description for the matcher.",
                "requiredSkills": ["rust"],
                "budgetUsd": -5,
            }))
            .unwrap_err();
        assert!(err.mentions("budgetUsd"));
    }

    #[test]
    fn test_post_stamps_distinct_freelancer_ids() {
        let mut output = json!({ "matches": [candidate("A"), candidate("B")] });
        stamp_freelancer_ids(&json!({}), &mut output).unwrap();
        let matches = output["matches"].as_array().unwrap();
        let ids: std::collections::HashSet<&str> = matches
            .iter()
            .map(|m| m["freelancerId"].as_str().unwrap())
            .collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_output_schema_bounds_match_score() {
        let mut bad = candidate("A");
        bad["matchScore"] = json!(101);
        let err = spec().output_schema.validate(&json!({ "matches": [bad] })).unwrap_err();
        assert!(err.mentions("matchScore"));
    }
}
