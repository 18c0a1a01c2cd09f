//! Course generation: a structured syllabus for a requested topic and
//! level. The model may search the web for current material before writing
//! the outline. Persisting the generated course is the caller's job.

use crate::error::{FlowError, ValidationError};
use crate::flow::runner::Orchestrator;
use crate::flow::{decode, FlowSpec};
use crate::prompt::PromptTemplate;
use crate::schema::{Field, Schema};
use serde_json::{json, Value};

pub const NAME: &str = "course-generation";

pub const LEVELS: &[&str] = &["beginner", "intermediate", "advanced"];

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: Schema::object([
            Field::required("topic", Schema::string().min_length(3)),
            Field::required("level", Schema::string_enum(LEVELS.iter().copied())),
            Field::required("moduleCount", Schema::integer().range(1.0, 12.0))
                .describe("how many modules the course should have"),
        ]),
        output_schema: Schema::object([
            Field::required("title", Schema::string()),
            Field::required("description", Schema::string()),
            Field::required(
                "modules",
                Schema::array(module_schema()).min_items(1).max_items(12),
            ),
        ]),
        template: PromptTemplate::new(
            "You design courses for the WorkHive learning library. Outline a \
             {{level}}-level course on \"{{topic}}\" with exactly {{moduleCount}} modules. \
             Use the search tool if you need current material.",
        )
        .epilogue(
            "Respond with JSON: title (string), description (two or three sentences), \
             modules (array of exactly {{moduleCount}} objects with keys title (string) \
             and lessons (array of 3-6 lesson titles)).",
        ),
        model: None,
        temperature: 0.6,
        tools: &["search_web"],
        post: Some(enforce_module_count),
    }
}

fn module_schema() -> Schema {
    Schema::object([
        Field::required("title", Schema::string()),
        Field::required("lessons", Schema::array(Schema::string()).min_items(1)),
    ])
}

/// The member asked for a specific module count; extras are dropped, a short
/// course is a failure rather than a quietly smaller syllabus.
fn enforce_module_count(input: &Value, output: &mut Value) -> Result<(), FlowError> {
    let requested = input.get("moduleCount").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
    let Some(modules) = output.get_mut("modules").and_then(|v| v.as_array_mut()) else {
        return Err(FlowError::SchemaMismatch(ValidationError::single(
            "/modules",
            "modules missing after validation",
        )));
    };
    if modules.len() > requested {
        modules.truncate(requested);
    }
    if modules.len() < requested {
        return Err(FlowError::SchemaMismatch(ValidationError::single(
            "/modules",
            format!("expected {requested} modules, model returned {}", modules.len()),
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCourse {
    pub title: String,
    pub description: String,
    pub modules: Vec<CourseModule>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    pub title: String,
    pub lessons: Vec<String>,
}

pub async fn generate_course(
    orchestrator: &Orchestrator,
    topic: &str,
    level: &str,
    module_count: u32,
) -> Result<GeneratedCourse, FlowError> {
    let input = json!({
        "topic": topic,
        "level": level,
        "moduleCount": module_count,
    });
    let output = orchestrator.run_named(NAME, &input).await?;
    decode(output)
}
