//! Conversation starters for reaching out to another member: short openers
//! grounded in what the two profiles have in common.

use crate::error::FlowError;
use crate::flow::runner::Orchestrator;
use crate::flow::{decode, FlowSpec};
use crate::prompt::PromptTemplate;
use crate::schema::{Field, Schema};
use serde_json::json;

pub const NAME: &str = "conversation-starters";

const MIN_PROFILE_CHARS: u64 = 20;

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: Schema::object([
            Field::required("userProfile", Schema::string().min_length(MIN_PROFILE_CHARS)),
            Field::required("peerProfile", Schema::string().min_length(MIN_PROFILE_CHARS)),
        ]),
        output_schema: Schema::object([Field::required(
            "starters",
            Schema::array(Schema::string().min_length(1)).min_items(1).max_items(5),
        )]),
        template: PromptTemplate::new(
            "A WorkHive member wants to message someone new. Write natural openers \
             that reference genuine common ground, not flattery.",
        )
        .section("userProfile", "The sender's profile:\n{{userProfile}}")
        .section("peerProfile", "The recipient's profile:\n{{peerProfile}}")
        .epilogue(
            "Respond with JSON: starters, an array of one to five short opener \
             strings, each a single sentence the sender could paste as-is.",
        ),
        model: None,
        temperature: 0.8,
        tools: &[],
        post: None,
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConversationStarters {
    pub starters: Vec<String>,
}

pub async fn suggest_conversation_starters(
    orchestrator: &Orchestrator,
    user_profile: &str,
    peer_profile: &str,
) -> Result<ConversationStarters, FlowError> {
    let input = json!({
        "userProfile": user_profile,
        "peerProfile": peer_profile,
    });
    let output = orchestrator.run_named(NAME, &input).await?;
    decode(output)
}
