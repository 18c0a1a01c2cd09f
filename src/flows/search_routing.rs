//! Search and command routing: the omnibox flow. The model answers the
//! member's query directly, and may call tools to navigate in-app, search
//! the web, or look up a stock price along the way.

use crate::error::FlowError;
use crate::flow::runner::Orchestrator;
use crate::flow::{decode, FlowSpec};
use crate::prompt::PromptTemplate;
use crate::schema::{Field, Schema};
use crate::tool::builtin::destination_names;
use serde_json::json;

pub const NAME: &str = "search-routing";

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: Schema::object([
            Field::required("query", Schema::string().min_length(1))
                .describe("what the member typed into the omnibox"),
        ]),
        output_schema: Schema::object([
            Field::required("answer", Schema::string()),
            Field::optional("destination", Schema::string_enum(destination_names()))
                .describe("page to open, only when the member asked to go somewhere"),
        ]),
        template: PromptTemplate::new(
            "You are the WorkHive omnibox assistant. Answer the member's request below. \
             Use the navigate tool when they ask to open a page, the search tool for \
             facts you don't know, and the stock price tool for tickers.",
        )
        .section("query", "Member's request: {{query}}")
        .epilogue(
            "Respond with JSON: answer (string), destination (one of the app pages, \
             only when navigation was requested; omit it otherwise).",
        ),
        model: None,
        temperature: 0.3,
        tools: &["navigate", "search_web", "get_stock_price"],
        post: None,
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRouting {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

pub async fn route_search(
    orchestrator: &Orchestrator,
    query: &str,
) -> Result<SearchRouting, FlowError> {
    let output = orchestrator.run_named(NAME, &json!({ "query": query })).await?;
    decode(output)
}
