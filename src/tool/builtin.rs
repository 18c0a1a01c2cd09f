//! Built-in tools: web search, in-app navigation, stock quotes.
//!
//! The HTTP-backed tools hold their own short-timeout client; a missing API
//! key makes `invoke` fail, which the registry turns into the fallback reply.

use super::Tool;
use crate::config::Settings;
use crate::error::FlowError;
use crate::schema::{Field, Schema};
use serde_json::{json, Value};
use std::time::Duration;

const TOOL_TIMEOUT_SECS: u64 = 10;
const SEARCH_RESULT_LIMIT: usize = 3;

/// App pages the assistant may route to, with the phrasing used in answers.
pub const DESTINATIONS: &[(&str, &str)] = &[
    ("feed", "your feed"),
    ("messages", "your messages"),
    ("workspaces", "your workspaces"),
    ("ad-studio", "the ad studio"),
    ("courses", "the course library"),
    ("profile", "your profile"),
    ("settings", "settings"),
];

pub fn destination_names() -> Vec<&'static str> {
    DESTINATIONS.iter().map(|(name, _)| *name).collect()
}

fn tool_client() -> Result<reqwest::Client, FlowError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(TOOL_TIMEOUT_SECS))
        .build()
        .map_err(|e| FlowError::ProviderUnavailable(format!("http client: {e}")))
}

fn tool_failure(tool: &str, reason: impl Into<String>) -> FlowError {
    FlowError::ToolFailure { tool: tool.to_string(), reason: reason.into() }
}

pub struct SearchWebTool {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl SearchWebTool {
    pub fn new(settings: &Settings) -> Result<Self, FlowError> {
        Ok(Self {
            client: tool_client()?,
            api_key: settings.search_api_key.clone(),
            endpoint: settings.search_base_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Tool for SearchWebTool {
    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Search the public web and return a short digest of the top results."
    }

    fn parameters(&self) -> Schema {
        Schema::object([
            Field::required("query", Schema::string().min_length(1)).describe("search query"),
        ])
    }

    async fn invoke(&self, arguments: &Value) -> Result<Value, FlowError> {
        let query = arguments
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| tool_failure("search_web", "missing 'query' argument"))?;
        let Some(api_key) = &self.api_key else {
            return Err(tool_failure("search_web", "search API key not configured"));
        };

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| tool_failure("search_web", e.to_string()))?;
        if !response.status().is_success() {
            return Err(tool_failure(
                "search_web",
                format!("search endpoint returned {}", response.status()),
            ));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| tool_failure("search_web", e.to_string()))?;
        let digest = digest_results(&payload);
        if digest.is_empty() {
            return Ok(json!(format!("No results found for \"{query}\".")));
        }
        Ok(json!(digest))
    }

    fn fallback(&self) -> Value {
        json!("Web search is temporarily unavailable; answer from general knowledge and say so.")
    }
}

fn digest_results(payload: &Value) -> String {
    let Some(results) = payload.get("results").and_then(|v| v.as_array()) else {
        return String::new();
    };
    results
        .iter()
        .take(SEARCH_RESULT_LIMIT)
        .filter_map(|r| {
            let title = r.get("title").and_then(|v| v.as_str())?;
            let snippet = r.get("snippet").and_then(|v| v.as_str()).unwrap_or("");
            Some(format!("{title}: {snippet}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pure routing table lookup; resolves a destination the UI can act on.
pub struct NavigateTool;

#[async_trait::async_trait]
impl Tool for NavigateTool {
    fn name(&self) -> &str {
        "navigate"
    }

    fn description(&self) -> &str {
        "Resolve an in-app destination when the member asks to go somewhere."
    }

    fn parameters(&self) -> Schema {
        Schema::object([
            Field::required("destination", Schema::string_enum(destination_names()))
                .describe("page to open"),
        ])
    }

    async fn invoke(&self, arguments: &Value) -> Result<Value, FlowError> {
        let destination = arguments
            .get("destination")
            .and_then(|v| v.as_str())
            .ok_or_else(|| tool_failure("navigate", "missing 'destination' argument"))?;
        let Some((name, label)) = DESTINATIONS.iter().find(|(name, _)| *name == destination)
        else {
            return Err(tool_failure("navigate", format!("unknown destination '{destination}'")));
        };
        Ok(json!({
            "answer": format!("Taking you to {label}."),
            "destination": name,
        }))
    }

    fn fallback(&self) -> Value {
        json!({ "answer": "I can't open that page right now.", "destination": null })
    }
}

pub struct StockPriceTool {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl StockPriceTool {
    pub fn new(settings: &Settings) -> Result<Self, FlowError> {
        Ok(Self {
            client: tool_client()?,
            api_key: settings.quote_api_key.clone(),
            endpoint: settings.quote_base_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Fetch the latest trade price for a stock ticker symbol."
    }

    fn parameters(&self) -> Schema {
        Schema::object([
            Field::required("ticker", Schema::string().min_length(1).max_length(8))
                .describe("ticker symbol, e.g. ACME"),
        ])
    }

    async fn invoke(&self, arguments: &Value) -> Result<Value, FlowError> {
        let ticker = arguments
            .get("ticker")
            .and_then(|v| v.as_str())
            .ok_or_else(|| tool_failure("get_stock_price", "missing 'ticker' argument"))?;
        let Some(api_key) = &self.api_key else {
            return Err(tool_failure("get_stock_price", "quote API key not configured"));
        };

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("symbol", ticker.to_uppercase())])
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| tool_failure("get_stock_price", e.to_string()))?;
        if !response.status().is_success() {
            return Err(tool_failure(
                "get_stock_price",
                format!("quote endpoint returned {}", response.status()),
            ));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| tool_failure("get_stock_price", e.to_string()))?;
        let price = payload
            .get("price")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| tool_failure("get_stock_price", "quote payload missing 'price'"))?;
        Ok(json!(price))
    }

    fn fallback(&self) -> Value {
        json!("Live stock quotes are temporarily unavailable.")
    }
}
