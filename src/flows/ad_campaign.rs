//! Ad campaign analysis: partial feedback on whichever campaign fields the
//! advertiser has filled in so far. Aspects that were not supplied are
//! neither prompted on nor echoed back in the output.

use crate::error::FlowError;
use crate::flow::runner::Orchestrator;
use crate::flow::{decode, FlowSpec};
use crate::prompt::{value_is_empty, PromptTemplate};
use crate::schema::{Field, Schema};
use serde_json::{json, Map, Value};

pub const NAME: &str = "ad-campaign-analysis";

pub const AD_TYPES: &[&str] = &["job-gig", "service", "product", "event"];

pub fn spec() -> FlowSpec {
    FlowSpec {
        name: NAME,
        input_schema: Schema::object([
            Field::required("adType", Schema::string_enum(AD_TYPES.iter().copied())),
            Field::optional("campaignName", Schema::string()),
            Field::optional("adContent", Schema::string()),
            Field::optional("targetingKeywords", Schema::array(Schema::string())),
        ]),
        output_schema: Schema::object([
            Field::optional("campaignNameStrength", Schema::string()),
            Field::optional("adContentSuggestions", Schema::array(Schema::string())),
            Field::optional("keywordSuggestions", Schema::array(Schema::string())),
        ]),
        template: PromptTemplate::new(
            "You are an advertising strategist for WorkHive, a professional networking \
             platform. Review the advertiser's draft {{adType}} campaign. Comment only on \
             the aspects provided below.",
        )
        .section(
            "campaignName",
            "Campaign name under review: \"{{campaignName}}\". Judge how memorable and \
             fitting it is.",
        )
        .section("adContent", "Ad copy:\n{{adContent}}\n\nSuggest concrete copy improvements.")
        .section(
            "targetingKeywords",
            "Current targeting keywords: {{targetingKeywords}}. Suggest additional \
             high-intent keywords.",
        )
        .epilogue(
            "Respond with JSON using only these keys, and only for aspects you were given: \
             campaignNameStrength (string), adContentSuggestions (array of strings), \
             keywordSuggestions (array of strings).",
        ),
        model: None,
        temperature: 0.4,
        tools: &[],
        post: Some(prune_unrequested),
    }
}

/// Drop analysis of aspects the advertiser never supplied, even if the
/// model volunteered some.
fn prune_unrequested(input: &Value, output: &mut Value) -> Result<(), FlowError> {
    let Some(obj) = output.as_object_mut() else {
        return Ok(());
    };
    let gates = [
        ("campaignName", "campaignNameStrength"),
        ("adContent", "adContentSuggestions"),
        ("targetingKeywords", "keywordSuggestions"),
    ];
    for (input_field, output_field) in gates {
        let absent = input.get(input_field).map(value_is_empty).unwrap_or(true);
        if absent {
            obj.remove(output_field);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct AdCampaignRequest {
    pub ad_type: String,
    pub campaign_name: Option<String>,
    pub ad_content: Option<String>,
    pub targeting_keywords: Vec<String>,
}

impl AdCampaignRequest {
    fn to_input(&self) -> Value {
        let mut input = Map::new();
        input.insert("adType".into(), json!(self.ad_type));
        if let Some(name) = &self.campaign_name {
            input.insert("campaignName".into(), json!(name));
        }
        if let Some(content) = &self.ad_content {
            input.insert("adContent".into(), json!(content));
        }
        if !self.targeting_keywords.is_empty() {
            input.insert("targetingKeywords".into(), json!(self.targeting_keywords));
        }
        Value::Object(input)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdCampaignAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_name_strength: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ad_content_suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyword_suggestions: Vec<String>,
}

pub async fn analyze_ad_campaign(
    orchestrator: &Orchestrator,
    request: &AdCampaignRequest,
) -> Result<AdCampaignAnalysis, FlowError> {
    let output = orchestrator.run_named(NAME, &request.to_input()).await?;
    decode(output)
}
