//! The product flow catalog.
//!
//! One module per flow: its spec (schemas, prompt template, tools, post
//! hook) plus a typed caller-facing function. `FlowRegistry::new` registers
//! every flow for name-based dispatch.

pub mod ad_campaign;
pub mod content_recommendation;
pub mod conversation_starters;
pub mod course_generation;
pub mod dream_team;
pub mod post_analysis;
pub mod post_generation;
pub mod project_matching;
pub mod reliability;
pub mod search_routing;

use crate::flow::FlowSpec;
use std::collections::HashMap;

pub struct FlowRegistry {
    flows: HashMap<String, FlowSpec>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        let mut flows: HashMap<String, FlowSpec> = HashMap::new();
        for spec in [
            ad_campaign::spec(),
            content_recommendation::spec(),
            conversation_starters::spec(),
            course_generation::spec(),
            dream_team::spec(),
            post_analysis::spec(),
            post_generation::spec(),
            project_matching::spec(),
            reliability::spec(),
            search_routing::spec(),
        ] {
            flows.insert(spec.name.to_string(), spec);
        }
        Self { flows }
    }

    pub fn get(&self, name: &str) -> Option<&FlowSpec> {
        self.flows.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.flows.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FlowRegistry {
    fn default() -> Self {
        Self::new()
    }
}
