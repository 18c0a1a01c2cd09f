//! The orchestrator: validate input, render the prompt, call the model,
//! settle tool rounds, parse and validate the output, post-process.
//!
//! One model call is in flight per flow run. The only intra-flow parallelism
//! is the dispatch of independent tool calls within a single round. Nothing
//! is persisted; inputs and outputs live for the duration of the call.

use super::{FlowOutput, FlowSpec};
use crate::config::Settings;
use crate::error::FlowError;
use crate::flows::FlowRegistry;
use crate::provider::gemini::GeminiProvider;
use crate::provider::{parse_json_reply, Message, ModelProvider, ModelReply, ModelRequest, ToolResult};
use crate::tool::ToolRegistry;
use futures_util::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

/// A model that keeps asking for tools past this many rounds has lost the
/// plot; the run fails instead of looping.
const MAX_TOOL_ROUNDS: u32 = 5;

const SYSTEM_INSTRUCTION: &str =
    "You are the WorkHive assistant. Return a single JSON object only. No prose or code fences.";

pub struct Orchestrator {
    provider: Arc<dyn ModelProvider>,
    tools: ToolRegistry,
    registry: FlowRegistry,
    default_model: String,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn ModelProvider>, tools: ToolRegistry, default_model: &str) -> Self {
        Self {
            provider,
            tools,
            registry: FlowRegistry::new(),
            default_model: default_model.to_string(),
        }
    }

    /// Provider, tools, and default model wired from environment settings.
    pub fn from_env() -> Result<Self, FlowError> {
        let settings = Settings::from_env();
        let provider = Arc::new(GeminiProvider::new(&settings.gemini)?);
        let tools = ToolRegistry::with_builtins(&settings)?;
        let model = settings.gemini.model.clone();
        Ok(Self::new(provider, tools, &model))
    }

    pub fn registry(&self) -> &FlowRegistry {
        &self.registry
    }

    pub async fn run_named(&self, name: &str, input: &Value) -> Result<FlowOutput, FlowError> {
        let spec = self
            .registry
            .get(name)
            .ok_or_else(|| FlowError::UnknownFlow(name.to_string()))?;
        self.run(spec, input).await
    }

    pub async fn run(&self, spec: &FlowSpec, input: &Value) -> Result<FlowOutput, FlowError> {
        spec.input_schema.validate(input).map_err(FlowError::InvalidInput)?;

        let prompt = spec.template.render(input);
        let model = spec.model.map(str::to_string).unwrap_or_else(|| self.default_model.clone());
        debug!(flow = spec.name, model = %model, "flow started");

        let mut request = ModelRequest {
            model,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            messages: vec![Message::User { text: prompt }],
            temperature: spec.temperature,
            output_schema: Some(spec.output_schema.to_json_schema()),
            tools: self.tools.declarations(spec.tools),
        };

        let mut rounds = 0u32;
        let final_text = loop {
            match self.provider.generate(&request).await? {
                ModelReply::Text(text) => break text,
                ModelReply::ToolCalls(calls) => {
                    rounds += 1;
                    if rounds > MAX_TOOL_ROUNDS {
                        return Err(FlowError::MalformedOutput {
                            reason: format!(
                                "model kept requesting tools after {MAX_TOOL_ROUNDS} rounds"
                            ),
                            raw: String::new(),
                        });
                    }
                    debug!(flow = spec.name, round = rounds, calls = calls.len(), "tool round");
                    // Independent calls within one round run concurrently.
                    let values = join_all(calls.iter().map(|call| self.tools.dispatch(call))).await;
                    let results: Vec<ToolResult> = calls
                        .iter()
                        .cloned()
                        .zip(values)
                        .map(|(call, value)| ToolResult { call, value })
                        .collect();
                    request.messages.push(Message::ToolCalls { calls });
                    request.messages.push(Message::ToolResults { results });
                }
            }
        };

        let Some(mut value) = parse_json_reply(&final_text) else {
            return Err(FlowError::MalformedOutput {
                reason: "no JSON document in model reply".into(),
                raw: final_text,
            });
        };

        spec.output_schema.validate(&value).map_err(FlowError::SchemaMismatch)?;

        if let Some(post) = spec.post {
            post(input, &mut value)?;
        }

        debug!(flow = spec.name, "flow completed");
        Ok(FlowOutput { flow: spec.name.to_string(), value })
    }

    /// Like `run`, but aborts with `Cancelled` when the caller fires the
    /// signal. Dropping the sender without firing lets the flow finish.
    pub async fn run_cancellable(
        &self,
        spec: &FlowSpec,
        input: &Value,
        mut cancel: oneshot::Receiver<()>,
    ) -> Result<FlowOutput, FlowError> {
        let run = self.run(spec, input);
        tokio::pin!(run);
        tokio::select! {
            result = &mut run => return result,
            fired = &mut cancel => {
                if fired.is_ok() {
                    debug!(flow = spec.name, "flow cancelled");
                    return Err(FlowError::Cancelled);
                }
            }
        }
        run.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptTemplate;
    use crate::schema::{Field, Schema};
    use crate::tool::Tool;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<ModelReply, FlowError>>>,
        requests: Mutex<Vec<ModelRequest>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<ModelReply, FlowError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn text(raw: &str) -> Result<ModelReply, FlowError> {
            Ok(ModelReply::Text(raw.to_string()))
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, idx: usize) -> ModelRequest {
            self.requests.lock().unwrap()[idx].clone()
        }
    }

    #[async_trait::async_trait]
    impl ModelProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn supports_constrained_output(&self) -> bool {
            true
        }

        async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, FlowError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FlowError::ProviderUnavailable("script exhausted".into())))
        }
    }

    struct EchoTool;

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the query back."
        }

        fn parameters(&self) -> Schema {
            Schema::object([Field::required("q", Schema::string())])
        }

        async fn invoke(&self, arguments: &Value) -> Result<Value, FlowError> {
            Ok(json!(format!("echo: {}", arguments["q"].as_str().unwrap_or(""))))
        }

        fn fallback(&self) -> Value {
            json!("echo unavailable")
        }
    }

    fn summary_spec() -> FlowSpec {
        FlowSpec {
            name: "summary-check",
            input_schema: Schema::object([Field::required("topic", Schema::string().min_length(1))]),
            output_schema: Schema::object([Field::required("summary", Schema::string())]),
            template: PromptTemplate::new("Summarize: {{topic}}")
                .epilogue("Respond with JSON: summary (string)."),
            model: None,
            temperature: 0.3,
            tools: &[],
            post: None,
        }
    }

    fn tool_spec() -> FlowSpec {
        FlowSpec { tools: &["echo"], ..summary_spec() }
    }

    fn orchestrator(provider: Arc<ScriptedProvider>, with_echo: bool) -> Orchestrator {
        let mut tools = ToolRegistry::new();
        if with_echo {
            tools.register(Arc::new(EchoTool));
        }
        Orchestrator::new(provider, tools, "gemini-2.0-flash")
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_provider() {
        let provider = ScriptedProvider::new(vec![ScriptedProvider::text("{}")]);
        let orch = orchestrator(provider.clone(), false);
        let err = orch.run(&summary_spec(), &json!({})).await.unwrap_err();
        match err {
            FlowError::InvalidInput(v) => assert!(v.mentions("topic")),
            other => panic!("expected invalid input, got {other:?}"),
        }
        assert_eq!(provider.request_count(), 0);
    }

    #[tokio::test]
    async fn test_happy_path_returns_validated_output() {
        let provider = ScriptedProvider::new(vec![ScriptedProvider::text(
            r#"{"summary": "Rust is a systems language."}"#,
        )]);
        let orch = orchestrator(provider.clone(), false);
        let output = orch.run(&summary_spec(), &json!({ "topic": "Rust" })).await.unwrap();
        assert_eq!(output.flow, "summary-check");
        assert_eq!(output.value["summary"], "Rust is a systems language.");
        let request = provider.request(0);
        assert!(matches!(&request.messages[0], Message::User { text } if text.contains("Summarize: Rust")));
        assert_eq!(request.output_schema.unwrap()["properties"]["summary"]["type"], "string");
    }

    #[tokio::test]
    async fn test_fenced_reply_still_parses() {
        let provider = ScriptedProvider::new(vec![ScriptedProvider::text(
            "```json\n{\"summary\": \"ok\"}\n```",
        )]);
        let orch = orchestrator(provider, false);
        let output = orch.run(&summary_spec(), &json!({ "topic": "Rust" })).await.unwrap();
        assert_eq!(output.value["summary"], "ok");
    }

    #[tokio::test]
    async fn test_non_json_reply_is_malformed_output_with_raw() {
        let provider =
            ScriptedProvider::new(vec![ScriptedProvider::text("I'd rather chat about birds.")]);
        let orch = orchestrator(provider, false);
        let err = orch.run(&summary_spec(), &json!({ "topic": "Rust" })).await.unwrap_err();
        match err {
            FlowError::MalformedOutput { raw, .. } => assert!(raw.contains("birds")),
            other => panic!("expected malformed output, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_shape_is_schema_mismatch_naming_field() {
        let provider = ScriptedProvider::new(vec![ScriptedProvider::text(r#"{"summary": 42}"#)]);
        let orch = orchestrator(provider, false);
        let err = orch.run(&summary_spec(), &json!({ "topic": "Rust" })).await.unwrap_err();
        match err {
            FlowError::SchemaMismatch(v) => assert!(v.mentions("summary")),
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = ScriptedProvider::new(vec![Err(FlowError::ProviderUnavailable(
            "model endpoint returned 429".into(),
        ))]);
        let orch = orchestrator(provider.clone(), false);
        let err = orch.run(&summary_spec(), &json!({ "topic": "Rust" })).await.unwrap_err();
        assert!(matches!(err, FlowError::ProviderUnavailable(_)));
        // No silent retry.
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn test_tool_round_feeds_results_back() {
        let call = crate::provider::ToolCall {
            id: "c1".into(),
            name: "echo".into(),
            arguments: json!({ "q": "ping" }),
        };
        let provider = ScriptedProvider::new(vec![
            Ok(ModelReply::ToolCalls(vec![call])),
            ScriptedProvider::text(r#"{"summary": "pong"}"#),
        ]);
        let orch = orchestrator(provider.clone(), true);
        let output = orch.run(&tool_spec(), &json!({ "topic": "Rust" })).await.unwrap();
        assert_eq!(output.value["summary"], "pong");

        let first = provider.request(0);
        assert_eq!(first.tools.len(), 1);
        assert_eq!(first.tools[0].name, "echo");

        let second = provider.request(1);
        assert_eq!(second.messages.len(), 3);
        match &second.messages[2] {
            Message::ToolResults { results } => {
                assert_eq!(results[0].call.name, "echo");
                assert_eq!(results[0].value, json!("echo: ping"));
            }
            other => panic!("expected tool results turn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_call_degrades_not_aborts() {
        let call = crate::provider::ToolCall {
            id: "c1".into(),
            name: "missing_tool".into(),
            arguments: json!({}),
        };
        let provider = ScriptedProvider::new(vec![
            Ok(ModelReply::ToolCalls(vec![call])),
            ScriptedProvider::text(r#"{"summary": "done"}"#),
        ]);
        let orch = orchestrator(provider.clone(), true);
        let output = orch.run(&tool_spec(), &json!({ "topic": "Rust" })).await.unwrap();
        assert_eq!(output.value["summary"], "done");
        let second = provider.request(1);
        match &second.messages[2] {
            Message::ToolResults { results } => {
                assert_eq!(results[0].value, json!("unknown tool 'missing_tool'"));
            }
            other => panic!("expected tool results turn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tool_rounds_are_bounded() {
        let reply = || {
            Ok(ModelReply::ToolCalls(vec![crate::provider::ToolCall {
                id: "c".into(),
                name: "echo".into(),
                arguments: json!({ "q": "again" }),
            }]))
        };
        let provider = ScriptedProvider::new((0..8).map(|_| reply()).collect());
        let orch = orchestrator(provider.clone(), true);
        let err = orch.run(&tool_spec(), &json!({ "topic": "Rust" })).await.unwrap_err();
        assert!(matches!(err, FlowError::MalformedOutput { .. }));
        assert_eq!(provider.request_count(), (MAX_TOOL_ROUNDS + 1) as usize);
    }

    #[tokio::test]
    async fn test_model_override_respected() {
        let provider = ScriptedProvider::new(vec![ScriptedProvider::text(r#"{"summary": "s"}"#)]);
        let orch = orchestrator(provider.clone(), false);
        let spec = FlowSpec { model: Some("gemini-2.0-pro"), ..summary_spec() };
        orch.run(&spec, &json!({ "topic": "Rust" })).await.unwrap();
        assert_eq!(provider.request(0).model, "gemini-2.0-pro");
    }

    #[tokio::test]
    async fn test_post_hook_runs_after_validation() {
        fn stamp(_input: &Value, output: &mut Value) -> Result<(), FlowError> {
            if let Some(obj) = output.as_object_mut() {
                obj.insert("stamped".into(), json!(true));
            }
            Ok(())
        }
        let provider = ScriptedProvider::new(vec![ScriptedProvider::text(r#"{"summary": "s"}"#)]);
        let orch = orchestrator(provider, false);
        let spec = FlowSpec { post: Some(stamp), ..summary_spec() };
        let output = orch.run(&spec, &json!({ "topic": "Rust" })).await.unwrap();
        assert_eq!(output.value["stamped"], true);
    }

    #[tokio::test]
    async fn test_run_named_unknown_flow() {
        let provider = ScriptedProvider::new(vec![]);
        let orch = orchestrator(provider, false);
        let err = orch.run_named("no-such-flow", &json!({})).await.unwrap_err();
        assert!(matches!(err, FlowError::UnknownFlow(name) if name == "no-such-flow"));
    }

    struct HangingProvider;

    #[async_trait::async_trait]
    impl ModelProvider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn generate(&self, _request: &ModelRequest) -> Result<ModelReply, FlowError> {
            std::future::pending::<()>().await;
            unreachable!("pending future never resolves")
        }
    }

    #[tokio::test]
    async fn test_cancellation_aborts_in_flight_run() {
        let orch = Orchestrator::new(Arc::new(HangingProvider), ToolRegistry::new(), "m");
        let (tx, rx) = oneshot::channel();
        let spec = summary_spec();
        let input = json!({ "topic": "Rust" });
        let run = orch.run_cancellable(&spec, &input, rx);
        tokio::pin!(run);

        tokio::select! {
            _ = &mut run => panic!("run finished before cancellation"),
            _ = tokio::time::sleep(std::time::Duration::from_millis(10)) => {}
        }
        tx.send(()).unwrap();
        match run.await {
            Err(FlowError::Cancelled) => {}
            other => panic!("expected cancelled, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dropped_cancel_sender_lets_flow_finish() {
        let provider = ScriptedProvider::new(vec![ScriptedProvider::text(r#"{"summary": "s"}"#)]);
        let orch = orchestrator(provider, false);
        let (tx, rx) = oneshot::channel::<()>();
        drop(tx);
        let output = orch
            .run_cancellable(&summary_spec(), &json!({ "topic": "Rust" }), rx)
            .await
            .unwrap();
        assert_eq!(output.value["summary"], "s");
    }
}
