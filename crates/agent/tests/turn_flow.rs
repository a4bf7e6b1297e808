//! End-to-end turn orchestration against scripted engines: tool round trips,
//! busy-state refusals, round budgets, and the guardrail path.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use ella_agent::conversation::TurnState;
use ella_agent::guardrails::{GuardrailGate, LlmGuardrailClassifier};
use ella_agent::llm::{
    ChatRole, CompletionClient, CompletionError, CompletionOutcome, CompletionRequest,
    FunctionCall, ToolCall,
};
use ella_agent::runtime::{ConversationRuntime, RefusalReason, TurnOutcome};
use ella_agent::tools::{CatalogSearchTool, ToolRegistry};
use ella_core::{ConnectorRecord, GuardrailConfig, Language};
use ella_db::repositories::{InMemoryConnectorRepository, InMemoryConversationRepository};
use ella_db::{ChangeHub, MessageStore};

struct ScriptedEngine {
    script: Mutex<VecDeque<Result<CompletionOutcome, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedEngine {
    fn new(script: Vec<Result<CompletionOutcome, CompletionError>>) -> Self {
        Self { script: Mutex::new(script.into()), requests: Mutex::new(Vec::new()) }
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedEngine {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionOutcome, CompletionError> {
        self.requests.lock().expect("requests lock").push(request);
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Malformed("script exhausted".to_string())))
    }
}

/// Engine that parks mid-flight until released, to observe busy-state
/// behavior deterministically.
struct GatedEngine {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl CompletionClient for GatedEngine {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionOutcome, CompletionError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(CompletionOutcome::Final("All set.".to_string()))
    }
}

fn fresh_store() -> MessageStore {
    MessageStore::new(
        Arc::new(InMemoryConversationRepository::default()),
        "chat_messages",
        ChangeHub::new(),
    )
}

fn open_gate() -> GuardrailGate {
    GuardrailGate::new(GuardrailConfig { enabled: false, ..GuardrailConfig::default() })
}

fn catalog_tools() -> ToolRegistry {
    let record = |name: &str, description: &str, category: &str| ConnectorRecord {
        name: name.to_string(),
        description: Some(description.to_string()),
        category: category.to_string(),
    };
    let connectors = Arc::new(InMemoryConnectorRepository::with_connectors(vec![
        record("Salesforce", "Cloud CRM accounts and contacts", "CRM"),
        record("HubSpot", "Marketing and CRM pipelines", "CRM"),
        record("Shopify", "Shop orders and inventory", "E-Commerce"),
    ]));

    let mut registry = ToolRegistry::default();
    registry.register(CatalogSearchTool::new(connectors));
    registry
}

fn search_call(id: &str, query: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        kind: "function".to_string(),
        function: FunctionCall {
            name: "search_integrations".to_string(),
            arguments: json!({ "query": query }).to_string(),
        },
    }
}

#[tokio::test]
async fn engine_tool_round_trip_produces_a_final_answer() {
    let engine = Arc::new(ScriptedEngine::new(vec![
        Ok(CompletionOutcome::ToolCalls(vec![search_call("call_1", "crm")])),
        Ok(CompletionOutcome::Final(
            "We already ship Salesforce and HubSpot connectors.".to_string(),
        )),
    ]));

    let runtime = ConversationRuntime::new(fresh_store(), open_gate())
        .with_engine(engine.clone())
        .with_tools(catalog_tools());

    let outcome = runtime
        .submit("Which CRM systems do you integrate?", None)
        .await
        .expect("submit");

    let TurnOutcome::Answered { reply } = outcome else {
        panic!("tool round trip must settle with an answer");
    };
    assert!(reply.text.contains("Salesforce"));

    // The engine saw two requests: the dispatch and the post-tool resumption.
    let requests = engine.requests();
    assert_eq!(requests.len(), 2);

    // The first dispatch declares the catalog tool and carries the persona.
    assert_eq!(requests[0].tools.len(), 1);
    assert_eq!(requests[0].messages[0].role, ChatRole::System);

    // The resumption carries the echoed tool call and the tool result.
    let resumed = &requests[1].messages;
    assert!(resumed
        .iter()
        .any(|message| message.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())));
    let tool_result = resumed
        .iter()
        .find(|message| message.role == ChatRole::Tool)
        .expect("tool result message present");
    let content = tool_result.content.as_deref().unwrap_or_default();
    assert!(content.contains("Salesforce") && content.contains("HubSpot"));
    assert!(!content.contains("Shopify"));

    // History holds welcome + user + answer, and the runtime is idle again.
    let history = runtime.history().await;
    assert_eq!(history.len(), 3);
    assert_eq!(runtime.turn_state(), TurnState::Idle);
}

#[tokio::test]
async fn sequential_tool_rounds_are_bounded() {
    let engine = Arc::new(ScriptedEngine::new(vec![
        Ok(CompletionOutcome::ToolCalls(vec![search_call("call_1", "crm")])),
        Ok(CompletionOutcome::ToolCalls(vec![search_call("call_2", "erp")])),
        Ok(CompletionOutcome::ToolCalls(vec![search_call("call_3", "shop")])),
    ]));

    let runtime = ConversationRuntime::new(fresh_store(), open_gate())
        .with_engine(engine.clone())
        .with_tools(catalog_tools())
        .with_max_tool_rounds(2);

    let outcome = runtime.submit("Search everything", None).await.expect("submit");
    assert!(matches!(outcome, TurnOutcome::Failed { .. }));

    // Two rounds ran, the third tool request exhausted the budget.
    assert_eq!(engine.requests().len(), 3);
    assert_eq!(runtime.turn_state(), TurnState::Idle);
}

#[tokio::test]
async fn submissions_are_refused_while_a_turn_is_open() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let runtime = Arc::new(
        ConversationRuntime::new(fresh_store(), open_gate()).with_engine(Arc::new(GatedEngine {
            entered: entered.clone(),
            release: release.clone(),
        })),
    );

    let first = tokio::spawn({
        let runtime = runtime.clone();
        async move { runtime.submit("first question", None).await }
    });

    // Wait until the engine is mid-flight, then try to open a second turn.
    entered.notified().await;
    assert!(runtime.turn_state().is_busy());

    let second = runtime.submit("second question", None).await.expect("second submit");
    assert_eq!(second, TurnOutcome::Refused(RefusalReason::TurnInProgress));

    release.notify_one();
    let outcome = first.await.expect("join").expect("first submit");
    assert!(matches!(outcome, TurnOutcome::Answered { .. }));

    let history = runtime.history().await;
    assert!(history.iter().any(|message| message.text == "first question"));
    assert!(!history.iter().any(|message| message.text == "second question"));
    assert_eq!(runtime.turn_state(), TurnState::Idle);
}

#[tokio::test]
async fn strict_mode_guardrail_rejects_before_the_engine_is_consulted() {
    // Classifier claims relevance but with low confidence; strict mode must
    // reject without ever dispatching to the answer engine.
    let classifier_engine = ScriptedEngine::new(vec![Ok(CompletionOutcome::Final(
        json!({
            "isRelevant": true,
            "reasoning": "mentions systems, but vaguely",
            "category": "business-integration",
            "confidence": 0.3,
        })
        .to_string(),
    ))]);

    let answer_engine = Arc::new(ScriptedEngine::new(vec![Ok(CompletionOutcome::Final(
        "should never be produced".to_string(),
    ))]));

    let gate = GuardrailGate::new(GuardrailConfig {
        strict_mode: true,
        confidence_threshold: 0.7,
        ..GuardrailConfig::default()
    });

    let runtime = ConversationRuntime::new(fresh_store(), gate)
        .with_classifier(Arc::new(LlmGuardrailClassifier::new(classifier_engine)))
        .with_engine(answer_engine.clone())
        .with_tools(catalog_tools());

    let outcome = runtime.submit("hook up the thing", Some(Language::En)).await.expect("submit");
    assert!(matches!(outcome, TurnOutcome::Rejected { .. }));
    assert!(answer_engine.requests().is_empty(), "rejected input must not reach the engine");
    assert_eq!(runtime.turn_state(), TurnState::Idle);
}
