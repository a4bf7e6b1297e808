use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, info, warn};

use ella_core::{i18n, ApplicationError, DomainError, Language, Message, Sender};
use ella_db::MessageStore;

use crate::conversation::{transition, TurnEvent, TurnState};
use crate::fallback;
use crate::guardrails::{GateDecision, GuardrailClassifier, GuardrailGate};
use crate::llm::{ChatMessage, CompletionClient, CompletionOutcome, CompletionRequest};
use crate::prompts;
use crate::tools::ToolRegistry;

/// Result of one submission. Replies are already appended to the store when
/// the outcome is returned.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnOutcome {
    Refused(RefusalReason),
    Rejected { reply: Message },
    Answered { reply: Message },
    Failed { reply: Message },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefusalReason {
    EmptyInput,
    TurnInProgress,
}

/// Orchestrates one conversation: gate, dispatch, tool rounds, persistence.
///
/// Collaborators are injected explicitly; there is no ambient singleton. At
/// most one turn is open at a time, and every failure on the dispatch path is
/// absorbed into a single user-visible apology message.
pub struct ConversationRuntime {
    store: MessageStore,
    gate: GuardrailGate,
    classifier: Option<Arc<dyn GuardrailClassifier>>,
    engine: Option<Arc<dyn CompletionClient>>,
    tools: ToolRegistry,
    default_language: Language,
    max_tool_rounds: u32,
    state: Mutex<TurnState>,
}

impl ConversationRuntime {
    pub fn new(store: MessageStore, gate: GuardrailGate) -> Self {
        Self {
            store,
            gate,
            classifier: None,
            engine: None,
            tools: ToolRegistry::default(),
            default_language: Language::En,
            max_tool_rounds: 3,
            state: Mutex::new(TurnState::Idle),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn GuardrailClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_engine(mut self, engine: Arc<dyn CompletionClient>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds.max(1);
        self
    }

    pub fn turn_state(&self) -> TurnState {
        *lock_state(&self.state)
    }

    pub async fn history(&self) -> Vec<Message> {
        self.store.load().await
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Runs one turn for a user submission. The user message is persisted
    /// before any network call, so it survives a failing turn.
    pub async fn submit(
        &self,
        text: &str,
        language: Option<Language>,
    ) -> Result<TurnOutcome, ApplicationError> {
        let language = language.unwrap_or(self.default_language);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(TurnOutcome::Refused(RefusalReason::EmptyInput));
        }

        let guard = {
            let mut state = lock_state(&self.state);
            if !state.accepts_submission() {
                return Ok(TurnOutcome::Refused(RefusalReason::TurnInProgress));
            }
            *state = apply(*state, TurnEvent::SubmissionReceived)?;
            TurnGuard { slot: &self.state }
        };

        self.ensure_welcome(language).await?;
        self.append(Message::user(trimmed)).await?;

        let decision =
            self.gate.evaluate(self.classifier.as_deref(), trimmed, language).await;

        match decision {
            GateDecision::Rejected { category, message } => {
                info!(category = category.as_str(), "guardrail rejected submission");
                guard.advance(TurnEvent::GuardrailRejected)?;
                let reply = self.append(Message::bot(message)).await?;
                guard.advance(TurnEvent::TurnClosed)?;
                Ok(TurnOutcome::Rejected { reply })
            }
            GateDecision::Allowed => {
                guard.advance(TurnEvent::GuardrailAllowed)?;
                match self.engine.clone() {
                    Some(engine) => {
                        self.run_engine_turn(engine.as_ref(), &guard, language).await
                    }
                    None => {
                        let reply =
                            self.append(Message::bot(fallback::respond(trimmed, language))).await?;
                        guard.advance(TurnEvent::CompletionReceived)?;
                        guard.advance(TurnEvent::TurnClosed)?;
                        Ok(TurnOutcome::Answered { reply })
                    }
                }
            }
        }
    }

    async fn run_engine_turn(
        &self,
        engine: &dyn CompletionClient,
        guard: &TurnGuard<'_>,
        language: Language,
    ) -> Result<TurnOutcome, ApplicationError> {
        let mut messages = vec![ChatMessage::system(prompts::ASSISTANT_INSTRUCTIONS)];
        for message in self.store.load().await {
            messages.push(match message.sender {
                Sender::User => ChatMessage::user(message.text),
                Sender::Bot => ChatMessage::assistant(message.text),
            });
        }

        let tools = self.tools.definitions();
        let mut rounds = 0u32;

        loop {
            let request = CompletionRequest { messages: messages.clone(), tools: tools.clone() };
            let outcome = match engine.complete(request).await {
                Ok(outcome) => outcome,
                Err(completion_error) => {
                    warn!(error = %completion_error, "completion engine failed, settling turn");
                    return self.fail_turn(guard, language).await;
                }
            };

            match outcome {
                CompletionOutcome::Final(text) => {
                    let reply = self.append(Message::bot(text)).await?;
                    guard.advance(TurnEvent::CompletionReceived)?;
                    guard.advance(TurnEvent::TurnClosed)?;
                    return Ok(TurnOutcome::Answered { reply });
                }
                CompletionOutcome::ToolCalls(calls) => {
                    rounds += 1;
                    if rounds > self.max_tool_rounds {
                        warn!(rounds, "tool round budget exhausted, settling turn");
                        return self.fail_turn(guard, language).await;
                    }
                    guard.advance(TurnEvent::ToolRoundStarted)?;

                    messages.push(ChatMessage::assistant_tool_calls(calls.clone()));
                    // Tool invocations within a turn are strictly sequential.
                    for call in &calls {
                        let result = self.tools.dispatch(call).await;
                        messages
                            .push(ChatMessage::tool_result(call.id.clone(), result.to_string()));
                    }
                }
            }
        }
    }

    /// Failure path of a dispatched turn: exactly one localized apology, then
    /// back to idle. Never retried automatically; the user's message stays in
    /// history and can be resubmitted.
    async fn fail_turn(
        &self,
        guard: &TurnGuard<'_>,
        language: Language,
    ) -> Result<TurnOutcome, ApplicationError> {
        let reply = Message::bot(i18n::texts(language).apology);
        if let Err(store_error) = self.store.append(reply.clone()).await {
            error!(error = %store_error, "could not persist apology message");
        }
        guard.advance(TurnEvent::TurnFailed)?;
        guard.advance(TurnEvent::TurnClosed)?;
        Ok(TurnOutcome::Failed { reply })
    }

    async fn ensure_welcome(&self, language: Language) -> Result<(), ApplicationError> {
        if self.store.load().await.is_empty() {
            self.append(Message::bot(i18n::texts(language).welcome)).await?;
        }
        Ok(())
    }

    async fn append(&self, message: Message) -> Result<Message, ApplicationError> {
        self.store
            .append(message.clone())
            .await
            .map_err(|store_error| ApplicationError::Persistence(store_error.to_string()))?;
        Ok(message)
    }
}

/// Open-turn token. Dropping it forces the state back to `Idle`, so the
/// conversation stays usable even if a turn unwinds early.
struct TurnGuard<'a> {
    slot: &'a Mutex<TurnState>,
}

impl TurnGuard<'_> {
    fn advance(&self, event: TurnEvent) -> Result<TurnState, ApplicationError> {
        let mut state = lock_state(self.slot);
        *state = apply(*state, event)?;
        Ok(*state)
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        *lock_state(self.slot) = TurnState::Idle;
    }
}

fn apply(state: TurnState, event: TurnEvent) -> Result<TurnState, ApplicationError> {
    transition(state, event)
        .map(|outcome| outcome.to)
        .map_err(|transition_error| {
            ApplicationError::Domain(DomainError::Validation(transition_error.to_string()))
        })
}

fn lock_state<'a>(slot: &'a Mutex<TurnState>) -> MutexGuard<'a, TurnState> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
